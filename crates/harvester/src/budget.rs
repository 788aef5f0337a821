//! Counting permit set bounding simultaneous network operations.
//!
//! [`Budget`] is a semaphore with instrumentation: alongside permit
//! accounting it tracks the current and peak number of holders, so tests
//! (and curious operators) can confirm that the number of in-flight
//! operations never exceeds the configured maximum.
//!
//! Permits release on drop, which guarantees release on every exit path of
//! the holding task, success or failure.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::*;

/// Shared bound on simultaneous operations.
#[derive(Debug, Clone)]
pub struct Budget {
  /// Permit source; never closed for the lifetime of the budget.
  semaphore: Arc<Semaphore>,
  /// Holders right now.
  in_flight: Arc<AtomicUsize>,
  /// High-water mark of holders.
  peak:      Arc<AtomicUsize>,
  /// Configured maximum, kept for reporting.
  limit:     usize,
}

/// A held permit; dropping it releases the budget slot.
#[derive(Debug)]
pub struct BudgetPermit {
  /// The underlying semaphore permit.
  _permit:   OwnedSemaphorePermit,
  /// Counter to decrement on release.
  in_flight: Arc<AtomicUsize>,
}

impl Drop for BudgetPermit {
  fn drop(&mut self) { self.in_flight.fetch_sub(1, Ordering::SeqCst); }
}

impl Budget {
  /// Creates a budget allowing at most `limit` simultaneous holders.
  ///
  /// A limit of zero would deadlock every caller, so it is clamped to one.
  pub fn new(limit: usize) -> Self {
    let limit = limit.max(1);
    Self {
      semaphore: Arc::new(Semaphore::new(limit)),
      in_flight: Arc::new(AtomicUsize::new(0)),
      peak:      Arc::new(AtomicUsize::new(0)),
      limit,
    }
  }

  /// Waits for a free slot and claims it.
  pub async fn acquire(&self) -> BudgetPermit {
    // The semaphore is never closed, so acquisition cannot fail.
    let permit = self
      .semaphore
      .clone()
      .acquire_owned()
      .await
      .expect("concurrency budget semaphore closed");

    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(now, Ordering::SeqCst);
    BudgetPermit { _permit: permit, in_flight: self.in_flight.clone() }
  }

  /// Configured maximum number of simultaneous holders.
  pub fn limit(&self) -> usize { self.limit }

  /// Number of permits held right now.
  pub fn in_flight(&self) -> usize { self.in_flight.load(Ordering::SeqCst) }

  /// Highest number of simultaneous holders observed so far.
  pub fn peak_in_flight(&self) -> usize { self.peak.load(Ordering::SeqCst) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_budget_never_exceeds_limit() {
    let budget = Budget::new(4);
    let mut tasks = tokio::task::JoinSet::new();

    // Queue 3x the budget's worth of tasks, each holding a permit briefly.
    for _ in 0..12 {
      let budget = budget.clone();
      tasks.spawn(async move {
        let _permit = budget.acquire().await;
        assert!(budget.in_flight() <= budget.limit());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
      });
    }
    while let Some(result) = tasks.join_next().await {
      result.unwrap();
    }

    assert!(budget.peak_in_flight() <= 4);
    assert_eq!(budget.in_flight(), 0);
  }

  #[tokio::test]
  async fn test_permit_released_on_panic_path() {
    let budget = Budget::new(1);
    let handle = {
      let budget = budget.clone();
      tokio::spawn(async move {
        let _permit = budget.acquire().await;
        panic!("task failure must still release the permit");
      })
    };
    assert!(handle.await.is_err());

    // The slot freed by the panicking task is reusable.
    let _permit = budget.acquire().await;
    assert_eq!(budget.in_flight(), 1);
  }

  #[tokio::test]
  async fn test_zero_limit_is_clamped() {
    let budget = Budget::new(0);
    let _permit = budget.acquire().await;
    assert_eq!(budget.limit(), 1);
  }
}

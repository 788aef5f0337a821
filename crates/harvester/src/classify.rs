//! Classification of paper records against a fixed label taxonomy.
//!
//! [`Classifier`] sends a chat-completion request to a locally running
//! generation endpoint and maps the response onto the five-label taxonomy.
//! The remote call is the only part of this crate that retries: when the
//! endpoint signals resource exhaustion (HTTP 429) the classifier backs off
//! with an exponentially doubling delay before trying again. Any other
//! failure, and an exhausted retry budget, settle as [`Label::Error`];
//! a response outside the taxonomy settles as [`Label::Unknown`].
//!
//! # Examples
//!
//! ```no_run
//! use harvester::classify::Classifier;
//!
//! # async fn example() {
//! let classifier = Classifier::new().with_host("http://localhost:11434");
//! let label = classifier.classify("Attention Is All You Need", "The dominant sequence...").await;
//! println!("Classified as: {label}");
//! # }
//! ```

use std::time::Duration;

use super::*;

/// Classification outcome.
///
/// The five taxonomy labels plus the two terminal fallbacks: [`Unknown`]
/// for a response outside the taxonomy and [`Error`] for a failed call.
///
/// [`Unknown`]: Label::Unknown
/// [`Error`]: Label::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
  /// Deep Learning/Machine Learning
  DeepLearning,
  /// Computer Vision
  ComputerVision,
  /// Reinforcement Learning
  ReinforcementLearning,
  /// Natural Language Processing (NLP)
  NaturalLanguageProcessing,
  /// Optimization Algorithms
  Optimization,
  /// The endpoint answered with something outside the taxonomy.
  Unknown,
  /// The call failed or the retry budget ran out.
  Error,
}

impl Label {
  /// The fixed taxonomy, in prompt order.
  pub const TAXONOMY: [Label; 5] = [
    Label::DeepLearning,
    Label::ComputerVision,
    Label::ReinforcementLearning,
    Label::NaturalLanguageProcessing,
    Label::Optimization,
  ];

  /// Canonical string form, exactly as it appears in prompts and datasets.
  pub fn as_str(&self) -> &'static str {
    match self {
      Label::DeepLearning => "Deep Learning/Machine Learning",
      Label::ComputerVision => "Computer Vision",
      Label::ReinforcementLearning => "Reinforcement Learning",
      Label::NaturalLanguageProcessing => "Natural Language Processing (NLP)",
      Label::Optimization => "Optimization Algorithms",
      Label::Unknown => "Unknown",
      Label::Error => "Error",
    }
  }

  /// Matches a raw endpoint response against the taxonomy.
  ///
  /// The response is trimmed and compared exactly; anything else becomes
  /// [`Label::Unknown`] rather than a parse failure. This lenient fallback
  /// can mask prompt/response drift, but it is the established policy.
  pub fn from_response(response: &str) -> Self {
    let response = response.trim();
    Self::TAXONOMY.into_iter().find(|label| label.as_str() == response).unwrap_or(Label::Unknown)
  }
}

impl Display for Label {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A single message in the chat-completion request.
#[derive(Debug, Serialize, Deserialize)]
struct Message {
  /// Speaker role; always "user" for classification prompts.
  role:    String,
  /// Prompt or response text.
  content: String,
}

/// Chat-completion request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
  /// Model identifier on the endpoint.
  model:    &'a str,
  /// Conversation; a single user message here.
  messages: Vec<Message>,
  /// Token streaming is never used for classification.
  stream:   bool,
}

/// The subset of the chat-completion response we read.
#[derive(Deserialize)]
struct ChatResponse {
  /// The generated assistant message.
  message: Message,
}

/// Retry progress for one classification call.
enum ClassifyState {
  /// About to issue attempt `n` (zero-based).
  Attempting(u32),
  /// Rate limited on attempt `attempt`; sleeping before the next try.
  Backoff {
    /// The attempt that was rate limited.
    attempt: u32,
    /// How long to sleep before retrying.
    delay:   Duration,
  },
  /// The endpoint answered and the response mapped onto a label.
  Succeeded(Label),
  /// A terminal failure; the call settles as [`Label::Error`].
  Failed,
}

/// Client for the remote classification endpoint.
#[derive(Debug, Clone)]
pub struct Classifier {
  /// Pooled HTTP client.
  client:        reqwest::Client,
  /// Fully resolved chat endpoint URL.
  url:           Url,
  /// Model identifier to request.
  model:         String,
  /// Total attempts before settling as [`Label::Error`].
  max_retries:   u32,
  /// First backoff delay; doubles on every rate-limited attempt.
  initial_delay: Duration,
}

impl Default for Classifier {
  fn default() -> Self {
    Self {
      client:        reqwest::Client::new(),
      url:           Url::parse("http://localhost:11434/api/chat")
        .expect("default endpoint URL is valid"),
      model:         "llama3.2:3b".to_string(),
      max_retries:   3,
      initial_delay: Duration::from_secs(10),
    }
  }
}

impl Classifier {
  /// Creates a classifier against the default local endpoint.
  pub fn new() -> Self { Self::default() }

  /// Sets the host of the generation endpoint.
  ///
  /// An unparseable host is ignored with a warning and the previous
  /// endpoint is kept.
  pub fn with_host(mut self, host: &str) -> Self {
    match Url::parse(host).and_then(|base| base.join("api/chat")) {
      Ok(url) => self.url = url,
      Err(e) => warn!("Ignoring unparseable generation host {host}: {e}"),
    }
    self
  }

  /// Sets the model identifier to request.
  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }

  /// Sets the total attempt budget.
  pub fn with_max_retries(mut self, max_retries: u32) -> Self {
    self.max_retries = max_retries;
    self
  }

  /// Sets the first backoff delay (it doubles on every rate limit).
  pub fn with_initial_delay(mut self, delay: Duration) -> Self {
    self.initial_delay = delay;
    self
  }

  /// Classifies one paper record into the taxonomy.
  ///
  /// Never fails: rate limiting retries with doubling delays up to the
  /// attempt budget, and every terminal failure settles as
  /// [`Label::Error`].
  pub async fn classify(&self, title: &str, abstract_text: &str) -> Label {
    let prompt = self.prompt(title, abstract_text);
    let mut state = ClassifyState::Attempting(0);

    loop {
      state = match state {
        ClassifyState::Attempting(attempt) if attempt >= self.max_retries => {
          warn!("Retry budget exhausted classifying '{title}'");
          ClassifyState::Failed
        },
        ClassifyState::Attempting(attempt) => match self.attempt(&prompt).await {
          Ok(response) => ClassifyState::Succeeded(Label::from_response(&response)),
          Err(HarvesterError::RateLimited) => {
            let delay = self.initial_delay * 2u32.pow(attempt);
            warn!("Rate limit exceeded; retrying in {delay:?}");
            ClassifyState::Backoff { attempt, delay }
          },
          Err(e) => {
            error!("Error classifying '{title}': {e}");
            ClassifyState::Failed
          },
        },
        ClassifyState::Backoff { attempt, delay } => {
          tokio::time::sleep(delay).await;
          ClassifyState::Attempting(attempt + 1)
        },
        ClassifyState::Succeeded(label) => return label,
        ClassifyState::Failed => return Label::Error,
      };
    }
  }

  /// One request/response round trip against the endpoint.
  async fn attempt(&self, prompt: &str) -> Result<String> {
    let request = ChatRequest {
      model:    &self.model,
      messages: vec![Message { role: "user".to_string(), content: prompt.to_string() }],
      stream:   false,
    };

    let response = self.client.post(self.url.clone()).json(&request).send().await?;
    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
      return Err(HarvesterError::RateLimited);
    }

    let chat: ChatResponse = response.error_for_status()?.json().await?;
    Ok(chat.message.content)
  }

  /// Builds the classification prompt for one record.
  fn prompt(&self, title: &str, abstract_text: &str) -> String {
    let categories = Label::TAXONOMY.map(|label| label.as_str()).join(", ");
    format!(
      "Classify the following research paper into one of these categories: {categories}.\nTitle: \
       {title}\nAbstract: {abstract_text}\nReturn only the category name."
    )
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use tracing_test::traced_test;
  use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
  };

  use super::*;

  fn chat_body(content: &str) -> serde_json::Value {
    json!({ "message": { "role": "assistant", "content": content } })
  }

  fn classifier(server: &MockServer) -> Classifier {
    Classifier::new().with_host(&server.uri()).with_initial_delay(Duration::from_millis(1))
  }

  #[test]
  fn test_taxonomy_round_trips() {
    for label in Label::TAXONOMY {
      assert_eq!(Label::from_response(label.as_str()), label);
    }
  }

  #[test]
  fn test_out_of_taxonomy_response_is_unknown() {
    assert_eq!(Label::from_response("Quantum Computing"), Label::Unknown);
    assert_eq!(Label::from_response(""), Label::Unknown);
    // Trimmed but otherwise exact.
    assert_eq!(Label::from_response("  Computer Vision \n"), Label::ComputerVision);
    assert_eq!(Label::from_response("computer vision"), Label::Unknown);
  }

  #[tokio::test]
  async fn test_successful_classification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/chat"))
      .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Computer Vision")))
      .expect(1)
      .mount(&server)
      .await;

    let label = classifier(&server).classify("A CNN Study", "We convolve.").await;
    assert_eq!(label, Label::ComputerVision);
  }

  #[traced_test]
  #[tokio::test]
  async fn test_rate_limit_backs_off_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/chat"))
      .respond_with(ResponseTemplate::new(429))
      .up_to_n_times(2)
      .mount(&server)
      .await;
    Mock::given(method("POST"))
      .and(path("/api/chat"))
      .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Optimization Algorithms")))
      .expect(1)
      .mount(&server)
      .await;

    let label = classifier(&server).classify("SGD Tricks", "We optimize.").await;
    assert_eq!(label, Label::Optimization);
    assert!(logs_contain("Rate limit exceeded"));
  }

  #[tokio::test]
  async fn test_exhausted_retry_budget_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/chat"))
      .respond_with(ResponseTemplate::new(429))
      .expect(2)
      .mount(&server)
      .await;

    let label =
      classifier(&server).with_max_retries(2).classify("Stubborn Paper", "Always throttled.").await;
    assert_eq!(label, Label::Error);
  }

  #[tokio::test]
  async fn test_non_rate_limit_failure_is_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/chat"))
      .respond_with(ResponseTemplate::new(500))
      .expect(1)
      .mount(&server)
      .await;

    let label = classifier(&server).classify("Broken Endpoint", "No luck.").await;
    assert_eq!(label, Label::Error);
  }
}

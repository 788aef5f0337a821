//! HTML anchor extraction for listing and detail pages.
//!
//! Two selector modes cover everything the archive layout requires:
//!
//! - **Structural**: every anchor sitting in a list item with a `title`
//!   attribute (`ul > li > a[title]`), which is how the proceedings index
//!   lists the papers of a year. The full sequence is returned in document
//!   order, duplicates included.
//! - **Textual**: the first anchor whose visible text equals a target label
//!   exactly ("Paper", "Bibtex"), which is how a paper's detail page links
//!   its artifacts.
//!
//! Hrefs are resolved against the archive base URL before being returned, so
//! downstream components only ever see absolute URLs. Nothing in this module
//! fails: malformed HTML parses leniently and simply matches nothing.

use scraper::{Html, Selector};

use super::*;

lazy_static! {
  /// Anchors of the year-listing page, one per paper.
  static ref LISTING: Selector = Selector::parse("ul > li > a[title]").unwrap();

  /// All anchors, scanned for an exact visible-text match.
  static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
}

/// An extracted anchor with its href already made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
  /// Absolute target of the anchor.
  pub href: Url,
  /// Visible text of the anchor, whitespace-trimmed.
  pub text: String,
}

/// Extracts all listing anchors (`ul > li > a[title]`) in document order.
///
/// Anchors whose href cannot be joined against `base` are skipped. An empty
/// result means the page listed nothing, which is not an error.
pub fn listing_links(html: &str, base: &Url) -> Vec<Link> {
  let document = Html::parse_document(html);
  document
    .select(&LISTING)
    .filter_map(|anchor| {
      let href = base.join(anchor.value().attr("href")?).ok()?;
      Some(Link { href, text: anchor.text().collect::<String>().trim().to_string() })
    })
    .collect()
}

/// Finds the first anchor whose visible text equals `label` exactly.
///
/// The comparison is case-sensitive after trimming surrounding whitespace,
/// matching how artifact links are labeled on detail pages. Returns `None`
/// when no anchor matches, which callers report as a warning rather than a
/// failure.
pub fn labeled_link(html: &str, label: &str, base: &Url) -> Option<Url> {
  let document = Html::parse_document(html);
  document
    .select(&ANCHOR)
    .find(|anchor| anchor.text().collect::<String>().trim() == label)
    .and_then(|anchor| base.join(anchor.value().attr("href")?).ok())
}

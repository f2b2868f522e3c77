use std::sync::Arc;

use arachne_core::error::AppError;
use scraper::{Html, Selector};

/// Pulls the raw `href` values of every anchor out of an HTML document.
///
/// Values are returned verbatim and in document order, empty strings
/// included; resolution and filtering are left to the crawler.
pub struct HrefExtractor {
    selector: Arc<Selector>,
}

impl Clone for HrefExtractor {
    fn clone(&self) -> Self {
        Self {
            selector: Arc::clone(&self.selector),
        }
    }
}

impl HrefExtractor {
    pub fn new() -> Result<Self, AppError> {
        let selector = Selector::parse("a[href]")
            .map_err(|e| AppError::ParseError(format!("Invalid anchor selector: {e}")))?;

        Ok(Self {
            selector: Arc::new(selector),
        })
    }

    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

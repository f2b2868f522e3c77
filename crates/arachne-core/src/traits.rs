use std::future::Future;

use url::Url;

use crate::error::AppError;

/// Turns a page URL into the raw `href` values of the anchors found on it.
///
/// Values are returned exactly as they appear in the document (relative,
/// absolute, or empty); resolution and filtering happen in the crawler.
/// Implementations are cloned into every traversal task.
pub trait LinkSource: Send + Sync + Clone + 'static {
    fn links(&self, url: &Url) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;
}

#[cfg(feature = "browser")]
pub mod browser_source;
pub mod extractor;
pub mod source;
pub mod static_source;

#[cfg(feature = "browser")]
pub use browser_source::BrowserSource;
pub use extractor::HrefExtractor;
pub use source::{ContentSource, crawl, crawl_with_config};
pub use static_source::StaticSource;

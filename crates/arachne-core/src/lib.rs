pub mod config;
pub mod crawler;
pub mod error;
pub mod links;
pub mod models;
pub mod reporter;
pub mod session;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::CrawlConfig;
pub use crawler::crawl;
pub use error::AppError;
pub use models::{CrawlOutcome, CrawlReport, Unit};
pub use reporter::{CrawlEvent, CrawlReporter, NullReporter, TracingCrawlReporter};
pub use session::CrawlSession;
pub use traits::LinkSource;

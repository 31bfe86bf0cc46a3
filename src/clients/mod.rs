pub mod content_client;
pub mod page_fetcher;

pub use content_client::ContentClient;
pub use page_fetcher::PageFetcher;

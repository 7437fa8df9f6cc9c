pub mod error;
pub mod extract;
pub mod fetch;

pub use error::ExtractError;
pub use extract::extract_signals;
pub use fetch::{HttpPageFetcher, PageFetcher};

// armtc-net/src/lib.rs
pub mod http;
pub mod listing;
pub mod resolver;
pub mod validation;

pub use http::{Fetcher, HttpFetcher};
pub use listing::{link_filename, parse_links};
pub use resolver::ReleaseResolver;
pub use validation::validate_url;

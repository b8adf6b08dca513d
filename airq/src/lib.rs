pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod page;
pub mod report;
pub mod service;
pub mod units;

pub use config::Config;
pub use error::{ConfigError, FetchError};
pub use fetch::{HttpFetcher, PageFetcher};
pub use report::{Measurements, Report};
pub use service::AirQualityService;

pub mod config;
pub mod errors;
pub mod logging;

pub use config::AppConfig;
pub use errors::ApiError;

pub mod error;
pub mod scenario;
pub mod stripes_config;

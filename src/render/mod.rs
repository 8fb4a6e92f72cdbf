pub mod error;
pub mod export;
pub mod layout;
pub mod plotters_sink;
pub mod sink;

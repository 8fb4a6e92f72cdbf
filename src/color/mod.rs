pub mod gradient;
pub mod mapper;
pub mod rgb;

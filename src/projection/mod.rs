pub mod error;
pub mod policy;
pub mod ramp;
pub mod synthesizer;

pub mod cli;
pub mod config;
pub mod model;
pub mod source;

pub use config::Configuration;
pub use source::SourceError;

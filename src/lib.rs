pub mod analyzer;
pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod nlp;
pub mod server;

pub use analyzer::{Analysis, Analyzer};
pub use config::Settings;

pub mod app;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
pub mod present;
pub mod stats;

pub mod config;
pub mod counter;
pub mod error;
pub mod exercise;
pub mod logging;
pub mod pose;
pub mod protocol;
pub mod session;
pub mod source;

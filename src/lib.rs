pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod schema;
pub mod story;
pub mod tts;

//! Docflow - department visibility and routing core
//!
//! Client-side core of a government document routing front-end. The flat
//! department list becomes a forest, each user gets a visibility scope over
//! it, and list screens plus the internal document composer build on that.

pub mod assignment;
pub mod client;
pub mod compose;
pub mod config;
pub mod department;
pub mod entity;
pub mod error;
pub mod filter;
pub mod loader;
pub mod permission;
pub mod state;
pub mod status;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

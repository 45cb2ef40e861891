pub mod api;
pub mod config;
pub mod error;
pub mod ids;
pub mod types;
pub mod validation;

pub use error::{FloodAwareError, Result};
pub use ids::*;

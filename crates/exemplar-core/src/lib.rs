pub mod config;
pub mod error;
pub mod types;

pub use config::ExemplarConfig;
pub use error::{ExemplarError, Result};
pub use types::*;

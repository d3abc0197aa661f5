//! Fabula Core - Shared data models, types, localization, and errors

pub mod errors;
pub mod i18n;
pub mod models;
pub mod text;
pub mod types;

pub use errors::{Error, Result};
pub use models::*;
pub use types::*;

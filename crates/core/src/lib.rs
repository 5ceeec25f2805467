pub mod config;
pub mod entity;
pub mod error;

pub use config::DiplomacyConfig;
pub use entity::*;
pub use error::*;

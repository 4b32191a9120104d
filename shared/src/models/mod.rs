//! Domain models shared by the order server and its clients

pub mod actor;
pub mod catalog;
pub mod notification;
pub mod order;

pub use actor::*;
pub use catalog::*;
pub use notification::*;
pub use order::*;

use thiserror::Error;

/// A string did not name a known enum variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

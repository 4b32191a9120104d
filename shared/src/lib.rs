//! Shared types for the delivery platform
//!
//! Common types used by the order server and its clients: error codes and
//! the response envelope, domain models, bus message payloads, and id/time
//! utilities.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{Audience, BusMessage, BusPayload, EventType};

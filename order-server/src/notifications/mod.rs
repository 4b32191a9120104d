//! Notification Dispatcher & Inbox
//!
//! Two independent channels:
//! - live fan-out over an [`EventPublisher`](crate::message::EventPublisher),
//!   best effort, after the order transaction commits
//! - durable inbox records in the `notification` table, written inside the
//!   order transaction

pub mod dispatcher;
pub mod inbox;

pub use dispatcher::{NotificationDispatcher, OrderAudience};
pub use inbox::InboxService;

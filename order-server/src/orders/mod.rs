//! Order Engine
//!
//! - **manager**: `OrdersManager`, creation, transitions, cancellation,
//!   partner assignment and read projections
//! - **transitions**: the status graph and the stage timestamp table
//! - **locks**: per-order serialization of mutations
//!
//! # Mutation flow
//!
//! ```text
//! request ─▶ per-order lock ─▶ BEGIN
//!                                ├─ load aggregate
//!                                ├─ validate / transition
//!                                ├─ versioned UPDATE (CAS)
//!                                ├─ history + inbox rows
//!                              COMMIT
//!                                │
//!                                ▼
//!                     spawned live fan-out (best effort)
//! ```

pub mod locks;
pub mod manager;
pub mod transitions;

pub use locks::{OrderLockGuard, OrderLocks};
pub use manager::{ManagerError, ManagerResult, OrdersManager};

//! Audience filtering for bus subscribers
//!
//! The bus is a single broadcast channel. Each subscriber keeps only the
//! messages addressed to an audience it listens on.

use shared::message::{Audience, BusMessage};
use std::collections::HashSet;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceFilter {
    audiences: HashSet<Audience>,
}

impl AudienceFilter {
    pub fn new(audiences: impl IntoIterator<Item = Audience>) -> Self {
        Self {
            audiences: audiences.into_iter().collect(),
        }
    }

    pub fn matches(&self, msg: &BusMessage) -> bool {
        self.audiences.contains(&msg.audience)
    }
}

/// Broadcast receiver that yields only matching messages
#[derive(Debug)]
pub struct AudienceReceiver {
    rx: broadcast::Receiver<BusMessage>,
    filter: AudienceFilter,
}

impl AudienceReceiver {
    pub fn new(rx: broadcast::Receiver<BusMessage>, filter: AudienceFilter) -> Self {
        Self { rx, filter }
    }

    /// Next matching message; `None` once the bus is gone
    ///
    /// A slow subscriber that lagged behind skips the lost messages.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            match self.rx.recv().await {
                Ok(msg) if self.filter.matches(&msg) => return Some(msg),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged, messages skipped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

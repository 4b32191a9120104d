//! Live fan-out of order events
//!
//! Every delivery is independent: audiences are published concurrently, a
//! failed publish is logged at `warn` and skipped, and nothing is ever
//! reported back to the caller of the order operation.

use futures::future::join_all;
use shared::message::{Audience, BusPayload, OrderEvent, SystemEvent};
use shared::models::{Order, UserRole};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::message::EventPublisher;

/// Who hears about one order
///
/// Resolved inside the order transaction so the post-commit fan-out never
/// touches the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAudience {
    pub customer_user_id: i64,
    pub vendor_user_id: i64,
    pub partner_user_id: Option<i64>,
    pub customer_name: String,
    pub restaurant_name: String,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("publisher", &"<dyn EventPublisher>")
            .finish()
    }
}

impl NotificationDispatcher {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    /// Customer, vendor, partner (when assigned) and the admin topic
    pub async fn send_order_update(&self, order: &Order, audience: &OrderAudience) -> usize {
        let mut targets = vec![
            Audience::User(audience.customer_user_id),
            Audience::User(audience.vendor_user_id),
        ];
        if let Some(partner_user_id) = audience.partner_user_id {
            targets.push(Audience::User(partner_user_id));
        }
        targets.push(Audience::AdminOrders);

        let event = OrderEvent::order_update(order, shared::util::now_millis());
        self.fan_out(targets, event.into()).await
    }

    /// Vendor and the admin topic
    pub async fn send_new_order_notification(
        &self,
        order: &Order,
        audience: &OrderAudience,
    ) -> usize {
        let event = OrderEvent::new_order(
            order,
            audience.customer_name.clone(),
            audience.restaurant_name.clone(),
            shared::util::now_millis(),
        );
        self.fan_out(
            vec![Audience::User(audience.vendor_user_id), Audience::AdminOrders],
            event.into(),
        )
        .await
    }

    /// Assigned partner only; nothing to do while unassigned
    pub async fn send_delivery_assignment_notification(
        &self,
        order: &Order,
        audience: &OrderAudience,
    ) -> usize {
        let Some(partner_user_id) = audience.partner_user_id else {
            return 0;
        };
        let event = OrderEvent::delivery_assignment(
            order,
            audience.restaurant_name.clone(),
            shared::util::now_millis(),
        );
        self.fan_out(vec![Audience::User(partner_user_id)], event.into())
            .await
    }

    /// Announcement on a role's system topic
    pub async fn send_system_notification(&self, message: &str, role: UserRole) -> usize {
        let event = SystemEvent::new(message, shared::util::now_millis());
        self.fan_out(vec![Audience::RoleSystem(role)], event.into())
            .await
    }

    /// Publish to every target concurrently; returns the number delivered
    async fn fan_out(&self, targets: Vec<Audience>, payload: BusPayload) -> usize {
        let event_type = payload.event_type();
        let order_id = payload.order_id();
        let sends = targets.into_iter().map(|audience| {
            let payload = payload.clone();
            async move { (audience, self.publisher.publish(audience, payload).await) }
        });

        let mut delivered = 0;
        for (audience, result) in join_all(sends).await {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    %audience,
                    %event_type,
                    order_id = ?order_id,
                    error = %e,
                    "Notification delivery failed"
                ),
            }
        }
        delivered
    }

    // ========== Post-commit helpers ==========

    pub fn spawn_order_update(&self, order: Order, audience: OrderAudience) -> JoinHandle<usize> {
        let this = self.clone();
        tokio::spawn(async move { this.send_order_update(&order, &audience).await })
    }

    pub fn spawn_new_order(&self, order: Order, audience: OrderAudience) -> JoinHandle<usize> {
        let this = self.clone();
        tokio::spawn(async move { this.send_new_order_notification(&order, &audience).await })
    }

    /// Assignment to the partner, then the general update to everyone
    pub fn spawn_assignment(&self, order: Order, audience: OrderAudience) -> JoinHandle<usize> {
        let this = self.clone();
        tokio::spawn(async move {
            this.send_delivery_assignment_notification(&order, &audience)
                .await
                + this.send_order_update(&order, &audience).await
        })
    }
}

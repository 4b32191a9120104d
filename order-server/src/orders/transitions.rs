//! Order status state machine
//!
//! ```text
//! PLACED → CONFIRMED → PREPARING → READY_FOR_PICKUP → PICKED_UP → OUT_FOR_DELIVERY → DELIVERED
//!    ↓          ↓           ↓
//! CANCELLED ◄───┴───────────┘
//! ```
//!
//! Forward moves are strictly adjacent. The stage timestamp written by each
//! move comes from [`STAGE_STAMPS`], not from a match in the engine.

use shared::models::{Order, OrderStatus};

/// Writes the stage timestamp(s) of one status
pub type StampFn = fn(&mut Order, i64);

fn stamp_cooking_started(order: &mut Order, at: i64) {
    order.cooking_started_at = Some(at);
}

fn stamp_ready_for_pickup(order: &mut Order, at: i64) {
    order.ready_for_pickup_at = Some(at);
}

fn stamp_picked_up(order: &mut Order, at: i64) {
    order.picked_up_at = Some(at);
}

fn stamp_out_for_delivery(order: &mut Order, at: i64) {
    order.out_for_delivery_at = Some(at);
}

fn stamp_delivered(order: &mut Order, at: i64) {
    order.delivered_at = Some(at);
    order.actual_delivery_time = Some(at);
}

fn stamp_cancelled(order: &mut Order, at: i64) {
    order.cancelled_at = Some(at);
}

/// status → stage timestamp setter (PLACED and CONFIRMED stamp nothing)
pub static STAGE_STAMPS: &[(OrderStatus, StampFn)] = &[
    (OrderStatus::Preparing, stamp_cooking_started),
    (OrderStatus::ReadyForPickup, stamp_ready_for_pickup),
    (OrderStatus::PickedUp, stamp_picked_up),
    (OrderStatus::OutForDelivery, stamp_out_for_delivery),
    (OrderStatus::Delivered, stamp_delivered),
    (OrderStatus::Cancelled, stamp_cancelled),
];

/// Statuses reachable in one step from `from`
pub fn allowed_next(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Placed => &[Confirmed, Cancelled],
        Confirmed => &[Preparing, Cancelled],
        Preparing => &[ReadyForPickup, Cancelled],
        ReadyForPickup => &[PickedUp],
        PickedUp => &[OutForDelivery],
        OutForDelivery => &[Delivered],
        Delivered | Cancelled => &[],
    }
}

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_next(from).contains(&to)
}

/// PLACED, CONFIRMED and PREPARING can still be cancelled
pub fn is_cancellable(status: OrderStatus) -> bool {
    can_transition(status, OrderStatus::Cancelled)
}

/// Apply the stage timestamp for `status`, if it has one
pub fn stamp_stage(order: &mut Order, status: OrderStatus, at: i64) {
    if let Some((_, stamp)) = STAGE_STAMPS.iter().find(|(s, _)| *s == status) {
        stamp(order, at);
    }
}

/// Read back the stage timestamp for `status`
pub fn stage_timestamp(order: &Order, status: OrderStatus) -> Option<i64> {
    match status {
        OrderStatus::Placed | OrderStatus::Confirmed => None,
        OrderStatus::Preparing => order.cooking_started_at,
        OrderStatus::ReadyForPickup => order.ready_for_pickup_at,
        OrderStatus::PickedUp => order.picked_up_at,
        OrderStatus::OutForDelivery => order.out_for_delivery_at,
        OrderStatus::Delivered => order.delivered_at,
        OrderStatus::Cancelled => order.cancelled_at,
    }
}

use super::*;

#[tokio::test]
async fn test_cancel_while_preparing() {
    let f = setup().await;
    let order = f
        .place_and_advance(&[OrderStatus::Confirmed, OrderStatus::Preparing])
        .await;

    let order = f
        .manager
        .cancel_order(order.id, "ingredient shortage", ActorTag::Restaurant)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.cancellation_reason.as_deref(), Some("ingredient shortage"));
    assert_eq!(order.cancelled_by, Some(ActorTag::Restaurant));
    let last = order.status_history.last().unwrap();
    assert_eq!(last.status, OrderStatus::Cancelled);
    assert_eq!(last.changed_by, ActorTag::Restaurant);
    assert_eq!(last.remarks.as_deref(), Some("ingredient shortage"));
    assert_eq!(order.cancelled_at, Some(last.timestamp));
    // the kitchen stamp from before is kept
    assert!(order.cooking_started_at.is_some());

    let inbox = f.inbox(CUSTOMER_USER).await;
    assert_eq!(inbox[0].title, "Order Cancelled");
    assert!(inbox[0].message.ends_with("Reason: ingredient shortage"));
}

#[tokio::test]
async fn test_cancel_from_each_cancellable_status() {
    let f = setup().await;
    let paths: [&[OrderStatus]; 3] = [
        &[],
        &[OrderStatus::Confirmed],
        &[OrderStatus::Confirmed, OrderStatus::Preparing],
    ];
    for path in paths {
        let order = f.place_and_advance(path).await;
        let cancelled = f
            .manager
            .cancel_order(order.id, "changed my mind", ActorTag::Customer)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }
}

#[tokio::test]
async fn test_cancel_after_kitchen_is_rejected() {
    let f = setup().await;
    let order = f
        .place_and_advance(&[
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
        ])
        .await;

    let err = f
        .manager
        .cancel_order(order.id, "too late", ActorTag::Customer)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::InvalidTransition {
            from: OrderStatus::ReadyForPickup,
            to: OrderStatus::Cancelled
        }
    ));
}

#[tokio::test]
async fn test_cancel_terminal_orders() {
    let f = setup().await;

    let delivered = f.place_and_advance(&TO_DELIVERED).await;
    let err = f
        .manager
        .cancel_order(delivered.id, "late", ActorTag::Customer)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderAlreadyDelivered(id) if id == delivered.id));

    let order = f.place().await;
    f.manager
        .cancel_order(order.id, "duplicate", ActorTag::Customer)
        .await
        .unwrap();
    let err = f
        .manager
        .cancel_order(order.id, "again", ActorTag::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderAlreadyCancelled(id) if id == order.id));

    // no second history row
    let stored = f.manager.get_order(order.id).await.unwrap();
    assert_eq!(stored.status_history.len(), 2);
    assert_eq!(stored.cancellation_reason.as_deref(), Some("duplicate"));
}

#[tokio::test]
async fn test_cancel_argument_checks() {
    let f = setup().await;
    let order = f.place().await;

    let err = f
        .manager
        .cancel_order(order.id, "   ", ActorTag::Customer)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidArgument { field: "reason", .. }));

    let err = f
        .manager
        .cancel_order(order.id, "cleanup", ActorTag::System)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidArgument { field: "cancelledBy", .. }));

    let stored = f.manager.get_order(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Placed);
}

#[tokio::test]
async fn test_status_update_to_cancelled_uses_remarks_as_reason() {
    let f = setup().await;

    let order = f.place().await;
    let cancelled = f
        .manager
        .update_status(
            order.id,
            OrderStatus::Cancelled,
            Some("customer unreachable".into()),
            ActorTag::Admin,
        )
        .await
        .unwrap();
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("customer unreachable"));
    assert_eq!(cancelled.cancelled_by, Some(ActorTag::Admin));

    let order = f.place().await;
    let cancelled = f
        .manager
        .update_status(order.id, OrderStatus::Cancelled, None, ActorTag::Restaurant)
        .await
        .unwrap();
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Cancelled"));
}

#[tokio::test]
async fn test_cancel_unknown_order() {
    let f = setup().await;
    let err = f
        .manager
        .cancel_order(7, "reason", ActorTag::Customer)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderNotFound(7)));
}

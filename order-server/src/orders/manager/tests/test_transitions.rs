use super::*;

#[tokio::test]
async fn test_full_lifecycle_history_is_monotonic() {
    let f = setup().await;
    let order = f.place_and_advance(&TO_DELIVERED).await;

    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.version, TO_DELIVERED.len() as i64);

    let statuses: Vec<OrderStatus> = order.status_history.iter().map(|h| h.status).collect();
    let mut expected = vec![OrderStatus::Placed];
    expected.extend(TO_DELIVERED);
    assert_eq!(statuses, expected);

    assert!(
        order
            .status_history
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp),
        "history timestamps must strictly increase"
    );

    // Each stage timestamp equals the history entry that produced it
    let at = |status: OrderStatus| {
        order
            .status_history
            .iter()
            .find(|h| h.status == status)
            .map(|h| h.timestamp)
    };
    assert_eq!(order.cooking_started_at, at(OrderStatus::Preparing));
    assert_eq!(order.ready_for_pickup_at, at(OrderStatus::ReadyForPickup));
    assert_eq!(order.picked_up_at, at(OrderStatus::PickedUp));
    assert_eq!(order.out_for_delivery_at, at(OrderStatus::OutForDelivery));
    assert_eq!(order.delivered_at, at(OrderStatus::Delivered));
    assert_eq!(order.actual_delivery_time, order.delivered_at);
    assert_eq!(order.cancelled_at, None);
}

#[tokio::test]
async fn test_only_reached_stages_are_stamped() {
    let f = setup().await;
    let order = f
        .place_and_advance(&[OrderStatus::Confirmed, OrderStatus::Preparing])
        .await;

    assert!(order.cooking_started_at.is_some());
    assert_eq!(order.ready_for_pickup_at, None);
    assert_eq!(order.picked_up_at, None);
    assert_eq!(order.out_for_delivery_at, None);
    assert_eq!(order.delivered_at, None);
    assert_eq!(order.actual_delivery_time, None);
}

#[tokio::test]
async fn test_skipping_a_stage_is_rejected() {
    let f = setup().await;
    let order = f.place().await;

    let err = f
        .manager
        .update_status(order.id, OrderStatus::Preparing, None, ActorTag::Restaurant)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::InvalidTransition {
            from: OrderStatus::Placed,
            to: OrderStatus::Preparing
        }
    ));

    let unchanged = f.manager.get_order(order.id).await.unwrap();
    assert_eq!(unchanged.status, OrderStatus::Placed);
    assert_eq!(unchanged.version, 0);
    assert_eq!(unchanged.status_history.len(), 1);
}

#[tokio::test]
async fn test_backwards_and_same_status_are_rejected() {
    let f = setup().await;
    let order = f
        .place_and_advance(&[OrderStatus::Confirmed, OrderStatus::Preparing])
        .await;

    for target in [OrderStatus::Confirmed, OrderStatus::Preparing, OrderStatus::Placed] {
        let err = f
            .manager
            .update_status(order.id, target, None, ActorTag::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::InvalidTransition { .. }), "{target}");
    }
}

#[tokio::test]
async fn test_delivered_order_is_frozen() {
    let f = setup().await;
    let order = f.place_and_advance(&TO_DELIVERED).await;

    let err = f
        .manager
        .update_status(order.id, OrderStatus::OutForDelivery, None, ActorTag::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let f = setup().await;
    let err = f
        .manager
        .update_status(42, OrderStatus::Confirmed, None, ActorTag::Restaurant)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderNotFound(42)));
}

#[tokio::test]
async fn test_remarks_and_actor_are_recorded() {
    let f = setup().await;
    let order = f.place().await;
    let order = f
        .manager
        .update_status(
            order.id,
            OrderStatus::Confirmed,
            Some("accepted at counter".into()),
            ActorTag::Restaurant,
        )
        .await
        .unwrap();

    let last = order.status_history.last().unwrap();
    assert_eq!(last.status, OrderStatus::Confirmed);
    assert_eq!(last.changed_by, ActorTag::Restaurant);
    assert_eq!(last.remarks.as_deref(), Some("accepted at counter"));
}

#[tokio::test]
async fn test_status_change_writes_customer_inbox() {
    let f = setup().await;
    let order = f
        .place_and_advance(&[OrderStatus::Confirmed, OrderStatus::Preparing])
        .await;

    let inbox = f.inbox(CUSTOMER_USER).await;
    let titles: Vec<&str> = inbox.iter().map(|n| n.title.as_str()).collect();
    // newest first
    assert_eq!(titles, vec!["Order Being Prepared", "Order Confirmed"]);
    assert_eq!(
        inbox[1].message,
        format!("Your order #{} has been confirmed by the restaurant", order.order_number)
    );
}

#[tokio::test]
async fn test_status_change_fans_out_to_all_parties() {
    let f = setup().await;
    let order = f.place().await;
    f.wait_for_events(2).await;

    f.manager
        .update_status(order.id, OrderStatus::Confirmed, None, ActorTag::Restaurant)
        .await
        .unwrap();

    let events = f.wait_for_events(5).await;
    let updates: Vec<Audience> = events
        .into_iter()
        .filter(|(_, t)| *t == EventType::OrderUpdate)
        .map(|(a, _)| a)
        .collect();
    assert_eq!(updates.len(), 3);
    assert!(updates.contains(&Audience::User(CUSTOMER_USER)));
    assert!(updates.contains(&Audience::User(VENDOR_USER)));
    assert!(updates.contains(&Audience::AdminOrders));
}

#[tokio::test]
async fn test_concurrent_confirm_has_single_winner() {
    let f = setup().await;
    let order = f.place().await;

    let attempts = (0..4).map(|_| {
        let manager = f.manager.clone();
        tokio::spawn(async move {
            manager
                .update_status(order.id, OrderStatus::Confirmed, None, ActorTag::Restaurant)
                .await
        })
    });
    let results = futures::future::join_all(attempts).await;

    let wins = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    assert_eq!(wins, 1);
    for result in &results {
        if let Ok(Err(err)) = result {
            assert!(matches!(
                err,
                ManagerError::InvalidTransition { .. } | ManagerError::VersionConflict(_)
            ));
        }
    }

    let stored = f.manager.get_order(order.id).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.status_history.len(), 2);
}

#[tokio::test]
async fn test_stale_version_write_is_refused() {
    let f = setup().await;
    let order = f.place().await;
    f.manager
        .update_status(order.id, OrderStatus::Confirmed, None, ActorTag::Restaurant)
        .await
        .unwrap();

    // `order` still carries version 0
    let mut stale = order.clone();
    stale.status = OrderStatus::Cancelled;
    let mut conn = f.db.pool.acquire().await.unwrap();
    let written = order_repo::update_versioned(&mut conn, &stale, stale.version)
        .await
        .unwrap();
    assert!(!written);
    drop(conn);

    let stored = f.manager.get_order(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Confirmed);
}

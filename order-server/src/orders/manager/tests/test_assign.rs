use super::*;

#[tokio::test]
async fn test_assign_partner_to_ready_order() {
    let f = setup().await;
    let order = f
        .place_and_advance(&[
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
        ])
        .await;
    let history_before = order.status_history.len();

    let assigned = f
        .manager
        .assign_delivery_partner(order.id, f.partner.id)
        .await
        .unwrap();

    assert_eq!(assigned.delivery_partner_id, Some(f.partner.id));
    assert_eq!(assigned.status, OrderStatus::ReadyForPickup);
    assert_eq!(assigned.version, order.version + 1);
    assert_eq!(assigned.status_history.len(), history_before);

    let inbox = f.inbox(PARTNER_USER).await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "Delivery Partner Assigned");
    assert_eq!(inbox[0].notification_type, shared::models::NotificationType::DeliveryPartner);
}

#[tokio::test]
async fn test_assignment_fans_out_to_partner() {
    let f = setup().await;
    let order = f.place().await;
    f.wait_for_events(2).await;

    f.manager
        .assign_delivery_partner(order.id, f.partner.id)
        .await
        .unwrap();

    // 2 new-order + 1 assignment + 4 updates (partner now included)
    let events = f.wait_for_events(7).await;
    assert_eq!(events.len(), 7);
    assert!(events.contains(&(Audience::User(PARTNER_USER), EventType::DeliveryAssignment)));
    assert!(events.contains(&(Audience::User(PARTNER_USER), EventType::OrderUpdate)));
    assert!(events.contains(&(Audience::AdminOrders, EventType::OrderUpdate)));
}

#[tokio::test]
async fn test_reassignment_replaces_partner() {
    let f = setup().await;
    let mut conn = f.db.pool.acquire().await.unwrap();
    let second = actor::create_partner(
        &mut conn,
        DeliveryPartnerCreate {
            user_id: 301,
            name: "Meena".into(),
            phone: None,
            status: Some(PartnerApprovalStatus::Approved),
            availability_status: Some(AvailabilityStatus::Online),
            is_available_for_orders: Some(true),
            current_latitude: None,
            current_longitude: None,
            max_concurrent_orders: None,
        },
    )
    .await
    .unwrap();
    drop(conn);

    let order = f.place().await;
    f.manager
        .assign_delivery_partner(order.id, f.partner.id)
        .await
        .unwrap();
    let order = f
        .manager
        .assign_delivery_partner(order.id, second.id)
        .await
        .unwrap();
    assert_eq!(order.delivery_partner_id, Some(second.id));
    assert_eq!(order.version, 2);

    let by_second = f.manager.orders_by_delivery_partner(second.id).await.unwrap();
    assert_eq!(by_second.len(), 1);
    assert!(f
        .manager
        .orders_by_delivery_partner(f.partner.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_assign_rejects_unknown_partner_and_order() {
    let f = setup().await;
    let order = f.place().await;

    let err = f
        .manager
        .assign_delivery_partner(order.id, 555)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::DeliveryPartnerNotFound(555)));

    let err = f
        .manager
        .assign_delivery_partner(777, f.partner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderNotFound(777)));
}

#[tokio::test]
async fn test_assign_rejects_terminal_orders() {
    let f = setup().await;
    let order = f.place().await;
    f.manager
        .cancel_order(order.id, "closed early", ActorTag::Restaurant)
        .await
        .unwrap();

    let err = f
        .manager
        .assign_delivery_partner(order.id, f.partner.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::OrderTerminal {
            status: OrderStatus::Cancelled,
            ..
        }
    ));
}

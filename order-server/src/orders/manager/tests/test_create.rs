use super::*;

#[tokio::test]
async fn test_create_prices_reference_order() {
    let f = setup().await;
    let order = f.place().await;

    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.subtotal, dec("250.00"));
    assert_eq!(order.delivery_fee, dec("20.00"));
    assert_eq!(order.platform_fee, dec("5.00"));
    assert_eq!(order.tax_amount, dec("12.50"));
    assert_eq!(order.discount_amount, Decimal::ZERO);
    assert_eq!(order.total_amount, dec("287.50"));
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.version, 0);
    assert!(order.order_number.starts_with("TT"));
    assert_eq!(order.delivery_otp.len(), 4);
    assert_eq!(
        order.estimated_delivery_time,
        Some(order.created_at + 40 * 60_000)
    );

    assert_eq!(order.items.len(), 2);
    let biryani = &order.items[0];
    assert_eq!(biryani.menu_item_name, "Chicken Biryani");
    assert_eq!(biryani.unit_price, dec("100.00"));
    assert_eq!(biryani.total_price, dec("200.00"));
    assert_eq!(biryani.special_instructions.as_deref(), Some("extra raita"));

    assert_eq!(order.status_history.len(), 1);
    let placed = &order.status_history[0];
    assert_eq!(placed.status, OrderStatus::Placed);
    assert_eq!(placed.changed_by, ActorTag::System);
    assert_eq!(placed.remarks.as_deref(), Some("Order placed by customer"));
}

#[tokio::test]
async fn test_create_increments_menu_item_counters() {
    let f = setup().await;
    f.place().await;
    f.place().await;

    assert_eq!(f.menu_item(f.biryani.id).await.total_orders, 4);
    assert_eq!(f.menu_item(f.naan.id).await.total_orders, 2);
}

#[tokio::test]
async fn test_create_uses_discounted_price_snapshot() {
    let f = setup().await;
    let mut conn = f.db.pool.acquire().await.unwrap();
    let dosa = catalog::create_menu_item(
        &mut conn,
        MenuItemCreate {
            restaurant_id: f.restaurant.id,
            name: "Masala Dosa".into(),
            price: dec("120.00"),
            discounted_price: Some(dec("99.50")),
            is_available: Some(true),
            is_active: Some(true),
        },
    )
    .await
    .unwrap();
    drop(conn);

    let mut req = f.request();
    req.items = vec![OrderItemRequest {
        menu_item_id: dosa.id,
        quantity: 1,
        special_instructions: None,
        customizations: vec![],
    }];
    let order = f.manager.create_order(req).await.unwrap();
    assert_eq!(order.items[0].unit_price, dec("99.50"));
    assert_eq!(order.subtotal, dec("99.50"));
    // 1.99 fee, 4.975 → 4.98 tax
    assert_eq!(order.platform_fee, dec("1.99"));
    assert_eq!(order.tax_amount, dec("4.98"));
    assert_eq!(order.total_amount, dec("126.47"));
}

#[tokio::test]
async fn test_create_writes_vendor_inbox_and_fans_out() {
    let f = setup().await;
    let order = f.place().await;

    let inbox = f.inbox(VENDOR_USER).await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "New Order");
    assert_eq!(inbox[0].order_id, Some(order.id));
    assert!(!inbox[0].is_read);

    let events = f.wait_for_events(2).await;
    assert_eq!(events.len(), 2);
    assert!(events.contains(&(Audience::User(VENDOR_USER), EventType::NewOrder)));
    assert!(events.contains(&(Audience::AdminOrders, EventType::NewOrder)));
}

#[tokio::test]
async fn test_unavailable_item_persists_nothing() {
    let f = setup().await;
    let mut conn = f.db.pool.acquire().await.unwrap();
    catalog::set_menu_item_availability(&mut conn, f.naan.id, false, true)
        .await
        .unwrap();
    drop(conn);

    let err = f.manager.create_order(f.request()).await.unwrap_err();
    match err {
        ManagerError::MenuItemUnavailable { menu_item_id, name } => {
            assert_eq!(menu_item_id, f.naan.id);
            assert_eq!(name, "Butter Naan");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(f.order_count().await, 0);
    assert_eq!(f.menu_item(f.biryani.id).await.total_orders, 0);
    assert!(f.inbox(VENDOR_USER).await.is_empty());
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(f.publisher.events().is_empty());
}

#[tokio::test]
async fn test_inactive_item_is_rejected() {
    let f = setup().await;
    let mut conn = f.db.pool.acquire().await.unwrap();
    catalog::set_menu_item_availability(&mut conn, f.biryani.id, true, false)
        .await
        .unwrap();
    drop(conn);

    let err = f.manager.create_order(f.request()).await.unwrap_err();
    assert!(matches!(err, ManagerError::MenuItemUnavailable { .. }));
}

#[tokio::test]
async fn test_create_rejects_unknown_references() {
    let f = setup().await;

    let mut req = f.request();
    req.customer_id = 999;
    assert!(matches!(
        f.manager.create_order(req).await.unwrap_err(),
        ManagerError::CustomerNotFound(999)
    ));

    let mut req = f.request();
    req.restaurant_id = 999;
    assert!(matches!(
        f.manager.create_order(req).await.unwrap_err(),
        ManagerError::RestaurantNotFound(999)
    ));

    let mut req = f.request();
    req.items[1].menu_item_id = 999;
    assert!(matches!(
        f.manager.create_order(req).await.unwrap_err(),
        ManagerError::MenuItemNotFound(999)
    ));
    assert_eq!(f.order_count().await, 0);
}

#[tokio::test]
async fn test_create_rejects_item_from_other_restaurant() {
    let f = setup().await;
    let mut conn = f.db.pool.acquire().await.unwrap();
    let other = catalog::create_restaurant(
        &mut conn,
        RestaurantCreate {
            vendor_user_id: 201,
            name: "Dosa Corner".into(),
            address: None,
            latitude: None,
            longitude: None,
            delivery_fee: None,
            delivery_time_max: None,
            is_accepting_orders: None,
        },
    )
    .await
    .unwrap();
    let idli = catalog::create_menu_item(
        &mut conn,
        MenuItemCreate {
            restaurant_id: other.id,
            name: "Idli".into(),
            price: dec("40.00"),
            discounted_price: None,
            is_available: None,
            is_active: None,
        },
    )
    .await
    .unwrap();
    drop(conn);

    let mut req = f.request();
    req.items[0].menu_item_id = idli.id;
    let err = f.manager.create_order(req).await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::MenuItemRestaurantMismatch { menu_item_id, restaurant_id }
            if menu_item_id == idli.id && restaurant_id == f.restaurant.id
    ));
}

#[tokio::test]
async fn test_create_rejects_closed_restaurant() {
    let f = setup().await;
    let mut conn = f.db.pool.acquire().await.unwrap();
    let closed = catalog::create_restaurant(
        &mut conn,
        RestaurantCreate {
            vendor_user_id: 202,
            name: "Closed Kitchen".into(),
            address: None,
            latitude: None,
            longitude: None,
            delivery_fee: None,
            delivery_time_max: None,
            is_accepting_orders: Some(false),
        },
    )
    .await
    .unwrap();
    drop(conn);

    let mut req = f.request();
    req.restaurant_id = closed.id;
    let err = f.manager.create_order(req).await.unwrap_err();
    assert!(matches!(err, ManagerError::RestaurantNotAccepting(id) if id == closed.id));
}

#[tokio::test]
async fn test_create_rejects_empty_and_bad_quantities() {
    let f = setup().await;

    let mut req = f.request();
    req.items.clear();
    assert!(matches!(
        f.manager.create_order(req).await.unwrap_err(),
        ManagerError::EmptyOrder
    ));

    let mut req = f.request();
    req.items[1].quantity = 0;
    let err = f.manager.create_order(req).await.unwrap_err();
    assert!(matches!(err, ManagerError::InvalidQuantity { index: 1, quantity: 0 }));
    assert_eq!(err.to_string(), "items[1].quantity: must be a positive integer, got 0");

    let mut req = f.request();
    req.items[0].quantity = -3;
    assert!(matches!(
        f.manager.create_order(req).await.unwrap_err(),
        ManagerError::InvalidQuantity { index: 0, quantity: -3 }
    ));
}

#[tokio::test]
async fn test_create_validates_address() {
    let f = setup().await;
    let mut req = f.request();
    req.delivery_address = String::new();
    assert!(matches!(
        f.manager.create_order(req).await.unwrap_err(),
        ManagerError::Validation(_)
    ));
    assert_eq!(f.order_count().await, 0);
}

#[tokio::test]
async fn test_discount_policy_is_applied_and_clamped() {
    struct FlatOff(Decimal);
    impl DiscountPolicy for FlatOff {
        fn discount(&self, ctx: &DiscountContext<'_>) -> Decimal {
            if ctx.promo_code == Some("FEAST") { self.0 } else { Decimal::ZERO }
        }
    }

    let f = setup().await;
    let manager = f
        .manager
        .clone()
        .with_discount_policy(Arc::new(FlatOff(dec("37.50"))));

    let mut req = f.request();
    req.promo_code = Some("FEAST".into());
    let order = manager.create_order(req).await.unwrap();
    assert_eq!(order.discount_amount, dec("37.50"));
    assert_eq!(order.total_amount, dec("250.00"));
    assert_eq!(order.promo_code.as_deref(), Some("FEAST"));

    let order = manager.create_order(f.request()).await.unwrap();
    assert_eq!(order.discount_amount, Decimal::ZERO);

    let greedy = f
        .manager
        .clone()
        .with_discount_policy(Arc::new(FlatOff(dec("10000"))));
    let mut req = f.request();
    req.promo_code = Some("FEAST".into());
    let order = greedy.create_order(req).await.unwrap();
    assert_eq!(order.discount_amount, dec("287.50"));
    assert_eq!(order.total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_order_numbers_are_unique() {
    let f = setup().await;
    let mut numbers = std::collections::HashSet::new();
    for _ in 0..20 {
        let order = f.place().await;
        assert!(numbers.insert(order.order_number));
    }
}

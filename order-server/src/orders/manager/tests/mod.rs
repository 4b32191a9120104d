use super::*;
use crate::notifications::dispatcher::tests::RecordingPublisher;
use shared::message::{Audience, EventType};
use shared::models::{
    AvailabilityStatus, Customer, CustomerCreate, DeliveryPartner, DeliveryPartnerCreate,
    MenuItemCreate, OrderItemRequest, PartnerApprovalStatus, PaymentMethod, Restaurant,
    RestaurantCreate,
};
use std::str::FromStr;
use std::time::Duration;

const CUSTOMER_USER: i64 = 100;
const VENDOR_USER: i64 = 200;
const PARTNER_USER: i64 = 300;

struct Fixture {
    manager: OrdersManager,
    publisher: Arc<RecordingPublisher>,
    db: DbService,
    customer: Customer,
    restaurant: Restaurant,
    /// 100.00
    biryani: MenuItem,
    /// 50.00
    naan: MenuItem,
    partner: DeliveryPartner,
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn setup() -> Fixture {
    setup_with(DbService::in_memory().await.unwrap()).await
}

async fn setup_with(db: DbService) -> Fixture {
    let publisher = Arc::new(RecordingPublisher::default());
    let manager = OrdersManager::new(db.clone(), NotificationDispatcher::new(publisher.clone()));

    let mut conn = db.pool.acquire().await.unwrap();
    let customer = actor::create_customer(
        &mut conn,
        CustomerCreate {
            user_id: CUSTOMER_USER,
            name: "Asha".into(),
            phone: None,
        },
    )
    .await
    .unwrap();
    let restaurant = catalog::create_restaurant(
        &mut conn,
        RestaurantCreate {
            vendor_user_id: VENDOR_USER,
            name: "Spice Hub".into(),
            address: None,
            latitude: Some(12.9716),
            longitude: Some(77.5946),
            delivery_fee: Some(dec("20.00")),
            delivery_time_max: Some(40),
            is_accepting_orders: Some(true),
        },
    )
    .await
    .unwrap();
    let biryani = catalog::create_menu_item(
        &mut conn,
        MenuItemCreate {
            restaurant_id: restaurant.id,
            name: "Chicken Biryani".into(),
            price: dec("100.00"),
            discounted_price: None,
            is_available: Some(true),
            is_active: Some(true),
        },
    )
    .await
    .unwrap();
    let naan = catalog::create_menu_item(
        &mut conn,
        MenuItemCreate {
            restaurant_id: restaurant.id,
            name: "Butter Naan".into(),
            price: dec("50.00"),
            discounted_price: None,
            is_available: Some(true),
            is_active: Some(true),
        },
    )
    .await
    .unwrap();
    let partner = actor::create_partner(
        &mut conn,
        DeliveryPartnerCreate {
            user_id: PARTNER_USER,
            name: "Ravi".into(),
            phone: None,
            status: Some(PartnerApprovalStatus::Approved),
            availability_status: Some(AvailabilityStatus::Online),
            is_available_for_orders: Some(true),
            current_latitude: Some(12.97),
            current_longitude: Some(77.59),
            max_concurrent_orders: Some(2),
        },
    )
    .await
    .unwrap();
    drop(conn);

    Fixture {
        manager,
        publisher,
        db,
        customer,
        restaurant,
        biryani,
        naan,
        partner,
    }
}

impl Fixture {
    /// 2 × biryani + 1 × naan
    fn request(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: self.customer.id,
            restaurant_id: self.restaurant.id,
            items: vec![
                OrderItemRequest {
                    menu_item_id: self.biryani.id,
                    quantity: 2,
                    special_instructions: Some("extra raita".into()),
                    customizations: vec![],
                },
                OrderItemRequest {
                    menu_item_id: self.naan.id,
                    quantity: 1,
                    special_instructions: None,
                    customizations: vec![],
                },
            ],
            delivery_address: "12 MG Road, Bengaluru".into(),
            delivery_latitude: Some(12.975),
            delivery_longitude: Some(77.605),
            delivery_instructions: None,
            special_instructions: None,
            payment_method: PaymentMethod::Upi,
            promo_code: None,
        }
    }

    async fn place(&self) -> Order {
        self.manager.create_order(self.request()).await.unwrap()
    }

    /// Walk a fresh order forward through `path`
    async fn place_and_advance(&self, path: &[OrderStatus]) -> Order {
        let mut order = self.place().await;
        for status in path {
            order = self
                .manager
                .update_status(order.id, *status, None, ActorTag::Restaurant)
                .await
                .unwrap();
        }
        order
    }

    async fn menu_item(&self, id: i64) -> MenuItem {
        let mut conn = self.db.pool.acquire().await.unwrap();
        catalog::find_menu_item(&mut conn, id).await.unwrap().unwrap()
    }

    async fn inbox(&self, user_id: i64) -> Vec<shared::models::Notification> {
        let mut conn = self.db.pool.acquire().await.unwrap();
        notification::find_all(&mut conn, Some(user_id)).await.unwrap()
    }

    async fn order_count(&self) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.db.pool)
            .await
            .unwrap();
        n
    }

    /// Poll until the detached fan-out has published at least `n` events
    async fn wait_for_events(&self, n: usize) -> Vec<(Audience, EventType)> {
        for _ in 0..100 {
            let events = self.publisher.events();
            if events.len() >= n {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.publisher.events()
    }
}

const TO_DELIVERED: [OrderStatus; 6] = [
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::ReadyForPickup,
    OrderStatus::PickedUp,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

mod test_assign;
mod test_cancel;
mod test_create;
mod test_transitions;

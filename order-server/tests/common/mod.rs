//! In-process harness for the HTTP tests
//!
//! Builds the full app (middleware included) over an in-memory database and
//! drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use order_server::api::build_app;
use order_server::auth::{USER_ID_HEADER, USER_ROLE_HEADER};
use order_server::db::repository::{actor, catalog};
use order_server::{Config, ServerState};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::models::{
    AvailabilityStatus, Customer, CustomerCreate, DeliveryPartner, DeliveryPartnerCreate,
    MenuItem, MenuItemCreate, PartnerApprovalStatus, Restaurant, RestaurantCreate, UserRole,
};
use tower::ServiceExt;

pub const ADMIN_USER: i64 = 1;
pub const CUSTOMER_USER: i64 = 100;
pub const VENDOR_USER: i64 = 200;
pub const PARTNER_USER: i64 = 300;

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    pub customer: Customer,
    pub restaurant: Restaurant,
    /// 100.00
    pub biryani: MenuItem,
    /// 50.00
    pub naan: MenuItem,
    pub partner: DeliveryPartner,
}

pub async fn spawn_app() -> TestApp {
    let state = ServerState::initialize(&Config::for_tests()).await.unwrap();

    let mut conn = state.db.pool.acquire().await.unwrap();
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
            address: Some("12 MG Road".into()),
            latitude: Some(12.9716),
            longitude: Some(77.5946),
            delivery_fee: Some(Decimal::new(2000, 2)),
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
            price: Decimal::new(10000, 2),
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
            price: Decimal::new(5000, 2),
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
            current_latitude: Some(12.9720),
            current_longitude: Some(77.5950),
            max_concurrent_orders: Some(2),
        },
    )
    .await
    .unwrap();
    drop(conn);

    TestApp {
        app: build_app(state.clone()),
        state,
        customer,
        restaurant,
        biryani,
        naan,
        partner,
    }
}

/// Caller identity forwarded by the gateway
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: i64,
    pub role: UserRole,
}

pub const ADMIN: Caller = Caller {
    user_id: ADMIN_USER,
    role: UserRole::Admin,
};
pub const CUSTOMER: Caller = Caller {
    user_id: CUSTOMER_USER,
    role: UserRole::Customer,
};
pub const VENDOR: Caller = Caller {
    user_id: VENDOR_USER,
    role: UserRole::Vendor,
};
pub const PARTNER: Caller = Caller {
    user_id: PARTNER_USER,
    role: UserRole::DeliveryPartner,
};

impl TestApp {
    /// Send one request; returns the status and the decoded JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        caller: Option<Caller>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder
                .header(USER_ID_HEADER, caller.user_id.to_string())
                .header(USER_ROLE_HEADER, caller.role.as_str());
        }
        let request = match body {
            Some(json) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, caller: Caller) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(caller), None).await
    }

    pub async fn put(&self, uri: &str, caller: Caller) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(caller), None).await
    }

    /// 2 × biryani + 1 × naan, cash on delivery
    pub fn order_body(&self) -> Value {
        json!({
            "customerId": self.customer.id,
            "restaurantId": self.restaurant.id,
            "items": [
                { "menuItemId": self.biryani.id, "quantity": 2 },
                { "menuItemId": self.naan.id, "quantity": 1, "specialInstructions": "extra butter" }
            ],
            "deliveryAddress": "221B Baker Street",
            "deliveryLatitude": 12.9352,
            "deliveryLongitude": 77.6245,
            "paymentMethod": "CASH_ON_DELIVERY"
        })
    }

    /// Place the reference order as the customer; returns the order JSON
    pub async fn place_order(&self) -> Value {
        let (status, body) = self
            .send(Method::POST, "/orders", Some(CUSTOMER), Some(self.order_body()))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }

    /// Walk an order forward through `statuses` as the vendor
    pub async fn advance(&self, order_id: i64, statuses: &[&str]) -> Value {
        let mut last = Value::Null;
        for status in statuses {
            let (code, body) = self
                .put(&format!("/orders/{order_id}/status?status={status}"), VENDOR)
                .await;
            assert_eq!(code, StatusCode::OK, "{status}: {body}");
            last = body["data"].clone();
        }
        last
    }
}

pub fn order_id(order: &Value) -> i64 {
    order["id"].as_i64().unwrap()
}

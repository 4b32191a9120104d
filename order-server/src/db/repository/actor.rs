//! Actor Directory Repository (customers, delivery partners)

use super::{RepoError, RepoResult};
use crate::utils::geo::haversine_meters;
use shared::models::{
    AvailabilityStatus, Customer, CustomerCreate, DeliveryPartner, DeliveryPartnerCreate,
    NearbyPartner, PartnerApprovalStatus,
};
use sqlx::SqliteConnection;

const CUSTOMER_SELECT: &str =
    "SELECT id, user_id, name, phone, loyalty_points, created_at FROM customer";
const PARTNER_SELECT: &str = "SELECT id, user_id, name, phone, status, availability_status, is_available_for_orders, current_latitude, current_longitude, max_concurrent_orders, current_order_count, created_at FROM delivery_partner";

// =============================================================================
// Customer
// =============================================================================

pub async fn find_customer(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!("{CUSTOMER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(customer)
}

pub async fn create_customer(
    conn: &mut SqliteConnection,
    data: CustomerCreate,
) -> RepoResult<Customer> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO customer (id, user_id, name, phone, loyalty_points, created_at) VALUES (?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_customer(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

// =============================================================================
// Delivery partner
// =============================================================================

pub async fn find_partner(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<DeliveryPartner>> {
    let partner = sqlx::query_as::<_, DeliveryPartner>(&format!("{PARTNER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(partner)
}

pub async fn create_partner(
    conn: &mut SqliteConnection,
    data: DeliveryPartnerCreate,
) -> RepoResult<DeliveryPartner> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO delivery_partner (id, user_id, name, phone, status, availability_status, is_available_for_orders, current_latitude, current_longitude, max_concurrent_orders, current_order_count, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(data.status.unwrap_or_default())
    .bind(data.availability_status.unwrap_or_default())
    .bind(data.is_available_for_orders.unwrap_or(false))
    .bind(data.current_latitude)
    .bind(data.current_longitude)
    .bind(data.max_concurrent_orders.unwrap_or(1))
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_partner(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create delivery partner".into()))
}

/// Partners eligible for new work that report a position
///
/// Approved, online, taking orders and under their concurrent order limit.
/// Distance filtering happens in the caller.
pub async fn find_available_partners(
    conn: &mut SqliteConnection,
) -> RepoResult<Vec<DeliveryPartner>> {
    let partners = sqlx::query_as::<_, DeliveryPartner>(&format!(
        "{PARTNER_SELECT} WHERE status = ? AND availability_status = ? AND is_available_for_orders = 1 AND current_order_count < max_concurrent_orders AND current_latitude IS NOT NULL AND current_longitude IS NOT NULL"
    ))
    .bind(PartnerApprovalStatus::Approved)
    .bind(AvailabilityStatus::Online)
    .fetch_all(&mut *conn)
    .await?;
    Ok(partners)
}

/// Available partners within `radius_meters` of a point, nearest first
pub async fn find_available_partners_near(
    conn: &mut SqliteConnection,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
) -> RepoResult<Vec<NearbyPartner>> {
    let mut nearby: Vec<NearbyPartner> = find_available_partners(conn)
        .await?
        .into_iter()
        .filter_map(|partner| {
            let (lat, lon) = (partner.current_latitude?, partner.current_longitude?);
            let distance_meters = haversine_meters(latitude, longitude, lat, lon);
            (distance_meters <= radius_meters).then_some(NearbyPartner {
                partner,
                distance_meters,
            })
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    Ok(nearby)
}

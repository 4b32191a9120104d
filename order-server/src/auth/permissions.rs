//! Role Rules
//!
//! 每个受保护操作允许的角色。按 id / 订单号读取订单对所有已认证角色开放。

use shared::models::UserRole::{self, Admin, Customer, DeliveryPartner, Vendor};

pub const CREATE_ORDER: &[UserRole] = &[Customer, Admin];
pub const UPDATE_STATUS: &[UserRole] = &[Vendor, DeliveryPartner, Admin];
pub const CANCEL_ORDER: &[UserRole] = &[Customer, Vendor, Admin];
pub const ASSIGN_PARTNER: &[UserRole] = &[Admin];

pub const CUSTOMER_ORDERS: &[UserRole] = &[Customer, Admin];
pub const RESTAURANT_ORDERS: &[UserRole] = &[Vendor, Admin];
pub const PARTNER_ORDERS: &[UserRole] = &[DeliveryPartner, Admin];
pub const PENDING_ORDERS: &[UserRole] = &[Admin, DeliveryPartner];
pub const READY_FOR_PICKUP: &[UserRole] = &[Admin, DeliveryPartner];

pub const LIST_ORDERS: &[UserRole] = &[Admin];

// 报表
pub const TODAY_ORDERS: &[UserRole] = &[Admin];
pub const REVENUE: &[UserRole] = &[Admin];

pub const AVAILABLE_PARTNERS: &[UserRole] = &[Admin, Vendor];

/// 通知收件箱 (管理后台)
pub const NOTIFICATION_INBOX: &[UserRole] = &[Admin];

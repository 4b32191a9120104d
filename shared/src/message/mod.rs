//! 消息总线消息类型定义
//!
//! 这些类型在 order-server 和订阅方之间共享。每条消息都带有一个
//! [`Audience`]，订阅方按受众过滤自己关心的消息。

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::UserRole;

pub mod payload;
pub use payload::*;

/// 消息受众 - 对应一个逻辑推送通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Audience {
    /// 单个用户的私有队列
    User(i64),
    /// 管理员订单主题
    AdminOrders,
    /// 某个角色的系统公告主题
    RoleSystem(UserRole),
}

impl Audience {
    /// 通道键
    pub fn key(&self) -> String {
        match self {
            Self::User(user_id) => format!("/user/{user_id}/queue/notifications"),
            Self::AdminOrders => "/topic/admin/orders".to_string(),
            Self::RoleSystem(role) => {
                let segment = match role {
                    UserRole::Admin => "admin",
                    UserRole::Vendor => "vendor",
                    UserRole::DeliveryPartner => "delivery",
                    UserRole::Customer => "customer",
                };
                format!("/topic/{segment}/system")
            }
        }
    }

    /// 某个调用者可以收听的全部受众
    pub fn subscriptions_for(user_id: i64, role: UserRole) -> Vec<Audience> {
        let mut audiences = vec![Self::User(user_id), Self::RoleSystem(role)];
        if role == UserRole::Admin {
            audiences.push(Self::AdminOrders);
        }
        audiences
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// 总线消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    /// 用于消息追踪
    pub request_id: Uuid,
    pub audience: Audience,
    pub payload: BusPayload,
}

impl BusMessage {
    pub fn new(audience: Audience, payload: impl Into<BusPayload>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            audience,
            payload: payload.into(),
        }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

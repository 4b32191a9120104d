//! 调用者身份模块
//!
//! 会话层在上游完成认证，并通过请求头转发调用者身份：
//! - `x-user-id` - 用户 ID (i64)
//! - `x-user-role` - 角色 ([`UserRole`])
//!
//! - [`CurrentUser`] - 当前用户上下文 (Axum 提取器)
//! - [`permissions`] - 各操作允许的角色

pub mod extractor;
pub mod permissions;

use shared::models::{ActorTag, UserRole};

use crate::utils::{AppError, ErrorCode};

/// 用户 ID 请求头
pub const USER_ID_HEADER: &str = "x-user-id";
/// 用户角色请求头
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// 当前用户上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// 角色不在允许列表中时返回 403
    pub fn require_any(&self, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        crate::security_log!(
            "WARN",
            "role_denied",
            user_id = self.user_id,
            role = self.role.as_str()
        );
        let roles: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
        Err(
            AppError::with_message(ErrorCode::RoleRequired, format!("Requires role: {}", roles.join(", ")))
                .with_detail("role", self.role.as_str()),
        )
    }

    /// 状态历史与取消记录中使用的操作者标签
    pub fn actor_tag(&self) -> ActorTag {
        match self.role {
            UserRole::Customer => ActorTag::Customer,
            UserRole::Vendor => ActorTag::Restaurant,
            UserRole::DeliveryPartner => ActorTag::DeliveryPartner,
            UserRole::Admin => ActorTag::Admin,
        }
    }
}

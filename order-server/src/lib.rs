//! Order Server - 外卖平台订单引擎
//!
//! # 架构概述
//!
//! - **订单引擎** (`orders`): 下单、状态流转、取消、骑手指派
//! - **定价** (`pricing`): 小计、平台费、税费、配送费
//! - **通知** (`notifications`): 实时推送 + 持久化收件箱
//! - **消息总线** (`message`): 进程内广播，按受众过滤
//! - **数据库** (`db`): SQLite (sqlx)，金额以分存储
//! - **身份** (`auth`): 网关转发的调用者身份头
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # 调用者身份、角色规则
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单引擎
//! ├── pricing/       # 金额计算
//! ├── notifications/ # 推送与收件箱
//! ├── message/       # 消息总线
//! ├── db/            # 连接池、迁移、仓储
//! └── utils/         # 错误、日志、地理距离
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod notifications;
pub mod orders;
pub mod pricing;
pub mod utils;

// Re-export 公共类型
pub use auth::CurrentUser;
pub use core::{Config, Server, ServerState};
pub use message::{BusMessage, EventType, MessageBus};
pub use orders::OrdersManager;
pub use pricing::PricingRates;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

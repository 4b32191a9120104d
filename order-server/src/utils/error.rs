//! 统一错误处理
//!
//! 错误类型定义在 `shared::error`，这里只做再导出并提供成功响应的快捷函数。
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Order 42"))
//!
//! // 返回成功响应
//! Ok(ok(order))
//! ```

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 成功响应
pub fn ok<T>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

/// 带自定义消息的成功响应
pub fn ok_with_message<T>(data: T, message: impl Into<String>) -> ApiResponse<T> {
    ApiResponse::success_with_message(message, data)
}

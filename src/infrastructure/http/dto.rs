//! Data Transfer Objects
//!
//! 统一响应信封和各接口共用的请求体

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// 共用请求体
// ============================================================================

/// 按 ID 获取资源
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: Uuid,
}

/// 只携带会话 ID 的请求
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success(3)).unwrap();
        assert_eq!(json["errno"], 0);
        assert_eq!(json["error"], "");
        assert_eq!(json["data"], 3);

        let json = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert!(json["data"].is_object());
    }
}

//! Route Handler - 查询参数到页面的解析

use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::Route;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub story: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub route: Route,
    /// 规范化后的查询字符串
    pub query: String,
}

/// 解析 `?story=` / `?page=`，`story` 优先
pub async fn resolve_route(
    Query(params): Query<RouteQuery>,
) -> Result<Json<ApiResponse<RouteResponse>>, ApiError> {
    let route = Route::from_query(params.story.as_deref(), params.page.as_deref())?;

    Ok(Json(ApiResponse::success(RouteResponse {
        query: route.to_query(),
        route,
    })))
}

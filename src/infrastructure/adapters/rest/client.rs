//! PostgREST Client - 托管数据库的 REST 接口
//!
//! 表路径: {base_url}/rest/v1/{table}
//! 鉴权: `apikey` 头 + `Authorization: Bearer {api_key}`
//! 过滤: `?column=eq.value`，排序: `?order=column.asc`
//! 写操作带 `Prefer: return=representation`，以返回行数判断目标是否存在

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::RepositoryError;

/// REST 客户端配置
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// 匿名/服务密钥
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl RestClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// 服务端错误体
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// PostgREST 客户端
pub struct PostgrestClient {
    client: Client,
    config: RestClientConfig,
}

impl PostgrestClient {
    pub fn new(config: RestClientConfig) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepositoryError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            table
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// 查询行
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, RepositoryError> {
        let request = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*")])
            .query(query);

        let response = send(request).await?;
        decode(response).await
    }

    /// 插入一行
    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<(), RepositoryError> {
        let request = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(body);

        send(request).await?;
        Ok(())
    }

    /// 更新匹配的行，返回受影响行数
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        filter: &[(&str, String)],
        body: &B,
    ) -> Result<usize, RepositoryError> {
        let request = self
            .authorized(self.client.patch(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(filter)
            .json(body);

        let response = send(request).await?;
        let rows: Vec<serde_json::Value> = decode(response).await?;
        Ok(rows.len())
    }

    /// 删除匹配的行，返回受影响行数
    pub async fn delete(
        &self,
        table: &str,
        filter: &[(&str, String)],
    ) -> Result<usize, RepositoryError> {
        let request = self
            .authorized(self.client.delete(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(filter);

        let response = send(request).await?;
        let rows: Vec<serde_json::Value> = decode(response).await?;
        Ok(rows.len())
    }
}

/// 等值过滤参数
pub fn eq(column: &'static str, value: impl ToString) -> (&'static str, String) {
    (column, format!("eq.{}", value.to_string()))
}

async fn send(request: RequestBuilder) -> Result<Response, RepositoryError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            RepositoryError::NetworkError("Request timed out".to_string())
        } else {
            RepositoryError::NetworkError(e.to_string())
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(text);

    tracing::warn!(status = %status, message = %message, "Hosted database request failed");

    Err(match status {
        StatusCode::CONFLICT => RepositoryError::Duplicate(message),
        _ => RepositoryError::DatabaseError(format!("HTTP {}: {}", status, message)),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RepositoryError> {
    response
        .json()
        .await
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

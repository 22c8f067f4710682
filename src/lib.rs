//! Storyline - 作品与章节写作服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story: 作品（标题、简介）
//! - Chapter: 章节（草稿/已发布）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, Editor, SessionManager）
//! - Editor: 章节编辑会话（防抖自动保存、发布、删除）
//! - Commands / Queries: CQRS 处理器
//! - Views: 作品列表与路由
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: JSON API + WebSocket
//! - Memory: 会话注册表与内存存储
//! - Worker: 空闲会话回收
//! - Persistence: SQLite 存储
//! - Adapters: 托管数据库（PostgREST）
//! - Editor: HTML 文档编辑器
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

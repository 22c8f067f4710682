//! 页面视图：作品列表与路由

mod dashboard;
mod navigation;

pub use dashboard::{DashboardLoader, DashboardView};
pub use navigation::{require_story, Route, CREATE_PAGE};

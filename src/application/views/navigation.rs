//! Navigation - 路由解析
//!
//! 页面状态由查询参数 `story` 和 `page` 决定

use serde::Serialize;
use uuid::Uuid;

use crate::application::error::ApplicationError;

/// 创建作品页面的 `page` 参数值
pub const CREATE_PAGE: &str = "create";

/// 路由目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Route {
    Dashboard,
    CreateStory,
    Editor { story_id: Uuid },
}

impl Route {
    /// 根据查询参数解析路由
    ///
    /// `story` 优先于 `page`
    pub fn from_query(story: Option<&str>, page: Option<&str>) -> Result<Self, ApplicationError> {
        match story.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let story_id = Uuid::parse_str(raw).map_err(|_| {
                    ApplicationError::validation(format!("Invalid story id: {}", raw))
                })?;
                Ok(Self::Editor { story_id })
            }
            None if page == Some(CREATE_PAGE) => Ok(Self::CreateStory),
            None => Ok(Self::Dashboard),
        }
    }

    /// 生成对应的查询字符串
    pub fn to_query(&self) -> String {
        match self {
            Self::Dashboard => String::new(),
            Self::CreateStory => format!("?page={}", CREATE_PAGE),
            Self::Editor { story_id } => format!("?story={}", story_id),
        }
    }
}

/// 编辑器入口：没有作品上下文时阻止打开
pub fn require_story(story_id: Option<Uuid>) -> Result<Uuid, ApplicationError> {
    story_id.ok_or_else(|| ApplicationError::missing_context("No story selected"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_param_wins() {
        let id = Uuid::new_v4();
        let route = Route::from_query(Some(&id.to_string()), Some("create")).unwrap();
        assert_eq!(route, Route::Editor { story_id: id });
        assert_eq!(route.to_query(), format!("?story={}", id));
    }

    #[test]
    fn test_page_routing() {
        assert_eq!(
            Route::from_query(None, Some("create")).unwrap(),
            Route::CreateStory
        );
        assert_eq!(Route::from_query(None, Some("other")).unwrap(), Route::Dashboard);
        assert_eq!(Route::from_query(Some(""), None).unwrap(), Route::Dashboard);
    }

    #[test]
    fn test_invalid_story_id() {
        assert!(matches!(
            Route::from_query(Some("not-a-uuid"), None),
            Err(ApplicationError::ValidationError(_))
        ));
    }

    #[test]
    fn test_editor_requires_story() {
        assert!(matches!(
            require_story(None),
            Err(ApplicationError::MissingContext(_))
        ));
        let id = Uuid::new_v4();
        assert_eq!(require_story(Some(id)).unwrap(), id);
    }
}

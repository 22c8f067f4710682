//! Story Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 作品唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(Uuid);

impl StoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 作品标题
///
/// 不变量: 去除首尾空白后非空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTitle(String);

impl StoryTitle {
    pub fn new(title: impl AsRef<str>) -> Result<Self, &'static str> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err("Story title is required");
        }
        Ok(Self(title.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for StoryTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 作品简介（可为空，去除首尾空白）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description(String);

impl Description {
    pub fn new(description: Option<&str>) -> Self {
        Self(description.map(str::trim).unwrap_or_default().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_trimmed() {
        let title = StoryTitle::new("  My Story \n").unwrap();
        assert_eq!(title.as_str(), "My Story");
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(StoryTitle::new("").is_err());
        assert!(StoryTitle::new("   \t ").is_err());
    }

    #[test]
    fn test_long_title_kept_intact() {
        let long = "字".repeat(500);
        let title = StoryTitle::new(format!("  {}  ", long)).unwrap();
        assert_eq!(title.as_str(), long);
    }

    #[test]
    fn test_description_trimmed_and_optional() {
        assert_eq!(Description::new(Some("  about  ")).as_str(), "about");
        assert!(Description::new(None).is_empty());
    }
}

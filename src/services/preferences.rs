/// 偏好设置服务
///
/// 唯一持久化的用户偏好是主题，存放在一个字符串键值 JSON 文件里。
use crate::error::{AppError, AppResult};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// 主题偏好的存储键
pub const THEME_KEY: &str = "ripasso-theme";

/// 界面主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// 无法识别的值按默认主题处理
    pub fn parse(value: &str) -> Self {
        match value {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// 切换按钮上显示的图标（指向另一个主题）
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 键值偏好存储
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// 打开偏好文件，不存在或内容损坏时视为空
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                debug!("偏好文件无法解析，忽略: {}", e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub async fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| AppError::Preferences(e.into()))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(AppError::Preferences)
    }

    /// 当前主题，默认深色
    pub fn theme(&self) -> Theme {
        self.get(THEME_KEY).map(Theme::parse).unwrap_or_default()
    }

    pub async fn set_theme(&mut self, theme: Theme) -> AppResult<()> {
        self.set(THEME_KEY, theme.as_str()).await
    }

    /// 切换并保存主题，返回新主题
    pub async fn toggle_theme(&mut self) -> AppResult<Theme> {
        let next = self.theme().toggled();
        self.set_theme(next).await?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_theme_is_dark() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json")).await;
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.theme().toggle_icon(), "☀️");
    }

    #[tokio::test]
    async fn test_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PreferenceStore::open(&path).await;
        assert_eq!(store.toggle_theme().await.unwrap(), Theme::Light);

        let reopened = PreferenceStore::open(&path).await;
        assert_eq!(reopened.theme(), Theme::Light);
        assert_eq!(reopened.get(THEME_KEY), Some("light"));
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{{{").unwrap();

        let store = PreferenceStore::open(&path).await;
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_missing_directory_keeps_defaults() {
        let store = tokio_test::block_on(PreferenceStore::open("/nonexistent/ripasso/prefs.json"));
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY), None);
    }

    #[test]
    fn test_unknown_value_is_dark() {
        assert_eq!(Theme::parse("sepia"), Theme::Dark);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}

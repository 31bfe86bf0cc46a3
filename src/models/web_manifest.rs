use serde::{Deserialize, Serialize};

/// 可安装应用描述文件（`manifest.webmanifest`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAppManifest {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default = "default_start_url")]
    pub start_url: String,
    #[serde(default = "default_display")]
    pub display: String,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub theme_color: Option<String>,
}

fn default_start_url() -> String {
    "./".to_string()
}

fn default_display() -> String {
    "standalone".to_string()
}

impl WebAppManifest {
    /// 标题栏使用的名称，优先短名
    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

impl Default for WebAppManifest {
    fn default() -> Self {
        Self {
            name: "Ripasso".to_string(),
            short_name: None,
            start_url: default_start_url(),
            display: default_display(),
            background_color: None,
            theme_color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let m: WebAppManifest = serde_json::from_str(
            r##"{"name":"Ripasso Scuola","short_name":"Ripasso","theme_color":"#111"}"##,
        )
        .unwrap();
        assert_eq!(m.display_name(), "Ripasso");
        assert_eq!(m.display, "standalone");
        assert_eq!(m.start_url, "./");
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 站点根地址：`http(s)://` 地址或本地目录
    pub site: String,
    /// 科目清单路径（相对站点根）
    pub manifest_path: String,
    /// 离线缓存拦截的数据目录标记
    pub data_segment: String,
    /// 缓存版本名，修改它是唯一的壳资源失效方式
    pub cache_version: String,
    /// 缓存目录
    pub cache_dir: String,
    /// 离线缓存 worker 注册路径
    pub worker_script: String,
    /// 安装时预缓存的壳资源
    pub shell_assets: Vec<String>,
    /// 偏好设置文件（主题）
    pub prefs_file: String,
    /// 网络请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: "site".to_string(),
            manifest_path: "data/manifest.json".to_string(),
            data_segment: "/data/".to_string(),
            cache_version: "ripasso-v1".to_string(),
            cache_dir: ".ripasso-cache".to_string(),
            worker_script: "js/sw.js".to_string(),
            shell_assets: [
                "./",
                "./index.html",
                "./manifest.webmanifest",
                "./data/manifest.json",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            prefs_file: ".ripasso-prefs.json".to_string(),
            request_timeout_secs: 10,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，环境变量优先
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        Self {
            site: std::env::var("RIPASSO_SITE").unwrap_or(self.site),
            cache_dir: std::env::var("RIPASSO_CACHE_DIR").unwrap_or(self.cache_dir),
            cache_version: std::env::var("RIPASSO_CACHE_VERSION").unwrap_or(self.cache_version),
            prefs_file: std::env::var("RIPASSO_PREFS_FILE").unwrap_or(self.prefs_file),
            request_timeout_secs: std::env::var("RIPASSO_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            site = "https://example.org/ripasso/"
            shell_assets = ["./", "./data/manifest.json"]
            "#,
        )
        .unwrap();

        assert_eq!(config.site, "https://example.org/ripasso/");
        assert_eq!(config.shell_assets.len(), 2);
        assert_eq!(config.cache_version, "ripasso-v1");
        assert_eq!(config.data_segment, "/data/");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ripasso.toml");
        std::fs::write(&path, "worker_script = \"sw.js\"\nrequest_timeout_secs = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.worker_script, "sw.js");
        assert_eq!(config.manifest_path, "data/manifest.json");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = Config::load(Path::new("/nonexistent/ripasso.toml")).unwrap_err();
        assert!(err.to_string().contains("无法读取配置文件"));
    }
}

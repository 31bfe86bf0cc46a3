//! 网络层 - 基础设施层
//!
//! 只暴露"按地址取回响应"的能力，不认识清单、章节或缓存。
//! 站点既可以是 `http(s)://` 远程地址，也可以是本地目录（`file://`）。

use crate::error::NetworkError;
use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 一次请求的完整响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetResponse {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub content_type: Option<String>,
    pub body: String,
}

impl NetResponse {
    pub fn new(url: &Url, status: u16, content_type: Option<String>, body: String) -> Self {
        Self {
            url: url.to_string(),
            status,
            content_type,
            body,
        }
    }

    /// 状态码是否为 2xx
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 网络能力
///
/// 只有"没有拿到任何响应"才返回错误，非 2xx 状态码是正常的响应。
pub trait Network: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<NetResponse, NetworkError>> + Send;
}

/// 基于 reqwest 的 HTTP 网络
#[derive(Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("无法创建 HTTP 客户端")?;
        Ok(Self { client })
    }
}

impl Network for HttpNetwork {
    async fn fetch(&self, url: &Url) -> Result<NetResponse, NetworkError> {
        debug!("GET {}", url);

        let unreachable = |e: reqwest::Error| NetworkError::Unreachable {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(unreachable)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(unreachable)?;

        Ok(NetResponse::new(url, status, content_type, body))
    }
}

/// 把本地目录当作站点的网络
///
/// 目录地址映射到其中的 `index.html`，不存在的文件返回 404。
#[derive(Clone, Default)]
pub struct DirectoryNetwork;

impl Network for DirectoryNetwork {
    async fn fetch(&self, url: &Url) -> Result<NetResponse, NetworkError> {
        if url.scheme() != "file" {
            return Err(NetworkError::UnsupportedScheme {
                url: url.to_string(),
            });
        }

        let mut path = url.to_file_path().map_err(|_| NetworkError::Unreachable {
            url: url.to_string(),
            reason: "无效的文件地址".to_string(),
        })?;
        if url.path().ends_with('/') || tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            path.push("index.html");
        }

        debug!("读取本地文件: {}", path.display());

        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(NetResponse::new(url, 200, content_type_for(&path), body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(NetResponse::new(url, 404, None, String::new())),
            Err(e) => Err(NetworkError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn content_type_for(path: &Path) -> Option<String> {
    let mime = match path.extension().and_then(|s| s.to_str())? {
        "json" => "application/json",
        "webmanifest" => "application/manifest+json",
        "html" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        _ => return None,
    };
    Some(mime.to_string())
}

/// 按站点地址协议分派的网络
#[derive(Clone)]
pub enum SiteNetwork {
    Http(HttpNetwork),
    Directory(DirectoryNetwork),
}

impl SiteNetwork {
    /// 根据站点根地址选择网络实现
    pub fn for_site(base: &Url, timeout: Duration) -> Result<Self> {
        match base.scheme() {
            "http" | "https" => Ok(SiteNetwork::Http(HttpNetwork::new(timeout)?)),
            "file" => Ok(SiteNetwork::Directory(DirectoryNetwork)),
            other => anyhow::bail!("不支持的站点协议: {}", other),
        }
    }
}

impl Network for SiteNetwork {
    async fn fetch(&self, url: &Url) -> Result<NetResponse, NetworkError> {
        match self {
            SiteNetwork::Http(network) => network.fetch(url).await,
            SiteNetwork::Directory(network) => network.fetch(url).await,
        }
    }
}

/// 把配置中的站点（远程地址或本地目录）解析成以 `/` 结尾的根地址
pub fn resolve_site(site: &str) -> Result<Url> {
    if site.starts_with("http://") || site.starts_with("https://") || site.starts_with("file://") {
        let mut url = Url::parse(site).with_context(|| format!("无效的站点地址: {}", site))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        return Ok(url);
    }

    let mut dir = PathBuf::from(site);
    if dir.is_relative() {
        dir = std::env::current_dir()
            .context("无法获取当前目录")?
            .join(dir);
    }
    Url::from_directory_path(&dir).map_err(|_| anyhow::anyhow!("无效的站点目录: {}", dir.display()))
}

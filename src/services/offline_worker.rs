//! 离线缓存 worker - 业务能力层
//!
//! ## 生命周期
//!
//! ```text
//! Parsed → Installing → Installed → Activating → Activated
//!              ↓
//!          Redundant（壳资源预缓存失败）
//! ```
//!
//! - 安装：把固定的壳资源整体写入当前版本的缓存，任一资源失败则什么都不写
//! - 激活：删除所有非当前版本的缓存，并立即接管已打开的页面
//! - 拦截：只处理站点范围内、路径包含数据目录标记的请求，缓存优先

use crate::error::{NetworkError, WorkerError};
use crate::infrastructure::{CacheStorage, NetResponse, Network, RegistrationRecord};
use futures::future::join_all;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// worker 生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    fn name(self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

/// 拦截结果
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// 不拦截，交给默认网络处理
    Passthrough,
    /// worker 给出的响应（缓存或网络）
    Responded(NetResponse),
}

/// 哪些请求属于数据资源
///
/// 只认站点范围内（同源且在站点根路径下）的请求，
/// 且相对站点根的路径包含数据目录标记。
#[derive(Debug, Clone)]
pub struct DataPathPolicy {
    scope: Url,
    segment: String,
}

impl DataPathPolicy {
    pub fn new(scope: Url, segment: impl Into<String>) -> Self {
        Self {
            scope,
            segment: segment.into(),
        }
    }

    pub fn intercepts(&self, url: &Url) -> bool {
        if url.origin() != self.scope.origin() && url.scheme() != "file" {
            return false;
        }
        if url.scheme() != self.scope.scheme() {
            return false;
        }

        // 站点根路径以 `/` 结尾，剥离后补回前导 `/` 再匹配标记
        match url.path().strip_prefix(self.scope.path()) {
            Some(rest) => format!("/{}", rest).contains(&self.segment),
            None => false,
        }
    }
}

/// 离线缓存 worker
pub struct OfflineWorker<N: Network> {
    cache_name: String,
    script: String,
    policy: DataPathPolicy,
    shell_assets: Vec<Url>,
    storage: Arc<CacheStorage>,
    network: Arc<N>,
    state: WorkerState,
    controls_clients: bool,
}

impl<N: Network> OfflineWorker<N> {
    pub fn new(
        cache_name: impl Into<String>,
        script: impl Into<String>,
        policy: DataPathPolicy,
        shell_assets: Vec<Url>,
        storage: Arc<CacheStorage>,
        network: Arc<N>,
    ) -> Self {
        Self {
            cache_name: cache_name.into(),
            script: script.into(),
            policy,
            shell_assets,
            storage,
            network,
            state: WorkerState::Parsed,
            controls_clients: false,
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// 是否已接管页面，只有接管后页面请求才会经过 worker
    pub fn controls_clients(&self) -> bool {
        self.controls_clients
    }

    pub fn intercepts(&self, url: &Url) -> bool {
        self.policy.intercepts(url)
    }

    /// 注册：同一脚本与版本已激活过则直接恢复，否则走安装和激活
    pub async fn register(mut self) -> Result<Self, WorkerError> {
        if self.resume().await {
            info!("♻️ 离线缓存 {} 已激活，直接使用", self.cache_name);
            return Ok(self);
        }

        self.install().await?;
        self.activate().await?;
        Ok(self)
    }

    async fn resume(&mut self) -> bool {
        let Some(record) = self.storage.registration().await else {
            return false;
        };

        let same_worker = record.script == self.script
            && record.scope == self.policy.scope.as_str()
            && record.active_version.as_deref() == Some(self.cache_name.as_str());
        if !same_worker || !self.storage.has(&self.cache_name).await {
            return false;
        }

        self.state = WorkerState::Activated;
        self.controls_clients = true;
        true
    }

    /// 安装：预缓存全部壳资源
    pub async fn install(&mut self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Parsed, "install")?;
        self.state = WorkerState::Installing;

        info!("📦 正在预缓存 {} 个壳资源...", self.shell_assets.len());

        let network = &self.network;
        let results = join_all(self.shell_assets.iter().map(|url| network.fetch(url))).await;

        let mut responses = Vec::with_capacity(results.len());
        for (url, result) in self.shell_assets.iter().zip(results) {
            let failure = match result {
                Ok(res) if res.is_ok() => {
                    responses.push(res);
                    continue;
                }
                Ok(res) => format!("状态码 {}", res.status),
                Err(e) => e.to_string(),
            };

            warn!("❌ 壳资源预缓存失败: {} ({})", url, failure);
            self.state = WorkerState::Redundant;
            return Err(WorkerError::InstallFailed {
                asset: url.to_string(),
                reason: failure,
            });
        }

        if let Err(e) = self.storage.put_all(&self.cache_name, responses).await {
            self.state = WorkerState::Redundant;
            return Err(e.into());
        }

        self.state = WorkerState::Installed;
        info!("✓ 壳资源已写入缓存 {}", self.cache_name);
        Ok(())
    }

    /// 激活：清理旧版本缓存并接管页面，返回被删除的缓存名
    pub async fn activate(&mut self) -> Result<Vec<String>, WorkerError> {
        self.expect_state(WorkerState::Installed, "activate")?;
        self.state = WorkerState::Activating;

        let mut deleted = Vec::new();
        for name in self.storage.keys().await {
            if name != self.cache_name {
                self.storage.delete(&name).await?;
                info!("🗑️ 删除旧缓存: {}", name);
                deleted.push(name);
            }
        }

        self.storage
            .set_registration(RegistrationRecord {
                script: self.script.clone(),
                scope: self.policy.scope.to_string(),
                active_version: Some(self.cache_name.clone()),
            })
            .await?;

        self.controls_clients = true;
        self.state = WorkerState::Activated;
        info!("✓ 离线缓存 {} 已激活", self.cache_name);
        Ok(deleted)
    }

    /// 处理一次页面请求
    ///
    /// 数据请求缓存优先；未命中时走网络并写回缓存（写入失败只记录日志）。
    /// 网络失败且无缓存时返回 `OfflineMiss`，不构造占位响应。
    pub async fn handle_fetch(&self, url: &Url) -> Result<FetchEvent, NetworkError> {
        if !self.intercepts(url) {
            return Ok(FetchEvent::Passthrough);
        }

        if let Some(cached) = self.storage.match_url(url.as_str()).await {
            debug!("缓存命中: {}", url);
            return Ok(FetchEvent::Responded(cached));
        }

        match self.network.fetch(url).await {
            Ok(res) => {
                if let Err(e) = self.storage.put(&self.cache_name, res.clone()).await {
                    warn!("写入缓存失败 {}: {}", url, e);
                }
                debug!("网络获取并缓存: {} ({})", url, res.status);
                Ok(FetchEvent::Responded(res))
            }
            Err(e) => {
                warn!("⚠️ 离线且无缓存: {} ({})", url, e);
                Err(NetworkError::OfflineMiss {
                    url: url.to_string(),
                })
            }
        }
    }

    fn expect_state(&self, expected: WorkerState, operation: &'static str) -> Result<(), WorkerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidState {
                state: self.state.name(),
                operation,
            })
        }
    }
}

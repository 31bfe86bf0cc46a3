/// 页面侧的请求入口
///
/// 离线 worker 接管页面后，所有请求先交给 worker；worker 不拦截的请求
/// 以及尚未接管时的请求直接走网络。
use crate::error::NetworkError;
use crate::infrastructure::{NetResponse, Network};
use crate::services::{FetchEvent, OfflineWorker};
use reqwest::Url;
use std::sync::Arc;

pub struct PageFetcher<N: Network> {
    network: Arc<N>,
    worker: Option<Arc<OfflineWorker<N>>>,
}

impl<N: Network> PageFetcher<N> {
    pub fn new(network: Arc<N>) -> Self {
        Self {
            network,
            worker: None,
        }
    }

    /// 挂上离线 worker
    pub fn with_worker(mut self, worker: Arc<OfflineWorker<N>>) -> Self {
        self.worker = Some(worker);
        self
    }

    /// 页面当前是否由 worker 控制
    pub fn is_controlled(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.controls_clients())
    }

    pub async fn fetch(&self, url: &Url) -> Result<NetResponse, NetworkError> {
        if let Some(worker) = self.worker.as_ref().filter(|w| w.controls_clients()) {
            if let FetchEvent::Responded(res) = worker.handle_fetch(url).await? {
                return Ok(res);
            }
        }
        self.network.fetch(url).await
    }
}

/// 清单与章节加载客户端
///
/// 所有请求都经过 `PageFetcher`，因此数据文件会被离线 worker 透明拦截。
/// 不重试，失败直接以 `LoadError` 交给界面的状态栏。
use crate::clients::page_fetcher::PageFetcher;
use crate::error::LoadError;
use crate::infrastructure::Network;
use crate::models::{ChapterDocument, ChapterRef, Manifest, WebAppManifest};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// 可安装应用描述文件路径
const DESCRIPTOR_PATH: &str = "manifest.webmanifest";

pub struct ContentClient<N: Network> {
    base: Url,
    manifest_path: String,
    fetcher: PageFetcher<N>,
}

impl<N: Network> ContentClient<N> {
    pub fn new(base: Url, manifest_path: impl Into<String>, fetcher: PageFetcher<N>) -> Self {
        Self {
            base,
            manifest_path: manifest_path.into(),
            fetcher,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn fetcher(&self) -> &PageFetcher<N> {
        &self.fetcher
    }

    /// 相对站点根解析路径
    pub fn resolve(&self, path: &str) -> Result<Url, LoadError> {
        self.base.join(path).map_err(|_| LoadError::InvalidUrl {
            path: path.to_string(),
        })
    }

    /// 获取并解析 JSON 文档
    ///
    /// # 参数
    /// - `path`: 相对站点根的路径
    ///
    /// # 返回
    /// 非 2xx 响应返回带状态码的 `LoadError::Status`
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LoadError> {
        let url = self.resolve(path)?;
        debug!("获取 JSON: {}", url);

        let response = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|source| LoadError::Network {
                url: path.to_string(),
                source,
            })?;

        if !response.is_ok() {
            return Err(LoadError::Status {
                url: path.to_string(),
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|source| LoadError::Parse {
            url: path.to_string(),
            source,
        })
    }

    /// 加载科目清单
    pub async fn load_manifest(&self) -> Result<Manifest, LoadError> {
        let manifest: Manifest = self.fetch_json(&self.manifest_path).await?;
        info!("✓ 清单加载完成，共 {} 个科目", manifest.subjects.len());
        Ok(manifest)
    }

    /// 加载单个章节
    pub async fn load_chapter(&self, chapter: &ChapterRef) -> Result<ChapterDocument, LoadError> {
        let document: ChapterDocument = self.fetch_json(&chapter.json).await?;
        info!(
            "✓ 章节 {} 加载完成，共 {} 个知识点",
            chapter.title,
            document.topics.len()
        );
        Ok(document)
    }

    /// 加载可安装应用描述
    pub async fn load_descriptor(&self) -> Result<WebAppManifest, LoadError> {
        self.fetch_json(DESCRIPTOR_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::CacheStorage;
    use crate::services::offline_worker::tests::MockNetwork;
    use crate::services::{DataPathPolicy, OfflineWorker};
    use std::sync::Arc;

    const BASE: &str = "http://localhost/ripasso/";

    fn network() -> Arc<MockNetwork> {
        Arc::new(MockNetwork::with_pages(&[
            (
                "http://localhost/ripasso/data/manifest.json",
                r#"{"subjects":[{"name":"Storia","chapters":[{"id":"c1","title":"Roma","json":"data/c1.json"}]}]}"#,
            ),
            (
                "http://localhost/ripasso/data/c1.json",
                r#"{"chapterTitle":"Roma","topics":[{"title":"Impero"}]}"#,
            ),
            ("http://localhost/ripasso/data/broken.json", "{"),
            (
                "http://localhost/ripasso/manifest.webmanifest",
                r#"{"name":"Ripasso"}"#,
            ),
        ]))
    }

    fn client(network: Arc<MockNetwork>) -> ContentClient<MockNetwork> {
        ContentClient::new(Url::parse(BASE).unwrap(), "data/manifest.json", PageFetcher::new(network))
    }

    #[tokio::test]
    async fn test_load_manifest_and_chapter() {
        let client = client(network());

        let manifest = client.load_manifest().await.unwrap();
        let chapter_ref = manifest.chapter(0, 0).unwrap().clone();
        let chapter = client.load_chapter(&chapter_ref).await.unwrap();

        assert_eq!(chapter.chapter_title.as_deref(), Some("Roma"));
        assert_eq!(chapter.topics.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_document_carries_status() {
        let client = client(network());
        let missing = ChapterRef {
            id: "c9".to_string(),
            title: "Cartagine".to_string(),
            json: "data/c9.json".to_string(),
        };

        let err = client.load_chapter(&missing).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Impossibile caricare data/c9.json (404)");
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let client = client(network());
        let err = client.fetch_json::<Manifest>("data/broken.json").await.unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_offline_without_worker_is_network_error() {
        let network = network();
        network.set_offline(true);
        let err = client(network).load_manifest().await.unwrap_err();
        assert!(matches!(err, LoadError::Network { .. }));
    }

    #[tokio::test]
    async fn test_controlled_page_reads_through_cache() {
        let network = network();
        let storage = Arc::new(CacheStorage::in_memory());
        let base = Url::parse(BASE).unwrap();
        let worker = OfflineWorker::new(
            "ripasso-v1",
            "js/sw.js",
            DataPathPolicy::new(base.clone(), "/data/"),
            vec![base.join("data/manifest.json").unwrap()],
            storage,
            network.clone(),
        )
        .register()
        .await
        .unwrap();

        let fetcher = PageFetcher::new(network.clone()).with_worker(Arc::new(worker));
        assert!(fetcher.is_controlled());
        let client = ContentClient::new(base, "data/manifest.json", fetcher);

        // 首次访问章节写入缓存，之后离线仍可加载
        client.fetch_json::<ChapterDocument>("data/c1.json").await.unwrap();
        network.set_offline(true);

        assert_eq!(client.load_manifest().await.unwrap().subjects.len(), 1);
        assert!(client.fetch_json::<ChapterDocument>("data/c1.json").await.is_ok());

        // 非数据资源不经过缓存
        let err = client.load_descriptor().await.unwrap_err();
        assert!(matches!(err, LoadError::Network { .. }));
    }
}

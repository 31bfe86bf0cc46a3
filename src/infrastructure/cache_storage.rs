//! 缓存存储 - 基础设施层
//!
//! 按名字组织的键值缓存：请求地址 → 响应。整个存储保存在缓存目录下的
//! 一个 JSON 文件中，每次修改后整体重写。页面与离线 worker 通过 `Arc`
//! 共享同一个实例。

use crate::error::CacheError;
use crate::infrastructure::network::NetResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

const STORAGE_FILE: &str = "cache_storage.json";

/// 缓存中的一条记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub response: NetResponse,
    /// RFC 3339 写入时间
    pub stored_at: String,
}

/// 离线 worker 的注册记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub script: String,
    pub scope: String,
    /// 已激活的缓存版本
    pub active_version: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    #[serde(default)]
    caches: BTreeMap<String, BTreeMap<String, CacheEntry>>,
    #[serde(default)]
    registration: Option<RegistrationRecord>,
}

/// 命名缓存的集合
pub struct CacheStorage {
    path: Option<PathBuf>,
    inner: Mutex<StorageFile>,
}

impl CacheStorage {
    /// 打开（或创建）缓存目录下的存储
    pub async fn open(dir: &Path) -> Result<Self, CacheError> {
        let io_err = |source| CacheError::Io {
            path: dir.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;

        let path = dir.join(STORAGE_FILE);
        let file = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|source| CacheError::Format {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StorageFile::default(),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        debug!("打开缓存存储: {} ({} 个缓存)", path.display(), file.caches.len());

        Ok(Self {
            path: Some(path),
            inner: Mutex::new(file),
        })
    }

    /// 不落盘的存储
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Mutex::new(StorageFile::default()),
        }
    }

    /// 所有缓存名
    pub async fn keys(&self) -> Vec<String> {
        self.inner.lock().await.caches.keys().cloned().collect()
    }

    pub async fn has(&self, name: &str) -> bool {
        self.inner.lock().await.caches.contains_key(name)
    }

    /// 打开命名缓存，不存在时创建
    pub async fn open_cache(&self, name: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.lock().await;
        if inner.caches.contains_key(name) {
            return Ok(());
        }
        inner.caches.insert(name.to_string(), BTreeMap::new());
        self.persist(&inner).await
    }

    /// 删除命名缓存，返回是否存在过
    pub async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut inner = self.inner.lock().await;
        let existed = inner.caches.remove(name).is_some();
        if existed {
            self.persist(&inner).await?;
        }
        Ok(existed)
    }

    /// 在所有缓存中按地址查找
    pub async fn match_url(&self, url: &str) -> Option<NetResponse> {
        let inner = self.inner.lock().await;
        inner
            .caches
            .values()
            .find_map(|cache| cache.get(url))
            .map(|entry| entry.response.clone())
    }

    /// 在指定缓存中按地址查找
    pub async fn match_in(&self, name: &str, url: &str) -> Option<CacheEntry> {
        let inner = self.inner.lock().await;
        inner.caches.get(name).and_then(|cache| cache.get(url)).cloned()
    }

    /// 指定缓存中的全部地址
    pub async fn urls(&self, name: &str) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner
            .caches
            .get(name)
            .map(|cache| cache.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// 写入一条响应，以响应地址为键
    pub async fn put(&self, name: &str, response: NetResponse) -> Result<(), CacheError> {
        self.put_all(name, vec![response]).await
    }

    /// 一次写入多条响应，只落盘一次
    pub async fn put_all(&self, name: &str, responses: Vec<NetResponse>) -> Result<(), CacheError> {
        let stored_at = chrono::Utc::now().to_rfc3339();
        let mut inner = self.inner.lock().await;
        let cache = inner.caches.entry(name.to_string()).or_default();
        for response in responses {
            cache.insert(
                response.url.clone(),
                CacheEntry {
                    response,
                    stored_at: stored_at.clone(),
                },
            );
        }
        self.persist(&inner).await
    }

    pub async fn registration(&self) -> Option<RegistrationRecord> {
        self.inner.lock().await.registration.clone()
    }

    pub async fn set_registration(&self, record: RegistrationRecord) -> Result<(), CacheError> {
        let mut inner = self.inner.lock().await;
        inner.registration = Some(record);
        self.persist(&inner).await
    }

    async fn persist(&self, file: &StorageFile) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string(file).map_err(|source| CacheError::Format {
            path: path.display().to_string(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        let io_err = |source| CacheError::Io {
            path: path.display().to_string(),
            source,
        };
        tokio::fs::write(&tmp, content).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(url: &str, body: &str) -> NetResponse {
        NetResponse {
            url: url.to_string(),
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let storage = CacheStorage::in_memory();
        storage
            .put("ripasso-v1", response("http://x/data/a.json", "{}"))
            .await
            .unwrap();

        assert!(storage.has("ripasso-v1").await);
        assert_eq!(
            storage.match_url("http://x/data/a.json").await.unwrap().body,
            "{}"
        );
        assert!(storage.match_url("http://x/data/b.json").await.is_none());
        assert!(storage.match_in("ripasso-v1", "http://x/data/a.json").await.is_some());
    }

    #[tokio::test]
    async fn test_delete_cache() {
        let storage = CacheStorage::in_memory();
        storage.open_cache("old").await.unwrap();
        storage.open_cache("new").await.unwrap();

        assert!(storage.delete("old").await.unwrap());
        assert!(!storage.delete("old").await.unwrap());
        assert_eq!(storage.keys().await, vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = CacheStorage::open(dir.path()).await.unwrap();
            storage
                .put("ripasso-v1", response("file:///site/data/manifest.json", "{\"subjects\":[]}"))
                .await
                .unwrap();
            storage
                .set_registration(RegistrationRecord {
                    script: "js/sw.js".to_string(),
                    scope: "file:///site/".to_string(),
                    active_version: Some("ripasso-v1".to_string()),
                })
                .await
                .unwrap();
        }

        let reopened = CacheStorage::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.urls("ripasso-v1").await,
            vec!["file:///site/data/manifest.json".to_string()]
        );
        assert_eq!(
            reopened.registration().await.unwrap().active_version.as_deref(),
            Some("ripasso-v1")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORAGE_FILE), "not json").unwrap();

        let result = CacheStorage::open(dir.path()).await;
        assert!(matches!(result, Err(CacheError::Format { .. })));
    }
}

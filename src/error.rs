use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据加载错误
    #[error("加载错误: {0}")]
    Load(#[from] LoadError),
    /// 缓存存储错误
    #[error("缓存错误: {0}")]
    Cache(#[from] CacheError),
    /// 离线 worker 错误
    #[error("离线 worker 错误: {0}")]
    Worker(#[from] WorkerError),
    /// 偏好设置读写错误
    #[error("偏好设置错误: {0}")]
    Preferences(#[source] std::io::Error),
}

/// 清单/章节加载错误
///
/// `Display` 文本直接显示在状态栏上。
#[derive(Debug, Error)]
pub enum LoadError {
    /// 服务器返回非成功状态码
    #[error("Impossibile caricare {url} ({status})")]
    Status { url: String, status: u16 },
    /// 网络不可达，且缓存中没有副本
    #[error("Impossibile caricare {url} (rete non disponibile)")]
    Network {
        url: String,
        #[source]
        source: NetworkError,
    },
    /// JSON 解析失败
    #[error("Impossibile leggere {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// 无法基于站点地址解析的路径
    #[error("Percorso non valido: {path}")]
    InvalidUrl { path: String },
}

impl LoadError {
    /// 返回 HTTP 状态码（仅非成功响应时有值）
    pub fn status(&self) -> Option<u16> {
        match self {
            LoadError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 网络层错误
#[derive(Debug, Error)]
pub enum NetworkError {
    /// 请求没有得到任何响应
    #[error("网络不可达 ({url}): {reason}")]
    Unreachable { url: String, reason: String },
    /// 网络实现不支持该地址协议
    #[error("不支持的地址协议: {url}")]
    UnsupportedScheme { url: String },
    /// 离线 worker 拦截了请求，但既无缓存也无网络
    #[error("离线且无缓存: {url}")]
    OfflineMiss { url: String },
}

/// 缓存存储错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("读写缓存文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("缓存文件格式错误 ({path}): {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 离线 worker 生命周期错误
#[derive(Debug, Error)]
pub enum WorkerError {
    /// 预缓存壳资源失败，worker 不会被激活
    #[error("安装失败，资源 {asset} 无法获取: {reason}")]
    InstallFailed { asset: String, reason: String },
    /// 在错误的生命周期阶段调用
    #[error("worker 状态 {state} 下不能执行 {operation}")]
    InvalidState {
        state: &'static str,
        operation: &'static str,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

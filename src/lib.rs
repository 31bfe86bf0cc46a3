//! # Ripasso
//!
//! 离线可用的复习终端：按"科目 → 章节 → 知识点"浏览题库，
//! 在终端里作答选择题、判断题和简答题。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `Network` - 站点抓取（HTTP 或本地目录）
//! - `CacheStorage` - 按名字分组的持久化响应缓存
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `OfflineWorker` - 缓存优先的离线 worker（安装 / 激活 / 拦截）
//! - `checker` - 判题
//! - `search` - 知识点过滤
//! - `PreferenceStore` - 主题偏好
//!
//! ### ③ 客户端层（Clients）
//! - `ContentClient` - 读取清单与章节 JSON
//! - `PageFetcher` - 页面请求入口，受控时交给 worker
//!
//! ### ④ 流程层（Workflow）
//! - `ViewState` - 不可变的视图状态与 reducer
//! - `Widgets` - 每道题的交互状态
//! - `Frame` - 纯文本渲染
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/app` - 初始化与命令循环
//! - `orchestrator/command` - 命令解析
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ChapterDocument, Manifest, Question, QuestionKind};
pub use orchestrator::App;
pub use workflow::{Action, ViewState};

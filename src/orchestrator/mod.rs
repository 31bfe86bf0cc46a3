//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责装配各层资源并驱动交互循环，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主结构
//! - 管理应用生命周期（初始化、运行）
//! - 注册离线 worker，失败时退回直连网络
//! - 持有 `ViewState` 与题目控件，把命令翻译成动作
//! - 章节加载完成后把结果回灌给状态机
//!
//! ### `command` - 终端命令解析
//! - 关键字与别名的静态表
//! - 题目地址 `t.d` 的解析
//!
//! ## 层次关系
//!
//! ```text
//! app (命令循环)
//!     ↓
//! workflow (ViewState / Widgets / Frame)
//!     ↓
//! clients (ContentClient / PageFetcher)
//!     ↓
//! services (offline_worker / checker / preferences)
//!     ↓
//! infrastructure (Network / CacheStorage)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有网络与缓存存储的 `Arc`
//! 2. **向下依赖**：编排层 → workflow → clients → services → infrastructure
//! 3. **无业务逻辑**：判题、过滤、缓存策略都在下层

pub mod app;
pub mod command;

// 重新导出主要类型
pub use app::{App, Flow};
pub use command::{parse_command, Command, CommandError};

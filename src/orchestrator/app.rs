//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **初始化**：解析站点、打开缓存存储、注册离线 worker、读取偏好和清单
//! 2. **命令分派**：把终端命令翻译成 `ViewState` 动作或题目控件输入
//! 3. **章节加载**：按待加载标记取回章节，结果回灌给状态机
//! 4. **输出**：每条命令之后重新渲染整帧画面

use crate::clients::{ContentClient, PageFetcher};
use crate::config::Config;
use crate::infrastructure::{resolve_site, CacheStorage, SiteNetwork};
use crate::models::{Manifest, WebAppManifest};
use crate::orchestrator::command::{parse_command, Command, HELP};
use crate::services::{DataPathPolicy, InstallOutcome, InstallPrompt, OfflineWorker, PreferenceStore};
use crate::utils::logging::{log_startup, truncate_text};
use crate::workflow::{Action, Chrome, Frame, QuestionAddress, ViewState, WidgetInput, Widgets};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// 命令执行后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 应用主结构
pub struct App {
    client: ContentClient<SiteNetwork>,
    preferences: PreferenceStore,
    install_prompt: InstallPrompt,
    descriptor: WebAppManifest,
    state: ViewState,
    widgets: Widgets,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let base = resolve_site(&config.site)?;
        let network = Arc::new(SiteNetwork::for_site(
            &base,
            Duration::from_secs(config.request_timeout_secs),
        )?);
        let storage = Arc::new(
            CacheStorage::open(Path::new(&config.cache_dir))
                .await
                .context("无法打开缓存目录")?,
        );

        let shell_assets = config
            .shell_assets
            .iter()
            .map(|asset| base.join(asset))
            .collect::<Result<Vec<_>, _>>()
            .context("无效的壳资源路径")?;

        let worker = OfflineWorker::new(
            config.cache_version.clone(),
            config.worker_script.clone(),
            DataPathPolicy::new(base.clone(), config.data_segment.clone()),
            shell_assets,
            storage,
            network.clone(),
        );

        let mut install_prompt = InstallPrompt::default();
        let mut fetcher = PageFetcher::new(network);
        match worker.register().await {
            Ok(worker) => {
                fetcher = fetcher.with_worker(Arc::new(worker));
                install_prompt.offer();
            }
            Err(e) => warn!("⚠️ 离线缓存不可用，直接访问网络: {}", e),
        }

        let client = ContentClient::new(base, config.manifest_path.clone(), fetcher);
        let preferences = PreferenceStore::open(&config.prefs_file).await;
        let descriptor = client.load_descriptor().await.unwrap_or_else(|e| {
            debug!("无法读取应用描述，使用默认值: {}", e);
            WebAppManifest::default()
        });

        let state = match client.load_manifest().await {
            Ok(manifest) => ViewState::new(Arc::new(manifest)).reduce(Action::SetStatus("Pronto ✅".to_string())),
            Err(e) => {
                warn!("❌ 清单加载失败: {}", e);
                ViewState::new(Arc::new(Manifest::default())).reduce(Action::SetStatus(e.to_string()))
            }
        };

        Ok(Self {
            client,
            preferences,
            install_prompt,
            descriptor,
            state,
            widgets: Widgets::default(),
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    pub fn install_prompt(&self) -> &InstallPrompt {
        &self.install_prompt
    }

    pub fn is_offline_ready(&self) -> bool {
        self.client.fetcher().is_controlled()
    }

    /// 渲染当前画面
    pub fn render(&self) -> String {
        let chrome = Chrome {
            app_name: self.descriptor.display_name().to_string(),
            theme: self.preferences.theme(),
            install_available: self.install_prompt.is_available(),
            offline_ready: self.is_offline_ready(),
        };
        Frame {
            state: &self.state,
            widgets: &self.widgets,
            chrome: &chrome,
        }
        .to_string()
    }

    /// 运行交互循环，直到 `esci` 或输入结束
    pub async fn run(mut self) -> Result<()> {
        println!("{}", self.render());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            debug!("命令: {}", truncate_text(&line, 60));

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    self.apply(Action::SetStatus(e.to_string()));
                    println!("{}", self.render());
                    continue;
                }
            };

            if command == Command::Help {
                println!("{}", HELP);
                continue;
            }

            if self.dispatch(command).await == Flow::Quit {
                break;
            }
            println!("{}", self.render());
        }

        info!("👋 再见");
        Ok(())
    }

    /// 执行一条命令
    pub async fn dispatch(&mut self, command: Command) -> Flow {
        match command {
            Command::Subjects => self.apply(Action::ShowSubjects),
            Command::Chapters => self.apply(Action::ShowChapters),
            Command::Study => self.apply(Action::ShowStudy),
            Command::Select(index) => self.select(index).await,
            Command::Search(text) => self.apply(Action::Search(text)),
            Command::Expand(None) => self.apply(Action::ExpandAll),
            Command::Expand(Some(topic)) => self.apply(Action::ToggleTopic(topic)),
            Command::Collapse => self.apply(Action::CollapseAll),
            Command::Choose(address, option) => self.widget(address, WidgetInput::Select(option)),
            Command::Verify(address) => self.widget(address, WidgetInput::Verify),
            Command::Assert(address, value) => self.widget(address, WidgetInput::Assert(value)),
            Command::Reveal(address) => self.widget(address, WidgetInput::Reveal),
            Command::Theme => self.toggle_theme().await,
            Command::Install(choice) => {
                let status = match self.install_prompt.prompt(choice) {
                    Some(InstallOutcome::Accepted) => "Installazione avviata ✅",
                    Some(InstallOutcome::Dismissed) => "Installazione rifiutata.",
                    None => "Installazione non disponibile.",
                };
                self.apply(Action::SetStatus(status.to_string()));
            }
            Command::Help => {}
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn apply(&mut self, action: Action) {
        self.state = self.state.clone().reduce(action);
        self.widgets.sync(self.state.render_epoch());
    }

    /// 数字选择：科目页选科目，章节页打开章节
    async fn select(&mut self, index: usize) {
        use crate::workflow::Screen;

        match self.state.screen() {
            Screen::Subjects => self.apply(Action::SelectSubject(index)),
            Screen::Chapters => self.open_chapter(index).await,
            Screen::Study => self.apply(Action::ToggleTopic(index)),
        }
    }

    async fn open_chapter(&mut self, index: usize) {
        self.apply(Action::RequestChapter(index));

        let Some(key) = self.state.pending() else {
            return;
        };
        let Some(chapter_ref) = self.state.manifest().chapter(key.subject, key.chapter).cloned() else {
            return;
        };

        info!("📖 {}", self.state.status());
        let action = match self.client.load_chapter(&chapter_ref).await {
            Ok(document) => Action::ChapterLoaded {
                key,
                document: Arc::new(document),
            },
            Err(e) => {
                warn!("❌ 章节加载失败: {}", e);
                Action::ChapterFailed {
                    key,
                    message: e.to_string(),
                }
            }
        };
        self.apply(action);
    }

    fn widget(&mut self, address: QuestionAddress, input: WidgetInput) {
        if let Err(e) = self.widgets.apply(&self.state, address, input) {
            self.apply(Action::SetStatus(e.to_string()));
        }
    }

    async fn toggle_theme(&mut self) {
        match self.preferences.toggle_theme().await {
            Ok(theme) => self.apply(Action::SetStatus(format!("Tema: {}", theme))),
            Err(e) => {
                warn!("保存主题失败: {}", e);
                self.apply(Action::SetStatus("Impossibile salvare il tema.".to_string()));
            }
        }
    }
}

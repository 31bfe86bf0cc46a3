//! 视图状态 - 流程层
//!
//! 整个会话状态是一个不可变的 `ViewState` 值，界面操作通过 `reduce`
//! 产生新值。状态机：
//!
//! ```text
//! Subjects ──选择科目──▶ Chapters ──选择章节(异步加载)──▶ Study
//!     ▲                     ▲                             │
//!     └──────── 导航按钮 ───┴─────────────────────────────┘
//! ```
//!
//! 章节加载以请求时的章节为标记，过期的加载结果会被丢弃。

use crate::models::{ChapterDocument, ChapterRef, Manifest, Question, SubjectRef, Topic};
use crate::services::search::filter_topics;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// 当前画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Subjects,
    Chapters,
    Study,
}

/// 清单中某一章节的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterKey {
    pub subject: usize,
    pub chapter: usize,
}

/// 已加载的章节
#[derive(Debug, Clone)]
pub struct OpenChapter {
    pub key: ChapterKey,
    pub document: Arc<ChapterDocument>,
}

/// 导航按钮可用性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub chapters_enabled: bool,
    pub study_enabled: bool,
}

/// 界面动作
#[derive(Debug, Clone)]
pub enum Action {
    ShowSubjects,
    SelectSubject(usize),
    ShowChapters,
    RequestChapter(usize),
    ChapterLoaded {
        key: ChapterKey,
        document: Arc<ChapterDocument>,
    },
    ChapterFailed {
        key: ChapterKey,
        message: String,
    },
    ShowStudy,
    Search(String),
    ExpandAll,
    CollapseAll,
    /// 按可见下标展开/收起知识点
    ToggleTopic(usize),
    SetStatus(String),
}

#[derive(Debug, Clone)]
pub struct ViewState {
    manifest: Arc<Manifest>,
    screen: Screen,
    subject: Option<usize>,
    pending: Option<ChapterKey>,
    current: Option<OpenChapter>,
    search: String,
    /// 展开的知识点（章节内原始下标）
    expanded: BTreeSet<usize>,
    status: String,
    /// 每次重新渲染学习页加一，用于丢弃题目控件状态
    render_epoch: u64,
}

impl ViewState {
    pub fn new(manifest: Arc<Manifest>) -> Self {
        Self {
            manifest,
            screen: Screen::Subjects,
            subject: None,
            pending: None,
            current: None,
            search: String::new(),
            expanded: BTreeSet::new(),
            status: String::new(),
            render_epoch: 0,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn render_epoch(&self) -> u64 {
        self.render_epoch
    }

    pub fn pending(&self) -> Option<ChapterKey> {
        self.pending
    }

    pub fn selected_subject(&self) -> Option<&SubjectRef> {
        self.subject.and_then(|i| self.manifest.subject(i))
    }

    /// 已加载章节在清单中的引用；只有章节加载完成后才有值
    pub fn selected_chapter(&self) -> Option<&ChapterRef> {
        self.current
            .as_ref()
            .and_then(|open| self.manifest.chapter(open.key.subject, open.key.chapter))
    }

    pub fn current_chapter(&self) -> Option<&ChapterDocument> {
        self.current.as_ref().map(|open| open.document.as_ref())
    }

    pub fn nav(&self) -> NavState {
        NavState {
            chapters_enabled: self.subject.is_some(),
            study_enabled: self.current.is_some(),
        }
    }

    /// 按当前搜索词过滤后的知识点，附带原始下标
    pub fn visible_topics(&self) -> Vec<(usize, &Topic)> {
        match self.current_chapter() {
            Some(chapter) => filter_topics(chapter, &self.search),
            None => Vec::new(),
        }
    }

    pub fn is_expanded(&self, topic_index: usize) -> bool {
        self.expanded.contains(&topic_index)
    }

    /// 按可见下标查找题目
    pub fn question(&self, topic: usize, question: usize) -> Option<&Question> {
        self.visible_topics()
            .get(topic)
            .and_then(|&(_, t)| t.questions.get(question))
    }

    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::ShowSubjects => Self {
                screen: Screen::Subjects,
                subject: None,
                pending: None,
                current: None,
                search: String::new(),
                expanded: BTreeSet::new(),
                render_epoch: self.render_epoch + 1,
                ..self
            },

            Action::SelectSubject(index) => {
                if self.manifest.subject(index).is_none() {
                    debug!("忽略不存在的科目: {}", index);
                    return self;
                }
                self.enter_chapters(index)
            }

            Action::ShowChapters => match self.subject {
                Some(index) => self.enter_chapters(index),
                None => self,
            },

            Action::RequestChapter(index) => {
                let Some(subject_index) = self.subject else {
                    return self;
                };
                if self.screen != Screen::Chapters {
                    return self;
                }
                let Some(chapter) = self.manifest.chapter(subject_index, index) else {
                    debug!("忽略不存在的章节: {}", index);
                    return self;
                };

                let subject_name = self.manifest.subjects[subject_index].name.clone();
                let status = format!("Apro: {} — {}…", subject_name, chapter.title);
                Self {
                    pending: Some(ChapterKey {
                        subject: subject_index,
                        chapter: index,
                    }),
                    status,
                    ..self
                }
            }

            Action::ChapterLoaded { key, document } => {
                if self.pending != Some(key) {
                    debug!("丢弃过期的章节加载结果: {:?}", key);
                    return self;
                }
                Self {
                    screen: Screen::Study,
                    pending: None,
                    current: Some(OpenChapter { key, document }),
                    expanded: BTreeSet::new(),
                    status: "Capitolo caricato ✅".to_string(),
                    render_epoch: self.render_epoch + 1,
                    ..self
                }
            }

            Action::ChapterFailed { key, message } => {
                if self.pending != Some(key) {
                    return self;
                }
                Self {
                    pending: None,
                    status: message,
                    ..self
                }
            }

            Action::ShowStudy => {
                if self.current.is_none() {
                    return self;
                }
                self.rerender_study()
            }

            Action::Search(text) => {
                let state = Self {
                    search: text,
                    ..self
                };
                if state.current.is_some() {
                    state.rerender_study()
                } else {
                    state
                }
            }

            Action::ExpandAll => {
                let expanded = self.visible_topics().into_iter().map(|(i, _)| i).collect();
                Self { expanded, ..self }
            }

            Action::CollapseAll => Self {
                expanded: BTreeSet::new(),
                ..self
            },

            Action::ToggleTopic(visible) => {
                let Some(index) = self.visible_topics().get(visible).map(|&(i, _)| i) else {
                    return self;
                };
                let mut expanded = self.expanded.clone();
                if !expanded.remove(&index) {
                    expanded.insert(index);
                }
                Self { expanded, ..self }
            }

            Action::SetStatus(status) => Self { status, ..self },
        }
    }

    fn enter_chapters(self, subject: usize) -> Self {
        Self {
            screen: Screen::Chapters,
            subject: Some(subject),
            pending: None,
            current: None,
            search: String::new(),
            expanded: BTreeSet::new(),
            render_epoch: self.render_epoch + 1,
            ..self
        }
    }

    fn rerender_study(self) -> Self {
        Self {
            screen: Screen::Study,
            expanded: BTreeSet::new(),
            render_epoch: self.render_epoch + 1,
            ..self
        }
    }
}

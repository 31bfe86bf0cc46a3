//! 题目控件状态
//!
//! 记录学习页上每道题的已选选项和最近一次反馈。控件状态只属于一次渲染：
//! `ViewState` 的渲染代数变化时全部丢弃。

use crate::models::QuestionKind;
use crate::services::checker::{self, Attempt, Feedback};
use crate::workflow::view_state::ViewState;
use std::collections::HashMap;
use std::fmt;

/// 学习页上的题目位置（可见知识点下标, 题目下标），均从 0 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuestionAddress {
    pub topic: usize,
    pub question: usize,
}

impl fmt::Display for QuestionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.topic + 1, self.question + 1)
    }
}

/// 控件上的用户输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetInput {
    /// 单选题选中某个选项
    Select(usize),
    /// 单选题"Verifica"
    Verify,
    /// 判断题"Vero"/"Falso"
    Assert(bool),
    /// 简答题"Mostra risposta"
    Reveal,
}

/// 控件操作失败的原因，显示在状态栏
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    NoSuchQuestion(QuestionAddress),
    NoSuchOption { address: QuestionAddress, option: usize },
    WrongWidget(QuestionAddress),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::NoSuchQuestion(address) => write!(f, "Domanda {} non trovata.", address),
            WidgetError::NoSuchOption { address, option } => {
                write!(f, "La domanda {} non ha l'opzione {}.", address, option + 1)
            }
            WidgetError::WrongWidget(address) => {
                write!(f, "Azione non disponibile per la domanda {}.", address)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    pub selected: Option<usize>,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Default)]
pub struct Widgets {
    epoch: u64,
    states: HashMap<QuestionAddress, WidgetState>,
}

impl Widgets {
    /// 渲染代数变化时清空所有控件
    pub fn sync(&mut self, epoch: u64) {
        if self.epoch != epoch {
            self.states.clear();
            self.epoch = epoch;
        }
    }

    pub fn get(&self, address: QuestionAddress) -> Option<&WidgetState> {
        self.states.get(&address)
    }

    /// 处理一次控件输入，返回新的反馈（选中选项不产生反馈）
    pub fn apply(
        &mut self,
        state: &ViewState,
        address: QuestionAddress,
        input: WidgetInput,
    ) -> Result<Option<Feedback>, WidgetError> {
        self.sync(state.render_epoch());

        let question = state
            .question(address.topic, address.question)
            .ok_or(WidgetError::NoSuchQuestion(address))?;

        let attempt = match input {
            WidgetInput::Select(option) => {
                let QuestionKind::Mcq { options, .. } = &question.kind else {
                    return Err(WidgetError::WrongWidget(address));
                };
                if option >= options.len() {
                    return Err(WidgetError::NoSuchOption { address, option });
                }
                self.states.entry(address).or_default().selected = Some(option);
                return Ok(None);
            }
            WidgetInput::Verify => {
                Attempt::Choose(self.get(address).and_then(|w| w.selected))
            }
            WidgetInput::Assert(value) => Attempt::Assert(value),
            WidgetInput::Reveal => Attempt::Reveal,
        };

        let feedback =
            checker::check(question, attempt).ok_or(WidgetError::WrongWidget(address))?;
        self.states.entry(address).or_default().feedback = Some(feedback.clone());
        Ok(Some(feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChapterDocument, Manifest};
    use crate::workflow::view_state::{Action, ChapterKey};
    use std::sync::Arc;

    fn studying() -> ViewState {
        let manifest: Manifest = serde_json::from_str(
            r#"{"subjects":[{"name":"Storia","chapters":[{"id":"c1","title":"Roma","json":"data/c1.json"}]}]}"#,
        )
        .unwrap();
        let chapter: ChapterDocument = serde_json::from_str(
            r#"{"chapterTitle":"Roma","topics":[{"title":"Impero","questions":[
                {"type":"mcq","prompt":"Anno?","options":["100","27 a.C."],"correctIndex":1},
                {"type":"tf","prompt":"Augusto fu imperatore?","correct":true},
                {"type":"short","prompt":"Chi?","answer":"Augusto"}
            ]}]}"#,
        )
        .unwrap();

        ViewState::new(Arc::new(manifest))
            .reduce(Action::SelectSubject(0))
            .reduce(Action::RequestChapter(0))
            .reduce(Action::ChapterLoaded {
                key: ChapterKey {
                    subject: 0,
                    chapter: 0,
                },
                document: Arc::new(chapter),
            })
    }

    const MCQ: QuestionAddress = QuestionAddress {
        topic: 0,
        question: 0,
    };

    #[test]
    fn test_verify_without_selection() {
        let state = studying();
        let mut widgets = Widgets::default();

        let feedback = widgets.apply(&state, MCQ, WidgetInput::Verify).unwrap();
        assert_eq!(feedback, Some(Feedback::NoSelection));
    }

    #[test]
    fn test_select_then_verify() {
        let state = studying();
        let mut widgets = Widgets::default();

        assert_eq!(widgets.apply(&state, MCQ, WidgetInput::Select(0)).unwrap(), None);
        let wrong = widgets.apply(&state, MCQ, WidgetInput::Verify).unwrap().unwrap();
        assert_eq!(wrong.to_string(), "Sbagliato ❌ (Corretta: 27 a.C.)");

        widgets.apply(&state, MCQ, WidgetInput::Select(1)).unwrap();
        let right = widgets.apply(&state, MCQ, WidgetInput::Verify).unwrap().unwrap();
        assert!(right.is_correct());
        assert_eq!(widgets.get(MCQ).unwrap().selected, Some(1));
    }

    #[test]
    fn test_rerender_drops_widget_state() {
        let state = studying();
        let mut widgets = Widgets::default();
        widgets.apply(&state, MCQ, WidgetInput::Select(1)).unwrap();

        let state = state.reduce(Action::ShowStudy);
        let feedback = widgets.apply(&state, MCQ, WidgetInput::Verify).unwrap();
        assert_eq!(feedback, Some(Feedback::NoSelection));
    }

    #[test]
    fn test_tf_and_short_widgets() {
        let state = studying();
        let mut widgets = Widgets::default();
        let tf = QuestionAddress { topic: 0, question: 1 };
        let short = QuestionAddress { topic: 0, question: 2 };

        assert!(widgets
            .apply(&state, tf, WidgetInput::Assert(true))
            .unwrap()
            .unwrap()
            .is_correct());
        let first = widgets.apply(&state, short, WidgetInput::Reveal).unwrap();
        let second = widgets.apply(&state, short, WidgetInput::Reveal).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_inputs() {
        let state = studying();
        let mut widgets = Widgets::default();

        let missing = QuestionAddress { topic: 3, question: 0 };
        assert_eq!(
            widgets.apply(&state, missing, WidgetInput::Reveal),
            Err(WidgetError::NoSuchQuestion(missing))
        );
        assert_eq!(
            widgets.apply(&state, MCQ, WidgetInput::Select(5)),
            Err(WidgetError::NoSuchOption { address: MCQ, option: 5 })
        );
        assert_eq!(
            widgets.apply(&state, MCQ, WidgetInput::Assert(false)),
            Err(WidgetError::WrongWidget(MCQ))
        );
        assert_eq!(MCQ.to_string(), "1.1");
    }
}

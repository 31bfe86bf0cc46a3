//! 题目自测 - 业务能力层
//!
//! 无状态：结果只取决于当前作答和题目的答案键，每次检查都重新计算。

use crate::models::{Question, QuestionKind};
use std::fmt;

/// 用户的一次作答
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// 单选题"验证"，可能尚未选择选项
    Choose(Option<usize>),
    /// 判断题的"对/错"
    Assert(bool),
    /// 简答题"显示答案"
    Reveal,
}

/// 检查反馈
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// 单选题未选择任何选项
    NoSelection,
    Correct {
        explanation: Option<String>,
    },
    Incorrect {
        /// 单选题的正确选项文本；判断题为空
        correct_option: Option<String>,
        explanation: Option<String>,
    },
    /// 简答题的参考答案
    Answer {
        text: String,
    },
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct { .. })
    }
}

const MISSING_OPTION: &str = "n/d";
const PLACEHOLDER: &str = "—";

/// 检查一次作答，作答方式与题型不符时返回 `None`
pub fn check(question: &Question, attempt: Attempt) -> Option<Feedback> {
    match attempt {
        Attempt::Choose(selected) => check_mcq(question, selected),
        Attempt::Assert(value) => check_tf(question, value),
        Attempt::Reveal => reveal_short(question),
    }
}

/// 单选题
pub fn check_mcq(question: &Question, selected: Option<usize>) -> Option<Feedback> {
    let QuestionKind::Mcq {
        options,
        correct_index,
    } = &question.kind
    else {
        return None;
    };

    let Some(chosen) = selected else {
        return Some(Feedback::NoSelection);
    };

    let explanation = question.explanation.clone();
    if Some(chosen) == *correct_index {
        return Some(Feedback::Correct { explanation });
    }

    let correct_option = correct_index
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_else(|| MISSING_OPTION.to_string());

    Some(Feedback::Incorrect {
        correct_option: Some(correct_option),
        explanation,
    })
}

/// 判断题
pub fn check_tf(question: &Question, asserted: bool) -> Option<Feedback> {
    let QuestionKind::TrueFalse { correct } = question.kind else {
        return None;
    };

    let explanation = question.explanation.clone();
    Some(if asserted == correct {
        Feedback::Correct { explanation }
    } else {
        Feedback::Incorrect {
            correct_option: None,
            explanation,
        }
    })
}

/// 简答题：不评分，只显示参考答案
pub fn reveal_short(question: &Question) -> Option<Feedback> {
    let QuestionKind::Short { answer } = &question.kind else {
        return None;
    };

    Some(Feedback::Answer {
        text: answer.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
    })
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::NoSelection => write!(f, "Seleziona una risposta."),
            Feedback::Correct { explanation } => {
                write!(f, "Corretto ✅")?;
                write_explanation(f, explanation)
            }
            Feedback::Incorrect {
                correct_option,
                explanation,
            } => {
                write!(f, "Sbagliato ❌")?;
                if let Some(option) = correct_option {
                    write!(f, " (Corretta: {})", option)?;
                }
                write_explanation(f, explanation)
            }
            Feedback::Answer { text } => write!(f, "Risposta: {}", text),
        }
    }
}

fn write_explanation(f: &mut fmt::Formatter<'_>, explanation: &Option<String>) -> fmt::Result {
    match explanation {
        Some(text) => write!(f, " — {}", text),
        None => Ok(()),
    }
}

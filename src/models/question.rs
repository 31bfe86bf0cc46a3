use crate::models::lenient;
use serde::Deserialize;

/// 章节中的一道题
///
/// 线上格式用 `type` 字段区分题型，缺省或无法识别时按简答题处理。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawQuestion")]
pub struct Question {
    pub prompt: String,
    pub explanation: Option<String>,
    pub kind: QuestionKind,
}

/// 题型及其答案键
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// 单选题
    Mcq {
        options: Vec<String>,
        correct_index: Option<usize>,
    },
    /// 判断题
    TrueFalse { correct: bool },
    /// 简答题，仅供自评
    Short { answer: Option<String> },
}

impl QuestionKind {
    /// 线上格式中的题型名
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Mcq { .. } => "mcq",
            QuestionKind::TrueFalse { .. } => "tf",
            QuestionKind::Short { .. } => "short",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    options: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_index")]
    correct_index: Option<usize>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    correct: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    answer: Option<String>,
}

impl From<RawQuestion> for Question {
    fn from(raw: RawQuestion) -> Self {
        let kind = match raw.kind.as_deref() {
            Some("mcq") => QuestionKind::Mcq {
                options: raw.options,
                correct_index: raw.correct_index,
            },
            Some("tf") => QuestionKind::TrueFalse {
                correct: raw.correct.unwrap_or(false),
            },
            _ => QuestionKind::Short {
                answer: raw.answer.filter(|a| !a.is_empty()),
            },
        };

        Self {
            prompt: raw.prompt.unwrap_or_default(),
            explanation: raw.explanation.filter(|e| !e.is_empty()),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mcq() {
        let q: Question = serde_json::from_str(
            r#"{"type":"mcq","prompt":"Anno?","options":["100","27 a.C."],"correctIndex":1}"#,
        )
        .unwrap();

        assert_eq!(q.prompt, "Anno?");
        assert_eq!(
            q.kind,
            QuestionKind::Mcq {
                options: vec!["100".to_string(), "27 a.C.".to_string()],
                correct_index: Some(1),
            }
        );
        assert_eq!(q.kind.label(), "mcq");
    }

    #[test]
    fn test_tf_without_key_is_false() {
        let q: Question = serde_json::from_str(r#"{"type":"tf","prompt":"Roma è in Italia?"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::TrueFalse { correct: false });
    }

    #[test]
    fn test_missing_type_is_short() {
        let q: Question =
            serde_json::from_str(r#"{"prompt":"Chi era Augusto?","answer":"Il primo imperatore"}"#)
                .unwrap();
        assert_eq!(
            q.kind,
            QuestionKind::Short {
                answer: Some("Il primo imperatore".to_string())
            }
        );
        assert_eq!(q.explanation, None);
    }

    #[test]
    fn test_malformed_answer_keys_are_missing() {
        let q: Question = serde_json::from_str(
            r#"{"type":"mcq","prompt":"Anno?","options":["100",27],"correctIndex":-1,"explanation":false}"#,
        )
        .unwrap();
        assert_eq!(
            q.kind,
            QuestionKind::Mcq {
                options: vec!["100".to_string(), "27".to_string()],
                correct_index: None,
            }
        );
        assert_eq!(q.explanation, None);

        let q: Question = serde_json::from_str(r#"{"type":"tf","prompt":"Vero?","correct":"true"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::TrueFalse { correct: false });
    }

    #[test]
    fn test_unknown_type_falls_back_to_short() {
        let q: Question = serde_json::from_str(r#"{"type":"essay","prompt":"Descrivi"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::Short { answer: None });
    }
}

use crate::models::lenient;
use crate::models::question::Question;
use serde::Deserialize;

/// 单个章节的学习内容，按章节懒加载
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDocument {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub chapter_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub topics: Vec<Topic>,
}

/// 章节中的一个知识点
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Topic {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub questions: Vec<Question>,
}

impl Topic {
    /// 搜索时参与匹配的全部文本：标题、定义、解释以及每道题的题干
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [&self.title, &self.definition, &self.explanation]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .chain(self.questions.iter().map(|q| q.prompt.as_str()))
    }
}

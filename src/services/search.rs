/// 章节内搜索
///
/// 不区分大小写的子串匹配，按知识点过滤：标题、定义、解释或任一题干命中即保留。
/// 过滤只产生可见子集，不修改章节文档。
use crate::models::{ChapterDocument, Topic};

/// 规范化搜索词：去首尾空白并转小写
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// 知识点是否匹配（`needle` 需已规范化）
pub fn topic_matches(topic: &Topic, needle: &str) -> bool {
    needle.is_empty()
        || topic
            .searchable_fields()
            .any(|field| field.to_lowercase().contains(needle))
}

/// 返回命中的知识点及其在章节中的原始下标
pub fn filter_topics<'a>(chapter: &'a ChapterDocument, query: &str) -> Vec<(usize, &'a Topic)> {
    let needle = normalize_query(query);
    chapter
        .topics
        .iter()
        .enumerate()
        .filter(|(_, topic)| topic_matches(topic, &needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter() -> ChapterDocument {
        serde_json::from_str(
            r#"{
                "chapterTitle": "Roma",
                "topics": [
                    {"title": "Impero", "definition": "Forma di governo con a capo un imperatore",
                     "questions": [{"type":"mcq","prompt":"Anno?","options":["100","27 a.C."],"correctIndex":1}]},
                    {"title": "Repubblica", "explanation": "Governo dei consoli e del Senato"},
                    {"title": "Monarchia", "questions": [{"prompt": "Chi fu l'ultimo RE?"}]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_query_keeps_all() {
        let chapter = chapter();
        assert_eq!(filter_topics(&chapter, "").len(), 3);
        assert_eq!(filter_topics(&chapter, "   ").len(), 3);
    }

    #[test]
    fn test_match_in_definition() {
        let chapter = chapter();
        let hits = filter_topics(&chapter, "imperatore");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);
    }

    #[test]
    fn test_match_is_case_insensitive_and_trimmed() {
        let chapter = chapter();
        let hits = filter_topics(&chapter, "  SENATO ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.title.as_deref(), Some("Repubblica"));
    }

    #[test]
    fn test_match_in_question_prompt() {
        let chapter = chapter();
        let hits = filter_topics(&chapter, "ultimo re");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 2);
    }

    #[test]
    fn test_absent_term_returns_nothing() {
        let chapter = chapter();
        assert!(filter_topics(&chapter, "cartagine").is_empty());
        // 原文档不受影响
        assert_eq!(chapter.topics.len(), 3);
    }
}

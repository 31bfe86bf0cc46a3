use crate::models::lenient;
use serde::{Deserialize, Serialize};

/// 科目/章节索引（`data/manifest.json`）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "lenient::seq")]
    pub subjects: Vec<SubjectRef>,
}

/// 清单中的一个科目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRef {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub chapters: Vec<ChapterRef>,
}

/// 清单中的章节引用，`json` 为相对站点根的章节文档路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    pub json: String,
}

impl Manifest {
    pub fn subject(&self, index: usize) -> Option<&SubjectRef> {
        self.subjects.get(index)
    }

    pub fn chapter(&self, subject: usize, chapter: usize) -> Option<&ChapterRef> {
        self.subject(subject).and_then(|s| s.chapters.get(chapter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"subjects":[{"name":"Storia","chapters":[{"id":"c1","title":"Roma","json":"data/c1.json"}]}]}"#,
        )
        .unwrap();

        assert_eq!(manifest.subjects.len(), 1);
        let chapter = manifest.chapter(0, 0).unwrap();
        assert_eq!(chapter.title, "Roma");
        assert_eq!(chapter.json, "data/c1.json");
        assert!(manifest.chapter(0, 1).is_none());
        assert!(manifest.chapter(1, 0).is_none());
    }

    #[test]
    fn test_malformed_entries_are_lenient() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"subjects":[{"name":1984,"chapters":[{"id":3,"title":null,"json":"data/c3.json"},{"title":"Senza file"}]},"x"]}"#,
        )
        .unwrap();

        assert_eq!(manifest.subjects.len(), 1);
        assert_eq!(manifest.subjects[0].name, "1984");
        let chapters = &manifest.subjects[0].chapters;
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].id, "3");
        assert_eq!(chapters[0].title, "");
    }

    #[test]
    fn test_chapter_id_is_optional() {
        let chapter: ChapterRef =
            serde_json::from_str(r#"{"title":"Grecia","json":"data/grecia.json"}"#).unwrap();
        assert_eq!(chapter.id, "");
    }
}

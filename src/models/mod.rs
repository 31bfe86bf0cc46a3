pub mod chapter;
mod lenient;
pub mod manifest;
pub mod question;
pub mod web_manifest;

pub use chapter::{ChapterDocument, Topic};
pub use manifest::{ChapterRef, Manifest, SubjectRef};
pub use question::{Question, QuestionKind};
pub use web_manifest::WebAppManifest;

//! 终端渲染
//!
//! 把 `ViewState` 和题目控件状态渲染成纯文本画面。只读，不改变任何状态。

use crate::models::{Question, QuestionKind, Topic};
use crate::services::Theme;
use crate::workflow::view_state::{Screen, ViewState};
use crate::workflow::widgets::{QuestionAddress, Widgets};
use std::fmt;

const PLACEHOLDER: &str = "—";
const RULE: &str = "────────────────────────────────────────";

/// 画面外框：标题栏、主题和安装按钮
#[derive(Debug, Clone)]
pub struct Chrome {
    pub app_name: String,
    pub theme: Theme,
    pub install_available: bool,
    pub offline_ready: bool,
}

/// 一帧完整画面
pub struct Frame<'a> {
    pub state: &'a ViewState,
    pub widgets: &'a Widgets,
    pub chrome: &'a Chrome,
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        writeln!(f, "{}", RULE)?;

        match self.state.screen() {
            Screen::Subjects => self.write_subjects(f)?,
            Screen::Chapters => self.write_chapters(f)?,
            Screen::Study => self.write_study(f)?,
        }

        writeln!(f, "{}", RULE)?;
        writeln!(f, "{}", self.state.status())
    }
}

/// 空串与缺失同样处理
fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

impl Frame<'_> {
    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nav = self.state.nav();
        write!(
            f,
            "{}  {} {} {}  {}",
            self.chrome.app_name,
            button("Materie", true),
            button("Capitoli", nav.chapters_enabled),
            button("Studio", nav.study_enabled),
            self.chrome.theme.toggle_icon(),
        )?;
        if self.chrome.install_available {
            write!(f, "  [Installa]")?;
        }
        if self.chrome.offline_ready {
            write!(f, "  (offline)")?;
        }
        writeln!(f)
    }

    fn write_subjects(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subjects = &self.state.manifest().subjects;
        writeln!(f, "Materie  [{} materie]", subjects.len())?;
        writeln!(f)?;
        for (i, subject) in subjects.iter().enumerate() {
            writeln!(
                f,
                "{:>3}. {}  [{} capitoli]",
                i + 1,
                subject.name,
                subject.chapters.len()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Tocca una materia per vedere i capitoli.")
    }

    fn write_chapters(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(subject) = self.state.selected_subject() else {
            return Ok(());
        };
        writeln!(f, "{}  [{} capitoli]", subject.name, subject.chapters.len())?;
        writeln!(f)?;
        for (i, chapter) in subject.chapters.iter().enumerate() {
            writeln!(f, "{:>3}. {}", i + 1, chapter.title)?;
            if !chapter.id.is_empty() {
                writeln!(f, "     {}", chapter.id)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Tocca un capitolo per aprire lo studio.")
    }

    fn write_study(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(chapter) = self.state.current_chapter() else {
            return Ok(());
        };

        let title = non_empty(chapter.chapter_title.as_deref())
            .or_else(|| non_empty(self.state.selected_chapter().map(|c| c.title.as_str())))
            .unwrap_or(PLACEHOLDER);
        let subject = non_empty(self.state.selected_subject().map(|s| s.name.as_str())).unwrap_or(PLACEHOLDER);
        let visible = self.state.visible_topics();

        writeln!(
            f,
            "{}  [{} / {} argomenti]",
            title,
            visible.len(),
            chapter.topics.len()
        )?;
        writeln!(f, "{}", subject)?;
        if !self.state.search().is_empty() {
            writeln!(f, "Cerca: {}", self.state.search())?;
        }
        writeln!(f)?;

        for (position, (index, topic)) in visible.iter().enumerate() {
            self.write_topic(f, position, *index, topic)?;
        }
        Ok(())
    }

    fn write_topic(&self, f: &mut fmt::Formatter<'_>, position: usize, index: usize, topic: &Topic) -> fmt::Result {
        let expanded = self.state.is_expanded(index);
        let marker = if expanded { "▾" } else { "▸" };
        writeln!(
            f,
            "{} [{}] {}",
            marker,
            position + 1,
            non_empty(topic.title.as_deref()).unwrap_or("Argomento")
        )?;
        if !expanded {
            return Ok(());
        }

        writeln!(f, "    [{} domande]", topic.questions.len())?;
        writeln!(f, "    Definizione")?;
        writeln!(f, "      {}", non_empty(topic.definition.as_deref()).unwrap_or(PLACEHOLDER))?;
        writeln!(f, "    Spiegazione")?;
        writeln!(f, "      {}", non_empty(topic.explanation.as_deref()).unwrap_or(PLACEHOLDER))?;
        writeln!(f, "    Domande")?;

        for (q, question) in topic.questions.iter().enumerate() {
            let address = QuestionAddress {
                topic: position,
                question: q,
            };
            self.write_question(f, address, question)?;
        }
        Ok(())
    }

    fn write_question(&self, f: &mut fmt::Formatter<'_>, address: QuestionAddress, question: &Question) -> fmt::Result {
        let widget = self.widgets.get(address);
        writeln!(
            f,
            "    [{}] ☐ {} ({})",
            address,
            question.prompt,
            question.kind.label()
        )?;

        match &question.kind {
            QuestionKind::Mcq { options, .. } => {
                let selected = widget.and_then(|w| w.selected);
                for (i, option) in options.iter().enumerate() {
                    let radio = if selected == Some(i) { "(•)" } else { "( )" };
                    writeln!(f, "        {} {}. {}", radio, i + 1, option)?;
                }
                writeln!(f, "        [Verifica]")?;
            }
            QuestionKind::TrueFalse { .. } => {
                writeln!(f, "        [Vero] [Falso]")?;
            }
            QuestionKind::Short { .. } => {
                writeln!(f, "        [Mostra risposta]")?;
                if widget.and_then(|w| w.feedback.as_ref()).is_none() {
                    writeln!(f, "        Risposta nascosta.")?;
                }
            }
        }

        if let Some(feedback) = widget.and_then(|w| w.feedback.as_ref()) {
            writeln!(f, "        → {}", feedback)?;
        }
        Ok(())
    }
}

fn button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[{}]", label)
    } else {
        format!("({})", label)
    }
}

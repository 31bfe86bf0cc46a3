//! 终端命令解析
//!
//! 每行一条命令，关键字（含别名）通过静态表查找，题目地址形如 `2.1`
//! （第 2 个可见知识点的第 1 题）。

use crate::services::InstallOutcome;
use crate::workflow::QuestionAddress;
use phf::phf_map;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Subjects,
    Chapters,
    Study,
    Search,
    Expand,
    Collapse,
    Choose,
    Verify,
    True,
    False,
    Reveal,
    Theme,
    Install,
    Help,
    Quit,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "materie" => Keyword::Subjects,
    "m" => Keyword::Subjects,
    "capitoli" => Keyword::Chapters,
    "c" => Keyword::Chapters,
    "studio" => Keyword::Study,
    "s" => Keyword::Study,
    "cerca" => Keyword::Search,
    "/" => Keyword::Search,
    "espandi" => Keyword::Expand,
    "comprimi" => Keyword::Collapse,
    "scegli" => Keyword::Choose,
    "verifica" => Keyword::Verify,
    "vero" => Keyword::True,
    "falso" => Keyword::False,
    "risposta" => Keyword::Reveal,
    "tema" => Keyword::Theme,
    "installa" => Keyword::Install,
    "aiuto" => Keyword::Help,
    "?" => Keyword::Help,
    "esci" => Keyword::Quit,
    "q" => Keyword::Quit,
};

const ADDRESS_PATTERN: &str = r"^(\d+)\.(\d+)$";

pub const HELP: &str = "\
Comandi:
  <n>                   apri la materia / il capitolo numero n
  materie | capitoli | studio
  cerca <testo>         filtra gli argomenti (cerca senza testo azzera)
  espandi [n]           espandi tutti gli argomenti o solo il numero n
  comprimi              comprimi tutti gli argomenti
  scegli <t.d> <n>      seleziona l'opzione n della domanda t.d
  verifica <t.d>        verifica la risposta scelta
  vero <t.d> | falso <t.d>
  risposta <t.d>        mostra la risposta
  tema                  cambia tema chiaro/scuro
  installa sì|no        rispondi alla richiesta di installazione
  esci";

/// 解析后的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Subjects,
    Chapters,
    Study,
    /// 选择当前列表中的第 n 项（从 0 开始）
    Select(usize),
    Search(String),
    /// 全部展开或按可见下标切换
    Expand(Option<usize>),
    Collapse,
    Choose(QuestionAddress, usize),
    Verify(QuestionAddress),
    Assert(QuestionAddress, bool),
    Reveal(QuestionAddress),
    Theme,
    Install(InstallOutcome),
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Comando sconosciuto: {0}")]
    Unknown(String),
    #[error("Argomento mancante o non valido per '{0}'")]
    BadArgument(&'static str),
    #[error("Formato dell'indirizzo non valido: {0}")]
    Pattern(#[from] regex::Error),
}

/// 解析一行输入，空行返回 `None`
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    if let Ok(n) = head.parse::<usize>() {
        if rest.is_empty() && n > 0 {
            return Ok(Some(Command::Select(n - 1)));
        }
        return Err(CommandError::BadArgument("numero"));
    }

    let keyword = KEYWORDS
        .get(head.to_lowercase().as_str())
        .copied()
        .ok_or_else(|| CommandError::Unknown(head.to_string()))?;

    let command = match keyword {
        Keyword::Subjects => Command::Subjects,
        Keyword::Chapters => Command::Chapters,
        Keyword::Study => Command::Study,
        Keyword::Search => Command::Search(rest.to_string()),
        Keyword::Expand => match rest {
            "" => Command::Expand(None),
            n => Command::Expand(Some(parse_index(n).ok_or(CommandError::BadArgument("espandi"))?)),
        },
        Keyword::Collapse => Command::Collapse,
        Keyword::Choose => {
            let (address, option) = rest
                .split_once(char::is_whitespace)
                .ok_or(CommandError::BadArgument("scegli"))?;
            let address = parse_address(address)?.ok_or(CommandError::BadArgument("scegli"))?;
            let option = parse_index(option.trim()).ok_or(CommandError::BadArgument("scegli"))?;
            Command::Choose(address, option)
        }
        Keyword::Verify => Command::Verify(require_address(rest, "verifica")?),
        Keyword::True => Command::Assert(require_address(rest, "vero")?, true),
        Keyword::False => Command::Assert(require_address(rest, "falso")?, false),
        Keyword::Reveal => Command::Reveal(require_address(rest, "risposta")?),
        Keyword::Theme => Command::Theme,
        Keyword::Install => Command::Install(
            InstallOutcome::parse(rest).ok_or(CommandError::BadArgument("installa"))?,
        ),
        Keyword::Help => Command::Help,
        Keyword::Quit => Command::Quit,
    };

    Ok(Some(command))
}

/// 从 1 开始的编号转成下标
fn parse_index(text: &str) -> Option<usize> {
    text.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

fn parse_address(text: &str) -> Result<Option<QuestionAddress>, CommandError> {
    let re = Regex::new(ADDRESS_PATTERN)?;
    let Some(caps) = re.captures(text.trim()) else {
        return Ok(None);
    };

    let topic = parse_index(&caps[1]);
    let question = parse_index(&caps[2]);
    Ok(topic
        .zip(question)
        .map(|(topic, question)| QuestionAddress { topic, question }))
}

fn require_address(text: &str, command: &'static str) -> Result<QuestionAddress, CommandError> {
    parse_address(text)?.ok_or(CommandError::BadArgument(command))
}

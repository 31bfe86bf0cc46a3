/// 安装提示
///
/// 提示只提供一次：用户接受或拒绝后只记录结果并隐藏按钮，不做其他处理。
use tracing::info;

/// 用户对安装提示的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

impl InstallOutcome {
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "sì" | "si" | "s" | "yes" | "y" => Some(InstallOutcome::Accepted),
            "no" | "n" => Some(InstallOutcome::Dismissed),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct InstallPrompt {
    deferred: bool,
    outcome: Option<InstallOutcome>,
}

impl InstallPrompt {
    /// 应用可安装时调用；已经给出过选择则不再提示
    pub fn offer(&mut self) {
        if self.outcome.is_none() {
            self.deferred = true;
        }
    }

    /// 安装按钮是否可见
    pub fn is_available(&self) -> bool {
        self.deferred
    }

    pub fn outcome(&self) -> Option<InstallOutcome> {
        self.outcome
    }

    /// 弹出提示并记录选择；没有待用的提示时返回 `None`
    pub fn prompt(&mut self, choice: InstallOutcome) -> Option<InstallOutcome> {
        if !self.deferred {
            return None;
        }
        self.deferred = false;
        self.outcome = Some(choice);
        info!("安装提示结果: {:?}", choice);
        Some(choice)
    }
}

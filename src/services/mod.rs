pub mod checker;
pub mod install_prompt;
pub mod offline_worker;
pub mod preferences;
pub mod search;

pub use checker::{check, Attempt, Feedback};
pub use install_prompt::{InstallOutcome, InstallPrompt};
pub use offline_worker::{DataPathPolicy, FetchEvent, OfflineWorker, WorkerState};
pub use preferences::{PreferenceStore, Theme};
pub use search::filter_topics;

pub mod render;
pub mod view_state;
pub mod widgets;

pub use render::{Chrome, Frame};
pub use view_state::{Action, ChapterKey, NavState, Screen, ViewState};
pub use widgets::{QuestionAddress, WidgetError, WidgetInput, Widgets};

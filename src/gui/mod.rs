mod error;
mod list_selector;

pub use error::GuideGuiError;
pub use list_selector::{list_selector, SelectorEvent, SelectorState};

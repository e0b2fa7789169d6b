pub mod app;
pub mod components;
pub mod format;
pub mod layout;
pub mod terminal;
pub mod theme;
pub mod toasts;
pub mod views;

pub use app::App;
pub use terminal::{init as init_terminal, restore as restore_terminal, Tui};

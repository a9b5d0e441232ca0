pub mod config;
pub mod courses;
pub mod tui;

pub use config::{ConfigCommands, config_command};
pub use courses::courses_command;
pub use tui::{TuiCommands, tui_command};

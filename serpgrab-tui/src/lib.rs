mod command;
mod feeders;
mod input;
mod session;
mod styles;
mod transcript;
mod tui;
mod view;

pub use tui::{TuiSettings, run_tui};

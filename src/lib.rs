pub mod checker;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod dict;
pub mod keyboard;
pub mod session;
pub mod ui;

pub use checker::SpellChecker;
pub use config::Config;
pub use session::{CheckOutcome, Session, SessionStats};

//! Terminal presentation, one module per command

pub mod boardroom;
pub mod fundamentals;
pub mod history;
pub mod news;
pub mod quote;
pub mod setup;
pub mod ui;
pub mod watch;

// src/writer/mod.rs
mod append;
mod close;
mod degrade;
mod open;
mod options;
mod session;

pub use options::SessionOptions;
pub use session::{CloseReport, SessionState, WriteSession};

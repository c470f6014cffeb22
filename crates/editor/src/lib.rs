// Library crate: the editor core without any windowing.
// The binary drives it from stdin; integration tests drive it directly.

pub mod app;
pub mod command;
pub mod fixtures;
pub mod harness;
pub mod persistence;
pub mod render;
pub mod session;
pub mod state;
pub mod sync;

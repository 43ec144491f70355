//! hexed - Line-oriented hex editor
//!
//! This library provides the editing engine (byte store, undo history, dump renderer,
//! command interpreter) used by the `hexed` binary.

pub mod app;
pub mod buffer;
pub mod ui;

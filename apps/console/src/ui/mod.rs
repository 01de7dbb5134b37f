//! Text UI: app state, input parsing, view rendering and the shell drivers.

pub mod app;
pub mod input;
pub mod shell;
pub mod views;

pub use app::ConsoleApp;

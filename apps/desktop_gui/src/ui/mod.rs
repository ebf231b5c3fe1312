//! UI layer for the greeter window.

pub mod app;

pub use app::GreeterApp;

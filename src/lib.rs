pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod protect;
pub mod server;
pub mod session;
pub mod types;

pub use console::Console;

#[cfg(test)]
pub mod testing;

//! Terminal Mythic+ tracker backed by the Raider.io API.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod response;
pub mod roster;
pub mod thumbnail;
pub mod tui;
pub mod view;

pub use error::{Error, Result};

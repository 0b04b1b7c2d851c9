// ABOUTME: Shared types and configuration for navbar.
// ABOUTME: Defines colors, mode theme, and config file handling.

pub mod color;
pub mod config;

pub use color::{Color, ColorError};
pub use config::{Config, ConfigError, Theme};

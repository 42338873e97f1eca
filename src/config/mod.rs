// src/config/mod.rs
//! Runtime configuration (TOML file + env overrides).

pub mod app;

pub use crate::config::app::{AppConfig, LexiconConfig, MarketConfig, NewsConfig, ServerConfig};

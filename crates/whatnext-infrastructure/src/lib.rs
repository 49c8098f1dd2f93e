//! Filesystem concerns of the WhatNext client.

pub mod config_service;
pub mod paths;

pub use config_service::{ConfigService, ENV_API_BASE_URL, ENV_USER_ID, apply_overrides};
pub use paths::WhatnextPaths;

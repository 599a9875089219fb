// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Base URL stamped onto signed upload URLs. The real signer lives in
    /// the storage collaborator; this only shapes the issued URL.
    pub upload_url_base: String,
    /// Simulated processing latency between upload completion and the
    /// media object reaching UPLOADED. This is the propagation delay that
    /// readers of post/media state may observe.
    pub processing_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv::dotenv();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?,
                enable_cors: env::var("ENABLE_CORS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
            media: MediaConfig {
                upload_url_base: env::var("UPLOAD_URL_BASE")
                    .unwrap_or_else(|_| "https://uploads.localhost/media".to_string()),
                processing_delay_ms: env::var("MEDIA_PROCESSING_DELAY_MS")
                    .unwrap_or_else(|_| "250".to_string())
                    .parse()?,
            },
        })
    }

    /// Parse configuration from the environment and install it as the
    /// process-wide instance. Returns the existing instance if called twice.
    pub fn init() -> Result<&'static Config> {
        if let Some(config) = CONFIG.get() {
            return Ok(config);
        }
        let config = Config::from_env()?;
        Ok(CONFIG.get_or_init(|| config))
    }

    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| Config::from_env().expect("failed to load configuration"))
    }
}

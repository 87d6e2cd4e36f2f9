// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const MIN_JWT_SECRET_CHARS: usize = 32;
const MAX_TIMEOUT_SECONDS: u64 = 120;
const MIN_QR_SIZE: u32 = 50;
const MAX_QR_SIZE: u32 = 1000;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
        }
    }
}

fn default_app_name() -> String {
    "LinkPress".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8085
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShlinkConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_qr_size")]
    pub qr_size: u32,
    #[serde(default = "default_qr_format")]
    pub qr_format: String,
}

impl Default for ShlinkConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_seconds: default_timeout_seconds(),
            qr_size: default_qr_size(),
            qr_format: default_qr_format(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_qr_size() -> u32 {
    300
}

fn default_qr_format() -> String {
    "png".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub audience: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub expiration_hours: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: default_jwt_issuer(),
            audience: default_jwt_audience(),
            expiration_hours: default_jwt_expiration_hours(),
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_jwt_issuer() -> String {
    "linkpress".to_string()
}

fn default_jwt_audience() -> String {
    "linkpress-console".to_string()
}

fn default_jwt_expiration_hours() -> u64 {
    12
}

fn default_cookie_name() -> String {
    "linkpress_session".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,
    #[serde(default = "default_staff_role")]
    pub staff_role: String,
    #[serde(default)]
    pub jwt: JwtConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
            staff_role: default_staff_role(),
            jwt: JwtConfig::default(),
        }
    }
}

fn default_users_file() -> PathBuf {
    PathBuf::from("users.yaml")
}

fn default_staff_role() -> String {
    "staff".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Raw on-disk configuration, straight out of the YAML file.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub shlink: ShlinkConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|error| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), error))
        })?;
        serde_yaml::from_str(&content).map_err(|error| {
            ConfigError::LoadError(format!("Failed to parse {}: {}", path.display(), error))
        })
    }
}

/// Shortener connection settings with the URL already parsed and the timeout
/// in its final shape, so the client constructor cannot fail on bad input.
#[derive(Debug, Clone)]
pub struct ValidatedShlinkConfig {
    pub base_url: Url,
    pub api_key: String,
    pub timeout: Duration,
    pub qr_size: u32,
    pub qr_format: String,
}

/// Configuration after validation. Everything downstream takes this type, so
/// a constructed server can assume every invariant below holds.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub app_name: String,
    pub server: ServerConfig,
    pub shlink: ValidatedShlinkConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl ValidatedConfig {
    pub fn from_app_config(config: AppConfig) -> Result<Self, ConfigError> {
        if config.app.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "app.name must not be empty".to_string(),
            ));
        }

        config.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "server.bind is not a valid IP address: {}",
                config.server.bind
            ))
        })?;
        if config.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }

        let shlink = validate_shlink(&config.shlink)?;
        validate_auth(&config.auth)?;

        Ok(Self {
            app_name: config.app.name.trim().to_string(),
            server: config.server,
            shlink,
            auth: config.auth,
            logging: config.logging,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .unwrap_or(IpAddr::from([127, 0, 0, 1]));
        SocketAddr::new(ip, self.server.port)
    }
}

fn validate_shlink(config: &ShlinkConfig) -> Result<ValidatedShlinkConfig, ConfigError> {
    if config.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "shlink.base_url must be set".to_string(),
        ));
    }
    let base_url = Url::parse(config.base_url.trim()).map_err(|error| {
        ConfigError::ValidationError(format!("shlink.base_url is not a valid URL: {}", error))
    })?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "shlink.base_url must use http or https, got {}",
            base_url.scheme()
        )));
    }

    if config.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "shlink.api_key must be set".to_string(),
        ));
    }

    if config.timeout_seconds == 0 || config.timeout_seconds > MAX_TIMEOUT_SECONDS {
        return Err(ConfigError::ValidationError(format!(
            "shlink.timeout_seconds must be between 1 and {}",
            MAX_TIMEOUT_SECONDS
        )));
    }

    if config.qr_size < MIN_QR_SIZE || config.qr_size > MAX_QR_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "shlink.qr_size must be between {} and {}",
            MIN_QR_SIZE, MAX_QR_SIZE
        )));
    }
    if !matches!(config.qr_format.as_str(), "png" | "svg") {
        return Err(ConfigError::ValidationError(format!(
            "shlink.qr_format must be png or svg, got {}",
            config.qr_format
        )));
    }

    Ok(ValidatedShlinkConfig {
        base_url,
        api_key: config.api_key.trim().to_string(),
        timeout: Duration::from_secs(config.timeout_seconds),
        qr_size: config.qr_size,
        qr_format: config.qr_format.clone(),
    })
}

fn validate_auth(config: &AuthConfig) -> Result<(), ConfigError> {
    if config.users_file.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.users_file must be set".to_string(),
        ));
    }
    if config.staff_role.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.staff_role must not be empty".to_string(),
        ));
    }
    if config.jwt.secret.len() < MIN_JWT_SECRET_CHARS {
        return Err(ConfigError::ValidationError(format!(
            "auth.jwt.secret must be at least {} characters",
            MIN_JWT_SECRET_CHARS
        )));
    }
    if config.jwt.expiration_hours == 0 || config.jwt.expiration_hours > 24 * 7 {
        return Err(ConfigError::ValidationError(
            "auth.jwt.expiration_hours must be between 1 and 168".to_string(),
        ));
    }
    if config.jwt.cookie_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.jwt.cookie_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn load_validated_config(path: &Path) -> Result<ValidatedConfig, ConfigError> {
    let config = AppConfig::load(path)?;
    ValidatedConfig::from_app_config(config)
}

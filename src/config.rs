//! Runtime configuration
//!
//! Every required key is read once at startup. Missing keys are collected and
//! reported together; nothing required has a default.

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

pub const LOGIN_URL: &str = "LOGIN_URL";
pub const LOGIN_USERNAME: &str = "LOGIN_USERNAME";
pub const LOGIN_PASSWORD: &str = "LOGIN_PASSWORD";
pub const CLOUDINARY_CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";
pub const CLOUDINARY_API_KEY: &str = "CLOUDINARY_API_KEY";
pub const CLOUDINARY_API_SECRET: &str = "CLOUDINARY_API_SECRET";
pub const TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const WHATSAPP_FROM: &str = "WHATSAPP_FROM";
pub const WHATSAPP_TO: &str = "WHATSAPP_TO";

pub const WEBDRIVER_URL: &str = "WEBDRIVER_URL";
pub const BIND_ADDR: &str = "BIND_ADDR";

pub const REQUIRED_KEYS: [&str; 10] = [
    LOGIN_URL,
    LOGIN_USERNAME,
    LOGIN_PASSWORD,
    CLOUDINARY_CLOUD_NAME,
    CLOUDINARY_API_KEY,
    CLOUDINARY_API_SECRET,
    TWILIO_ACCOUNT_SID,
    TWILIO_AUTH_TOKEN,
    WHATSAPP_FROM,
    WHATSAPP_TO,
];

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:7071";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Required configuration missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub login_url: String,
    pub username: String,
    pub password: String,
    pub cloudinary: CloudinaryCredentials,
    pub twilio: TwilioCredentials,
    pub whatsapp_from: String,
    pub whatsapp_to: String,
    pub webdriver_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| read(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |key: &'static str| read(key).ok_or(ConfigError::Missing(vec![key]));

        Ok(Self {
            login_url: required(LOGIN_URL)?,
            username: required(LOGIN_USERNAME)?,
            password: required(LOGIN_PASSWORD)?,
            cloudinary: CloudinaryCredentials {
                cloud_name: required(CLOUDINARY_CLOUD_NAME)?,
                api_key: required(CLOUDINARY_API_KEY)?,
                api_secret: required(CLOUDINARY_API_SECRET)?,
            },
            twilio: TwilioCredentials {
                account_sid: required(TWILIO_ACCOUNT_SID)?,
                auth_token: required(TWILIO_AUTH_TOKEN)?,
            },
            whatsapp_from: required(WHATSAPP_FROM)?,
            whatsapp_to: required(WHATSAPP_TO)?,
            webdriver_url: read(WEBDRIVER_URL).unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
        })
    }

    /// Bind address for the HTTP trigger, independent of the required keys
    pub fn bind_addr_from_env() -> Result<SocketAddr, ConfigError> {
        parse_bind_addr(std::env::var(BIND_ADDR).ok())
    }
}

fn parse_bind_addr(raw: Option<String>) -> Result<SocketAddr, ConfigError> {
    let raw = raw
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    raw.parse().map_err(|_| ConfigError::Invalid { key: BIND_ADDR, value: raw })
}

const REDACTED: &str = "***";

impl fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("login_url", &self.login_url)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("cloudinary", &self.cloudinary)
            .field("twilio", &self.twilio)
            .field("whatsapp_from", &self.whatsapp_from)
            .field("whatsapp_to", &self.whatsapp_to)
            .field("webdriver_url", &self.webdriver_url)
            .finish()
    }
}

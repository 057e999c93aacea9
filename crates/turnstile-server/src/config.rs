//! Configuration for the Turnstile Server
//!
//! Settings come from an optional JSON or YAML file named by
//! `TURNSTILE_CONFIG`, then individual `TURNSTILE_*` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use turnstile_core::{OrchestratorConfig, ValueMap};
use turnstile_stdlib::{IdpEndpoint, OtpSettings};

use crate::error::{ServerError, ServerResult};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

/// OAuth2 settings for one identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdpSettings {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Account created at start-up, for development hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SeedUser {
    /// Profile attributes under their wire names
    pub fn attributes(&self) -> ValueMap {
        let mut attributes = ValueMap::new();
        if let Some(mobile) = &self.mobile_number {
            attributes.insert("mobileNumber".to_string(), mobile.clone().into());
        }
        if let Some(email) = &self.email {
            attributes.insert("email".to_string(), email.clone().into());
        }
        attributes
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Directory of graph definition files
    #[serde(default)]
    pub graphs_dir: Option<PathBuf>,

    /// JSON or YAML list of applications
    #[serde(default)]
    pub applications_file: Option<PathBuf>,

    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Recoverable failures allowed per node
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Deadline for one executor call in milliseconds
    #[serde(default = "default_step_timeout")]
    pub step_timeout_ms: u64,

    /// Keep finished sessions until they expire
    #[serde(default)]
    pub retain_terminal_sessions: bool,

    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Digits in an SMS passcode
    #[serde(default = "default_otp_length")]
    pub otp_code_length: usize,

    /// Seconds an SMS passcode stays valid
    #[serde(default = "default_otp_validity")]
    pub otp_validity_secs: i64,

    /// Identity providers by name
    #[serde(default)]
    pub identity_providers: HashMap<String, IdpSettings>,

    /// Accounts created at start-up
    #[serde(default)]
    pub seed_users: Vec<SeedUser>,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_session_ttl() -> u64 {
    900 // 15 minutes
}

fn default_max_retries() -> u32 {
    3
}

fn default_step_timeout() -> u64 {
    10_000
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_otp_length() -> usize {
    6
}

fn default_otp_validity() -> i64 {
    300
}

impl ServerConfig {
    /// Load configuration from the optional config file and environment variables
    pub fn load() -> ServerResult<Self> {
        let mut config = match env::var("TURNSTILE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;

        if config.seed_users.iter().any(|user| !user.password.is_empty()) {
            warn!("Seed users configured - do not use seed accounts in production!");
        }

        info!("Loaded server configuration");
        Ok(config)
    }

    /// Read a JSON or YAML file; the format follows the extension
    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Apply `TURNSTILE_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("TURNSTILE_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.port = port;
            } else {
                warn!("Invalid TURNSTILE_PORT value: {}", port);
            }
        }

        if let Some(host) = lookup("TURNSTILE_HOST") {
            self.bind_address = host;
        }

        if let Some(log_level) = lookup("TURNSTILE_LOG_LEVEL") {
            self.log_level = log_level;
        }

        if let Some(format) = lookup("TURNSTILE_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "pretty" => self.log_format = LogFormat::Pretty,
                "json" => self.log_format = LogFormat::Json,
                _ => warn!("Invalid TURNSTILE_LOG_FORMAT value: {}", format),
            }
        }

        if let Some(dir) = lookup("TURNSTILE_GRAPHS_DIR") {
            self.graphs_dir = Some(PathBuf::from(dir));
        }

        if let Some(file) = lookup("TURNSTILE_APPLICATIONS_FILE") {
            self.applications_file = Some(PathBuf::from(file));
        }

        if let Some(ttl) = lookup("TURNSTILE_SESSION_TTL_SECS") {
            if let Ok(secs) = ttl.parse::<u64>() {
                self.session_ttl_secs = secs;
            } else {
                warn!("Invalid TURNSTILE_SESSION_TTL_SECS value: {}", ttl);
            }
        }

        if let Some(retries) = lookup("TURNSTILE_MAX_RETRIES") {
            if let Ok(retries) = retries.parse::<u32>() {
                self.max_retries = retries;
            } else {
                warn!("Invalid TURNSTILE_MAX_RETRIES value: {}", retries);
            }
        }

        if let Some(timeout) = lookup("TURNSTILE_STEP_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse::<u64>() {
                self.step_timeout_ms = ms;
            } else {
                warn!("Invalid TURNSTILE_STEP_TIMEOUT_MS value: {}", timeout);
            }
        }

        if let Some(retain) = lookup("TURNSTILE_RETAIN_TERMINAL_SESSIONS") {
            self.retain_terminal_sessions = retain.to_lowercase() == "true" || retain == "1";
        }

        if let Some(interval) = lookup("TURNSTILE_SWEEP_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse::<u64>() {
                self.sweep_interval_secs = secs;
            } else {
                warn!("Invalid TURNSTILE_SWEEP_INTERVAL_SECS value: {}", interval);
            }
        }
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> ServerResult<()> {
        if self.session_ttl_secs == 0 {
            return Err(ServerError::ConfigError(
                "session_ttl_secs must be greater than zero".to_string(),
            ));
        }

        if self.step_timeout_ms == 0 {
            return Err(ServerError::ConfigError(
                "step_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.sweep_interval_secs == 0 {
            return Err(ServerError::ConfigError(
                "sweep_interval_secs must be greater than zero".to_string(),
            ));
        }

        if !(4..=10).contains(&self.otp_code_length) {
            return Err(ServerError::ConfigError(format!(
                "otp_code_length must be between 4 and 10, got {}",
                self.otp_code_length
            )));
        }

        if self.otp_validity_secs <= 0 {
            return Err(ServerError::ConfigError(
                "otp_validity_secs must be greater than zero".to_string(),
            ));
        }

        if self.graphs_dir.is_none() {
            warn!("No graphs_dir configured - no flows can be started");
        }

        Ok(())
    }

    /// Orchestrator tunables
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            max_retries: self.max_retries,
            step_timeout: Duration::from_millis(self.step_timeout_ms),
            retain_terminal_sessions: self.retain_terminal_sessions,
            ..OrchestratorConfig::default()
        }
    }

    /// Passcode defaults for the SMS executor
    pub fn otp_settings(&self) -> OtpSettings {
        OtpSettings {
            code_length: self.otp_code_length,
            validity: chrono::Duration::seconds(self.otp_validity_secs),
        }
    }

    /// Provider endpoints keyed by provider name
    pub fn idp_endpoints(&self) -> HashMap<String, IdpEndpoint> {
        self.identity_providers
            .iter()
            .map(|(name, idp)| {
                let endpoint = IdpEndpoint {
                    authorize_url: idp.authorize_url.clone(),
                    token_url: idp.token_url.clone(),
                    userinfo_url: idp.userinfo_url.clone(),
                    client_id: idp.client_id.clone(),
                    client_secret: idp.client_secret.clone(),
                    redirect_uri: idp.redirect_uri.clone(),
                    scope: idp
                        .scope
                        .clone()
                        .unwrap_or_else(|| "openid email profile".to_string()),
                };
                (name.clone(), endpoint)
            })
            .collect()
    }

    /// Address to bind
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            graphs_dir: None,
            applications_file: None,
            session_ttl_secs: default_session_ttl(),
            max_retries: default_max_retries(),
            step_timeout_ms: default_step_timeout(),
            retain_terminal_sessions: false,
            sweep_interval_secs: default_sweep_interval(),
            otp_code_length: default_otp_length(),
            otp_validity_secs: default_otp_validity(),
            identity_providers: HashMap::new(),
            seed_users: Vec::new(),
        }
    }
}

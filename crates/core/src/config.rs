use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BugdeskError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub listen_addr: String,
    pub table_name: String,
    pub product_name: String,
    pub permalink_base: String,
    pub notify_mode: NotifyMode,
    pub notify_to: String,
    pub notify_from: String,
    pub smtp_addr: String,
    pub smtp_helo: String,
    pub smtp_starttls: bool,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub webhook_url: Option<String>,
    pub notify_timeout: Duration,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    None,
    Smtp,
    Webhook,
}

impl NotifyMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" | "log" => Ok(Self::None),
            "smtp" | "mail" | "email" => Ok(Self::Smtp),
            "webhook" | "http" => Ok(Self::Webhook),
            other => Err(BugdeskError::Config(format!("unknown notify mode: {other}"))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_root = env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(home).join(".local/share"));

        Self {
            db_path: data_root.join("bugdesk/bugdesk.duckdb"),
            listen_addr: "127.0.0.1:8080".to_string(),
            table_name: "bug_reports".to_string(),
            product_name: "bugdesk".to_string(),
            permalink_base: "http://127.0.0.1:8080/bugs".to_string(),
            notify_mode: NotifyMode::None,
            notify_to: "bugs@localhost".to_string(),
            notify_from: "bugdesk@localhost".to_string(),
            smtp_addr: "127.0.0.1:25".to_string(),
            smtp_helo: "localhost".to_string(),
            smtp_starttls: false,
            smtp_username: None,
            smtp_password: None,
            webhook_url: None,
            notify_timeout: Duration::from_secs(10),
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.table_name)?;
        if self.notify_mode == NotifyMode::Webhook && self.webhook_url.is_none() {
            return Err(BugdeskError::Config(
                "notify_mode=webhook requires webhook_url".to_string(),
            ));
        }
        if self.smtp_username.is_some() != self.smtp_password.is_some() {
            return Err(BugdeskError::Config(
                "smtp_username and smtp_password must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Link to a report, as sent in notifications.
    pub fn permalink(&self, id: i64) -> String {
        format!("{}#bugid{id}", self.permalink_base)
    }
}

/// Table names are spliced into SQL text, so only plain identifiers pass.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(BugdeskError::Config(format!("invalid table name: {name:?}")));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    db_path: Option<PathBuf>,
    listen_addr: Option<String>,
    table_name: Option<String>,
    product_name: Option<String>,
    permalink_base: Option<String>,
    notify_mode: Option<String>,
    notify_to: Option<String>,
    notify_from: Option<String>,
    smtp_addr: Option<String>,
    smtp_helo: Option<String>,
    smtp_starttls: Option<bool>,
    smtp_username: Option<String>,
    smtp_password: Option<String>,
    webhook_url: Option<String>,
    notify_timeout: Option<String>,
    max_body_bytes: Option<usize>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("BUGDESK_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("bugdesk/config.toml")
}

fn load_file_overrides(path: &PathBuf) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| BugdeskError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| BugdeskError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let max_body_bytes = match env::var("BUGDESK_MAX_BODY_BYTES") {
        Ok(v) => Some(v.parse::<usize>().map_err(|e| {
            BugdeskError::Config(format!("bad BUGDESK_MAX_BODY_BYTES in environment: {e}"))
        })?),
        Err(_) => None,
    };
    let smtp_starttls = match env::var("BUGDESK_SMTP_STARTTLS") {
        Ok(v) => Some(parse_bool(&v).ok_or_else(|| {
            BugdeskError::Config(format!("bad BUGDESK_SMTP_STARTTLS in environment: {v}"))
        })?),
        Err(_) => None,
    };

    Ok(ConfigOverrides {
        db_path: env::var("BUGDESK_DB_PATH").ok().map(PathBuf::from),
        listen_addr: env::var("BUGDESK_LISTEN_ADDR").ok(),
        table_name: env::var("BUGDESK_TABLE_NAME").ok(),
        product_name: env::var("BUGDESK_PRODUCT_NAME").ok(),
        permalink_base: env::var("BUGDESK_PERMALINK_BASE").ok(),
        notify_mode: env::var("BUGDESK_NOTIFY_MODE").ok(),
        notify_to: env::var("BUGDESK_NOTIFY_TO").ok(),
        notify_from: env::var("BUGDESK_NOTIFY_FROM").ok(),
        smtp_addr: env::var("BUGDESK_SMTP_ADDR").ok(),
        smtp_helo: env::var("BUGDESK_SMTP_HELO").ok(),
        smtp_starttls,
        smtp_username: env::var("BUGDESK_SMTP_USERNAME").ok(),
        smtp_password: env::var("BUGDESK_SMTP_PASSWORD").ok(),
        webhook_url: env::var("BUGDESK_WEBHOOK_URL").ok(),
        notify_timeout: env::var("BUGDESK_NOTIFY_TIMEOUT").ok(),
        max_body_bytes,
    })
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.db_path {
        cfg.db_path = v;
    }
    if let Some(v) = overrides.listen_addr {
        cfg.listen_addr = v;
    }
    if let Some(v) = overrides.table_name {
        cfg.table_name = v;
    }
    if let Some(v) = overrides.product_name {
        cfg.product_name = v;
    }
    if let Some(v) = overrides.permalink_base {
        cfg.permalink_base = v;
    }
    if let Some(v) = overrides.notify_mode {
        cfg.notify_mode = NotifyMode::parse(&v).map_err(|e| {
            BugdeskError::Config(format!("bad notify_mode in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.notify_to {
        cfg.notify_to = v;
    }
    if let Some(v) = overrides.notify_from {
        cfg.notify_from = v;
    }
    if let Some(v) = overrides.smtp_addr {
        cfg.smtp_addr = v;
    }
    if let Some(v) = overrides.smtp_helo {
        cfg.smtp_helo = v;
    }
    if let Some(v) = overrides.smtp_starttls {
        cfg.smtp_starttls = v;
    }
    if let Some(v) = overrides.smtp_username {
        cfg.smtp_username = Some(v);
    }
    if let Some(v) = overrides.smtp_password {
        cfg.smtp_password = Some(v);
    }
    if let Some(v) = overrides.webhook_url {
        cfg.webhook_url = Some(v);
    }
    if let Some(v) = overrides.notify_timeout {
        cfg.notify_timeout = humantime::parse_duration(&v).map_err(|e| {
            BugdeskError::Config(format!("bad notify_timeout in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.max_body_bytes {
        cfg.max_body_bytes = v;
    }
    Ok(())
}

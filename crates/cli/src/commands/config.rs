use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use nippo_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };
    render(&config, detect_config_path().as_deref())
}

pub fn render(config: &AppConfig, config_file_path: Option<&Path>) -> String {
    let config_file_doc = load_config_file_doc(config_file_path);
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path)
    };

    let bot_token = redact_token(config.slack.bot_token.as_ref());
    let channel_id = config.slack.channel_id.as_deref().unwrap_or("<unset>");

    let rows: [(&str, String, &[&str]); 10] = [
        ("slack.bot_token", bot_token, &["NIPPO_SLACK_BOT_TOKEN", "SLACK_BOT_TOKEN"]),
        (
            "slack.channel_id",
            channel_id.to_string(),
            &["NIPPO_SLACK_CHANNEL_ID", "SLACK_CHANNEL_ID"],
        ),
        ("slack.api_base_url", config.slack.api_base_url.clone(), &["NIPPO_SLACK_API_BASE_URL"]),
        (
            "slack.history_limit",
            config.slack.history_limit.to_string(),
            &["NIPPO_SLACK_HISTORY_LIMIT"],
        ),
        (
            "slack.timeout_secs",
            config.slack.timeout_secs.to_string(),
            &["NIPPO_SLACK_TIMEOUT_SECS"],
        ),
        ("server.bind_address", config.server.bind_address.clone(), &["NIPPO_SERVER_BIND_ADDRESS"]),
        ("server.port", config.server.port.to_string(), &["NIPPO_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["NIPPO_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["NIPPO_LOGGING_LEVEL", "NIPPO_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["NIPPO_LOGGING_FORMAT", "NIPPO_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for &(key, ref value, env_keys) in &rows {
        lines.push(render_line(key, value, source(key, env_keys)));
    }
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("nippo.toml"), PathBuf::from("config/nippo.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: Option<&SecretString>) -> String {
    let Some(token) = token else {
        return "<unset>".to_string();
    };
    let trimmed = token.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

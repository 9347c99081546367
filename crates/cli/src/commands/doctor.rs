use std::time::Duration;

use anyhow::Context;
use nippo_core::config::{AppConfig, LoadOptions, SlackTarget};
use nippo_slack::{SlackApi, SlackWebClient};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool, live: bool) -> CommandResult {
    let report = build_report(live);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(live: bool) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match SlackTarget::from_config(&config.slack) {
                Ok(target) => {
                    checks.push(DoctorCheck {
                        name: "slack_credentials",
                        status: CheckStatus::Pass,
                        details: format!("bot token present, channel `{}`", target.channel_id),
                    });
                    checks.push(check_channel_access(&config, target, live));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "slack_credentials",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("slack_channel_access", "slack credentials are missing"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("slack_credentials", "configuration did not load"));
            checks.push(skipped("slack_channel_access", "configuration did not load"));
        }
    }

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn check_channel_access(config: &AppConfig, target: SlackTarget, live: bool) -> DoctorCheck {
    if !live {
        return skipped("slack_channel_access", "--live was not given");
    }

    match probe_channel_access(config, target) {
        Ok(seen) => DoctorCheck {
            name: "slack_channel_access",
            status: CheckStatus::Pass,
            details: format!("conversations.history answered with {seen} message(s)"),
        },
        Err(error) => DoctorCheck {
            name: "slack_channel_access",
            status: CheckStatus::Fail,
            details: format!("{error:#}"),
        },
    }
}

fn probe_channel_access(config: &AppConfig, target: SlackTarget) -> anyhow::Result<usize> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize async runtime")?;
    let client = SlackWebClient::new(
        &config.slack.api_base_url,
        target.bot_token,
        Duration::from_secs(config.slack.timeout_secs),
    )
    .context("failed to build slack http client")?;

    let messages = runtime
        .block_on(client.conversations_history(&target.channel_id, 1))
        .context("failed to read channel history")?;
    Ok(messages.len())
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

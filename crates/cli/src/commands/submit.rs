use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Args;
use nippo_core::config::{AppConfig, LoadOptions, SlackTarget};
use nippo_core::report::date_label_for;
use nippo_core::{Report, SubmissionError};
use nippo_slack::{SlackApi, SlackWebClient, ThreadResolver};
use uuid::Uuid;

use crate::commands::CommandResult;

const COMMAND: &str = "submit";

#[derive(Debug, Clone, Default, Args)]
pub struct SubmitArgs {
    #[arg(long, help = "Date label such as 5/27 (defaults to today)")]
    pub date: Option<String>,
    #[arg(long)]
    pub name: String,
    #[arg(long = "start", value_name = "HH:MM")]
    pub start_time: String,
    #[arg(long = "end", value_name = "HH:MM")]
    pub end_time: String,
    #[arg(long, default_value = "")]
    pub achievements: String,
    #[arg(long, default_value = "")]
    pub progress: String,
    #[arg(long, default_value = "")]
    pub learning: String,
    #[arg(long, default_value = "")]
    pub improvements: String,
    #[arg(long = "next-goals", default_value = "")]
    pub next_goals: String,
    #[arg(long, help = "Print the composed report instead of posting it")]
    pub dry_run: bool,
}

impl SubmitArgs {
    fn into_report(self) -> Report {
        Report {
            date_label: self.date.unwrap_or_else(|| date_label_for(Local::now().date_naive())),
            name: self.name,
            start_time: self.start_time,
            end_time: self.end_time,
            achievements: self.achievements,
            progress: self.progress,
            learning: self.learning,
            improvements: self.improvements,
            next_goals: self.next_goals,
        }
    }
}

pub fn run(args: SubmitArgs) -> CommandResult {
    let dry_run = args.dry_run;
    let report = args.into_report();
    if let Err(error) = report.validate() {
        return CommandResult::failure(COMMAND, "report_validation", error.to_string(), 3);
    }

    if dry_run {
        return CommandResult::success(COMMAND, report.compose());
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2)
        }
    };
    let target = match SlackTarget::from_config(&config.slack) {
        Ok(target) => target,
        Err(error) => {
            let missing = SubmissionError::MissingConfiguration(error.to_string());
            return CommandResult::failure(COMMAND, "config_validation", missing.user_message(), 2);
        }
    };
    let client = match SlackWebClient::new(
        &config.slack.api_base_url,
        target.bot_token,
        Duration::from_secs(config.slack.timeout_secs),
    ) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure(COMMAND, "runtime", error.to_string(), 5);
        }
    };

    submit_with_api(&report, Arc::new(client), target.channel_id, config.slack.history_limit)
}

/// Validates and posts `report` through `api`, blocking on a single-threaded runtime.
pub fn submit_with_api(
    report: &Report,
    api: Arc<dyn SlackApi>,
    channel_id: String,
    history_limit: u32,
) -> CommandResult {
    if let Err(error) = report.validate() {
        return CommandResult::failure(COMMAND, "report_validation", error.to_string(), 3);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                5,
            );
        }
    };

    let resolver = ThreadResolver::new(api, channel_id, history_limit);
    let correlation_id = Uuid::new_v4().to_string();
    let text = report.compose();

    match runtime.block_on(resolver.submit(&report.date_label, &text, &correlation_id)) {
        Ok(submission) => {
            let parent = if submission.parent_created { "created" } else { "reused" };
            CommandResult::success(
                COMMAND,
                format!(
                    "report for {} posted in thread {} (parent {parent}, reply {})",
                    report.date_label.trim(),
                    submission.parent_ts,
                    submission.reply_ts
                ),
            )
        }
        Err(error) => {
            let detail = error.to_string();
            let submission_error = SubmissionError::from(error);
            let class = if submission_error.is_client_error() { "invalid_input" } else { "slack" };
            CommandResult::failure(
                COMMAND,
                class,
                format!("{} ({detail})", submission_error.user_message()),
                4,
            )
        }
    }
}

//! Daily report composition.
//!
//! A [`Report`] only lives long enough to be validated and rendered into the
//! single text blob that gets posted as a thread reply.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FIRST_SHIFT_HOUR: u32 = 10;
pub const LAST_SHIFT_HOUR: u32 = 19;

pub const SUBMITTED_MESSAGE: &str = "✅ 送信完了！";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "date")]
    pub date_label: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub achievements: String,
    pub progress: String,
    pub learning: String,
    pub improvements: String,
    pub next_goals: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReportValidationError {
    #[error("⚠️ 終業時間は始業時間より後に設定してください。")]
    TimeOrder,
    #[error("⚠️ 名前・勤務時間をすべて入力してください。")]
    MissingRequired,
    #[error("⚠️ {field} の時刻形式が正しくありません: `{value}`")]
    InvalidTime { field: &'static str, value: String },
}

impl Report {
    /// Checks the two form rules before anything leaves the process: start
    /// strictly before end, then name and both times present.
    pub fn validate(&self) -> Result<(), ReportValidationError> {
        let start = self.start_time.trim();
        let end = self.end_time.trim();

        if !start.is_empty() && !end.is_empty() {
            let start_at = parse_time("startTime", start)?;
            let end_at = parse_time("endTime", end)?;
            if start_at >= end_at {
                return Err(ReportValidationError::TimeOrder);
            }
        }

        if self.name.trim().is_empty() || start.is_empty() || end.is_empty() {
            return Err(ReportValidationError::MissingRequired);
        }

        Ok(())
    }

    pub fn compose(&self) -> String {
        let text = format!(
            "📅 日付：{date}\n\
             👤 名前：{name}\n\
             🕒 本日の勤務時間：{start}〜{end}\n\
             \n\
             ✅ *今日の実績*\n\
             {achievements}\n\
             \n\
             📈 *成果・進捗状況*\n\
             {progress}\n\
             \n\
             💡 *今日の学び・気づき*\n\
             {learning}\n\
             \n\
             ⚠️ *改善点*\n\
             {improvements}\n\
             \n\
             🚀 *次回の目標・質問*\n\
             {next_goals}\n\
             \n\
             ----------------------------",
            date = self.date_label,
            name = self.name,
            start = self.start_time,
            end = self.end_time,
            achievements = self.achievements,
            progress = self.progress,
            learning = self.learning,
            improvements = self.improvements,
            next_goals = self.next_goals,
        );
        text.trim().to_owned()
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ReportValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ReportValidationError::InvalidTime { field, value: value.to_owned() })
}

/// `M/D` without zero padding, e.g. `5/27`.
pub fn date_label_for(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Selectable shift times: every half hour from 10:00 up to and including 19:00.
pub fn time_options() -> Vec<String> {
    (FIRST_SHIFT_HOUR..=LAST_SHIFT_HOUR)
        .flat_map(|hour| [(hour, 0), (hour, 30)])
        .filter(|&(hour, minute)| !(hour == LAST_SHIFT_HOUR && minute > 0))
        .map(|(hour, minute)| format!("{hour:02}:{minute:02}"))
        .collect()
}

pub fn end_time_options(start_time: Option<&str>) -> Vec<String> {
    let start_time = start_time.map(str::trim).filter(|value| !value.is_empty());
    time_options()
        .into_iter()
        .filter(|option| start_time.map_or(true, |start| option.as_str() > start))
        .collect()
}

pub fn failure_message(error: &str) -> String {
    format!("❌ 送信失敗：{error}")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        date_label_for, end_time_options, failure_message, time_options, Report,
        ReportValidationError,
    };

    fn report() -> Report {
        Report {
            date_label: "5/27".to_owned(),
            name: "山田".to_owned(),
            start_time: "10:00".to_owned(),
            end_time: "19:00".to_owned(),
            achievements: "API実装".to_owned(),
            progress: "80%".to_owned(),
            learning: "axumのルーティング".to_owned(),
            improvements: "見積もり精度".to_owned(),
            next_goals: "テスト追加".to_owned(),
        }
    }

    #[test]
    fn valid_report_passes_validation() {
        assert_eq!(report().validate(), Ok(()));
    }

    #[test]
    fn start_at_or_after_end_is_rejected() {
        let same = Report { end_time: "10:00".to_owned(), ..report() };
        let reversed =
            Report { start_time: "18:30".to_owned(), end_time: "11:00".to_owned(), ..report() };

        assert_eq!(same.validate(), Err(ReportValidationError::TimeOrder));
        assert_eq!(reversed.validate(), Err(ReportValidationError::TimeOrder));
    }

    #[test]
    fn time_order_is_checked_before_required_fields() {
        let unnamed = Report { name: String::new(), end_time: "09:00".to_owned(), ..report() };
        assert_eq!(unnamed.validate(), Err(ReportValidationError::TimeOrder));
    }

    #[test]
    fn blank_name_or_missing_time_is_rejected() {
        let blank_name = Report { name: "   ".to_owned(), ..report() };
        let no_end = Report { end_time: String::new(), ..report() };

        assert_eq!(blank_name.validate(), Err(ReportValidationError::MissingRequired));
        assert_eq!(no_end.validate(), Err(ReportValidationError::MissingRequired));
    }

    #[test]
    fn malformed_time_is_reported_with_field() {
        let error = Report { start_time: "ten".to_owned(), ..report() }.validate();
        assert!(matches!(
            error,
            Err(ReportValidationError::InvalidTime { field: "startTime", ref value }) if value == "ten"
        ));
    }

    #[test]
    fn compose_renders_every_section_in_order() {
        let text = report().compose();

        assert!(text.starts_with("📅 日付：5/27\n👤 名前：山田\n🕒 本日の勤務時間：10:00〜19:00"));
        let sections = [
            "✅ *今日の実績*\nAPI実装",
            "📈 *成果・進捗状況*\n80%",
            "💡 *今日の学び・気づき*",
            "⚠️ *改善点*",
            "🚀 *次回の目標・質問*\nテスト追加",
        ];
        let mut cursor = 0;
        for section in sections {
            let found = text[cursor..].find(section).expect("section should follow previous one");
            cursor += found + section.len();
        }
        assert!(text.ends_with("----------------------------"));
    }

    #[test]
    fn date_label_has_no_zero_padding() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 7).expect("valid date");
        assert_eq!(date_label_for(date), "5/7");
    }

    #[test]
    fn time_options_cover_half_hours_through_closing() {
        let options = time_options();
        assert_eq!(options.first().map(String::as_str), Some("10:00"));
        assert_eq!(options.last().map(String::as_str), Some("19:00"));
        assert_eq!(options.len(), 19);
        assert!(!options.contains(&"19:30".to_owned()));
    }

    #[test]
    fn end_options_only_follow_the_start() {
        let options = end_time_options(Some("18:00"));
        assert_eq!(options, vec!["18:30".to_owned(), "19:00".to_owned()]);
        assert_eq!(end_time_options(None).len(), time_options().len());
    }

    #[test]
    fn failure_message_embeds_error() {
        assert_eq!(
            failure_message("Missing required fields"),
            "❌ 送信失敗：Missing required fields"
        );
    }
}

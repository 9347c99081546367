//! Recognising the per-day parent message in channel history.

use regex::Regex;

/// Substring every parent message carries.
pub const PARENT_MARKER: &str = "日報";

pub fn parent_message_text(date_label: &str) -> String {
    format!("📅 {date_label} {PARENT_MARKER}\nこのスレッドに返信で日報を提出してください！")
}

/// Matches history text against one date label: the marker must be present and
/// the label must appear as a whole word. The label is escaped, so `5.27` only
/// ever matches a literal `5.27`.
///
/// Boundaries are ASCII-only (kana and kanji do not extend a word), and are
/// only required on an edge whose character is an ASCII word character.
#[derive(Clone, Debug)]
pub struct ParentMatcher {
    date_label: String,
    pattern: Regex,
}

impl ParentMatcher {
    pub fn new(date_label: &str) -> Result<Self, regex::Error> {
        let leading = edge_boundary(date_label.chars().next());
        let trailing = edge_boundary(date_label.chars().next_back());
        let pattern =
            Regex::new(&format!("{leading}{}{trailing}", regex::escape(date_label)))?;
        Ok(Self { date_label: date_label.to_owned(), pattern })
    }

    pub fn date_label(&self) -> &str {
        &self.date_label
    }

    pub fn is_parent(&self, text: &str) -> bool {
        text.contains(PARENT_MARKER) && self.pattern.is_match(text)
    }
}

fn edge_boundary(edge: Option<char>) -> &'static str {
    match edge {
        Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' => r"(?-u:\b)",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::{parent_message_text, ParentMatcher};

    #[test]
    fn generated_parent_text_matches_its_own_label() {
        let matcher = ParentMatcher::new("5/27").expect("pattern");
        assert!(matcher.is_parent(&parent_message_text("5/27")));
    }

    #[test]
    fn marker_is_required() {
        let matcher = ParentMatcher::new("5/27").expect("pattern");
        assert!(!matcher.is_parent("5/27 の定例メモ"));
    }

    #[test]
    fn label_must_stand_alone() {
        let matcher = ParentMatcher::new("5/27").expect("pattern");
        assert!(!matcher.is_parent("📅 15/27 日報"));
        assert!(!matcher.is_parent("📅 5/270 日報"));
        assert!(matcher.is_parent("日報 (5/27)"));
    }

    #[test]
    fn metacharacters_in_label_are_literal() {
        let dotted = ParentMatcher::new("5.27").expect("pattern");
        assert!(!dotted.is_parent("📅 5/27 日報"));
        assert!(dotted.is_parent("📅 5.27 日報"));

        let bracketed = ParentMatcher::new("5/27(").expect("escaped pattern compiles");
        assert_eq!(bracketed.date_label(), "5/27(");
    }

    #[test]
    fn labels_with_punctuation_edges_match_their_own_parent() {
        for label in ["5/27(火)", "5/27(", "(5/27)", "[5/27]", "5/27"] {
            let matcher = ParentMatcher::new(label).expect("pattern");
            assert!(matcher.is_parent(&parent_message_text(label)), "label {label:?}");
        }

        let weekday = ParentMatcher::new("5/27(火)").expect("pattern");
        assert!(!weekday.is_parent("📅 15/27(火) 日報"));
    }

    #[test]
    fn japanese_text_next_to_label_is_a_boundary() {
        let matcher = ParentMatcher::new("5/27").expect("pattern");
        assert!(matcher.is_parent("5/27の日報"));
        assert!(matcher.is_parent("【日報】5/27分"));
        assert!(matcher.is_parent("日報5/27"));
        assert!(!matcher.is_parent("日報 5/27a"));
        assert!(!matcher.is_parent("日報 a5/27"));
    }
}

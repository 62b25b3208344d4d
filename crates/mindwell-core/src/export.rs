//! Wellness data export: profile snapshot, text report and CSV.
//!
//! Rendering is pure. Writing the file is left to the caller so the same
//! output can go to disk, stdout, or a test assertion.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use indoc::formatdoc;
use serde::{Deserialize, Serialize};

use crate::session::{plan_features, PlanTier, Session};
use crate::wellness::{Habit, MoodEntry};

const DAY_MS: i64 = 24 * 3600 * 1000;
const DEFAULT_NAME: &str = "User";
const DEFAULT_EMAIL: &str = "user@example.com";
const DEFAULT_JOIN_DATE: &str = "January 2025";

pub const MOOD_ENTRIES: &str = "Mood Entries";
pub const JOURNAL_ENTRIES: &str = "Journal Entries";
pub const HABITS_TRACKED: &str = "Habits Tracked";
pub const DAYS_ACTIVE: &str = "Days Active";

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
}

impl ExportFormat {
    /// File name for an export generated on `date`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        let day = date.format("%Y-%m-%d");
        match self {
            ExportFormat::Text => format!("mindwell-wellness-report-{day}.txt"),
            ExportFormat::Csv => format!("mindwell-wellness-data-{day}.csv"),
        }
    }

    pub fn render(&self, snapshot: &ProfileSnapshot, generated_on: DateTime<Utc>) -> String {
        match self {
            ExportFormat::Text => render_text_report(snapshot, generated_on),
            ExportFormat::Csv => render_csv(snapshot, generated_on),
        }
    }
}

/// One labelled figure on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    pub label: String,
    pub value: String,
}

/// Everything the export reports about the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub name: String,
    pub email: String,
    pub plan: PlanTier,
    pub member_since: String,
    pub join_date: String,
    pub stats: Vec<StatRow>,
}

impl ProfileSnapshot {
    /// Build the snapshot from local state.
    ///
    /// `journal_entries` is the server-side total, or 0 when offline. Days
    /// active counts days since joining (inclusive) when the join date is
    /// known, otherwise distinct days with a mood entry.
    pub fn build(
        session: &Session,
        moods: &[MoodEntry],
        habits: &[Habit],
        journal_entries: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let user = session.user();
        let joined = session.joined_at_ms();

        let days_active = match joined {
            Some(ms) => ((now.timestamp_millis() - ms).max(0) / DAY_MS + 1) as usize,
            None => {
                let mut days: Vec<i64> = moods
                    .iter()
                    .map(|m| m.created_at_epoch_ms.div_euclid(DAY_MS))
                    .collect();
                days.sort_unstable();
                days.dedup();
                days.len()
            }
        };

        Self {
            name: user
                .map(|u| u.username.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            email: user
                .map(|u| u.email.clone())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            plan: session.plan_at(now),
            member_since: member_since(joined, now),
            join_date: join_date(joined),
            stats: vec![
                stat(MOOD_ENTRIES, moods.len()),
                stat(JOURNAL_ENTRIES, journal_entries),
                stat(HABITS_TRACKED, habits.len()),
                stat(DAYS_ACTIVE, days_active),
            ],
        }
    }

    /// Value of the stat labelled `label`, or "0".
    pub fn stat(&self, label: &str) -> &str {
        self.stats
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.value.as_str())
            .unwrap_or("0")
    }
}

fn stat(label: &str, value: impl ToString) -> StatRow {
    StatRow {
        label: label.to_string(),
        value: value.to_string(),
    }
}

/// How long ago the user joined, in the profile's wording.
pub fn member_since(joined_at_ms: Option<i64>, now: DateTime<Utc>) -> String {
    let Some(joined) = joined_at_ms else {
        return "Recently".into();
    };
    let days = (now.timestamp_millis() - joined).abs() / DAY_MS;
    match days {
        0 => "Today".into(),
        1 => "Yesterday".into(),
        2..=6 => format!("{days} days"),
        7..=29 => plural(days / 7, "week"),
        30..=364 => plural(days / 30, "month"),
        _ => plural(days / 365, "year"),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Join month, e.g. "March 2025".
fn join_date(joined_at_ms: Option<i64>) -> String {
    joined_at_ms
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|at| at.format("%B %Y").to_string())
        .unwrap_or_else(|| DEFAULT_JOIN_DATE.to_string())
}

/// Long date, e.g. "October 16, 2026".
pub fn long_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// Plain-text wellness report.
pub fn render_text_report(snapshot: &ProfileSnapshot, generated_on: DateTime<Utc>) -> String {
    let plan = snapshot.plan.display_name();
    let stats = snapshot
        .stats
        .iter()
        .map(|s| format!("{}: {}", s.label, s.value))
        .collect::<Vec<_>>()
        .join("\n");
    let features = plan_features(snapshot.plan)
        .iter()
        .map(|f| format!("• {f}"))
        .collect::<Vec<_>>()
        .join("\n");

    formatdoc! {"
        MINDWELL - WELLNESS DATA EXPORT
        Generated on: {generated}

        USER PROFILE
        ============
        Name: {name}
        Email: {email}
        Plan: {plan}
        Member Since: {member_since}
        Join Date: {join_date}

        WELLNESS STATISTICS
        ==================
        {stats}

        DATA SUMMARY
        ===========
        • Mood Entries: {moods} entries tracked
        • Journal Entries: {journals} entries written
        • Habits Tracked: {habits} habits monitored
        • Days Active: {days} days on platform

        PLAN FEATURES
        ============
        {plan} Plan includes:
        {features}

        EXPORT INFORMATION
        =================
        This export contains your wellness data from MindWell.
        Data types included: Mood tracking, Journal entries, Habit progress, Meditation sessions

        For privacy and security:
        • Your data is encrypted and secure
        • This export is for your personal use only
        • Contact support if you need assistance

        ---
        Generated by MindWell Mental Wellness Platform",
        generated = long_date(generated_on),
        name = snapshot.name,
        email = snapshot.email,
        member_since = snapshot.member_since,
        join_date = snapshot.join_date,
        moods = snapshot.stat(MOOD_ENTRIES),
        journals = snapshot.stat(JOURNAL_ENTRIES),
        habits = snapshot.stat(HABITS_TRACKED),
        days = snapshot.stat(DAYS_ACTIVE),
        plan = plan,
        stats = stats,
        features = features,
    }
}

/// Two-column CSV: profile fields, then stats, then the export date.
pub fn render_csv(snapshot: &ProfileSnapshot, generated_on: DateTime<Utc>) -> String {
    let mut rows: Vec<(&str, String)> = vec![
        ("Name", snapshot.name.clone()),
        ("Email", snapshot.email.clone()),
        ("Plan", snapshot.plan.display_name().to_string()),
        ("Member Since", snapshot.member_since.clone()),
        ("Join Date", snapshot.join_date.clone()),
    ];
    rows.extend(snapshot.stats.iter().map(|s| (s.label.as_str(), s.value.clone())));
    rows.push(("Export Date", long_date(generated_on)));

    let mut out = String::from("Category,Value");
    for (category, value) in rows {
        out.push('\n');
        out.push_str(&csv_field(category));
        out.push(',');
        out.push_str(&csv_field(&value));
    }
    out
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot() -> ProfileSnapshot {
        ProfileSnapshot {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            plan: PlanTier::Free,
            member_since: "2 weeks".into(),
            join_date: "March 2025".into(),
            stats: vec![
                stat(MOOD_ENTRIES, 24),
                stat(JOURNAL_ENTRIES, 12),
                stat(HABITS_TRACKED, 5),
                stat(DAYS_ACTIVE, 14),
            ],
        }
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 29, 12, 0, 0).unwrap()
    }

    #[test]
    fn member_since_thresholds() {
        let now = generated();
        let ago = |d: i64| Some((now - Duration::days(d)).timestamp_millis());
        assert_eq!(member_since(None, now), "Recently");
        assert_eq!(member_since(ago(0), now), "Today");
        assert_eq!(member_since(ago(1), now), "Yesterday");
        assert_eq!(member_since(ago(3), now), "3 days");
        assert_eq!(member_since(ago(7), now), "1 week");
        assert_eq!(member_since(ago(20), now), "2 weeks");
        assert_eq!(member_since(ago(65), now), "2 months");
        assert_eq!(member_since(ago(800), now), "2 years");
    }

    #[test]
    fn csv_matches_snapshot() {
        let csv = render_csv(&snapshot(), generated());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Category,Value");
        assert_eq!(lines[1], "Name,Ada");
        assert_eq!(lines[3], "Plan,Free");
        assert!(lines.contains(&"Mood Entries,24"));
        assert!(lines.contains(&"Days Active,14"));
        assert_eq!(*lines.last().unwrap(), "Export Date,\"March 29, 2025\"");
        assert_eq!(lines.len(), 1 + 5 + 4 + 1);
    }

    #[test]
    fn csv_quotes_awkward_values() {
        let mut snap = snapshot();
        snap.name = "Lovelace, \"Ada\"".into();
        let csv = render_csv(&snap, generated());
        assert!(csv.contains("Name,\"Lovelace, \"\"Ada\"\"\""));
    }

    #[test]
    fn text_report_sections() {
        let text = render_text_report(&snapshot(), generated());
        assert!(text.starts_with("MINDWELL - WELLNESS DATA EXPORT\nGenerated on: March 29, 2025\n"));
        assert!(text.contains("WELLNESS STATISTICS\n==================\nMood Entries: 24\n"));
        assert!(text.contains("• Habits Tracked: 5 habits monitored"));
        assert!(text.contains("Free Plan includes:\n• Unlimited basic journaling"));
        assert!(text.ends_with("Generated by MindWell Mental Wellness Platform"));
    }

    #[test]
    fn file_names() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 29).unwrap();
        assert_eq!(ExportFormat::Text.file_name(day), "mindwell-wellness-report-2025-03-29.txt");
        assert_eq!(ExportFormat::Csv.file_name(day), "mindwell-wellness-data-2025-03-29.csv");
    }

    #[test]
    fn anonymous_snapshot_uses_defaults() {
        let snap = ProfileSnapshot::build(&Session::anonymous(), &[], &[], 0, generated());
        assert_eq!(snap.name, "User");
        assert_eq!(snap.email, "user@example.com");
        assert_eq!(snap.member_since, "Recently");
        assert_eq!(snap.join_date, "January 2025");
        assert_eq!(snap.stat(DAYS_ACTIVE), "0");
    }
}

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::context::{block_on, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum MoodAction {
    /// Log how you feel (1 = very sad .. 5 = very happy)
    Log {
        value: u8,
        /// Optional note (max 500 characters)
        #[arg(long, default_value = "")]
        note: String,
        /// Also send the entry to the server
        #[arg(long)]
        push: bool,
    },
    /// List logged moods, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Most common mood and averages
    Insights,
    /// Pull server history and merge it into local moods
    Sync {
        #[arg(long, default_value = "30")]
        days: u32,
    },
}

pub fn run(action: MoodAction) -> CliResult {
    let mut ctx = Context::load()?;

    match action {
        MoodAction::Log { value, note, push } => {
            let mut entry = ctx.tracker.log_mood(value, &note, Utc::now())?.clone();
            if push {
                let api = ctx.authed_api()?;
                let remote = block_on(api.log_mood(&entry))??;
                entry = ctx.tracker.link_remote_mood(&entry.id, &remote)?.clone();
            }
            print_json(&entry)?;
        }
        MoodAction::List { limit } => {
            let moods = ctx.tracker.moods();
            let shown = &moods[..limit.unwrap_or(moods.len()).min(moods.len())];
            let rows: Vec<_> = shown
                .iter()
                .map(|m| {
                    json!({
                        "id": m.id,
                        "date": m.date_label,
                        "mood": m.mood.value(),
                        "label": m.mood.label(),
                        "emoji": m.emoji(),
                        "note": m.note,
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        MoodAction::Insights => {
            print_json(&ctx.tracker.mood_insights(Utc::now()))?;
        }
        MoodAction::Sync { days } => {
            let api = ctx.authed_api()?;
            let remote = block_on(api.fetch_mood_history(days))??;
            let entries: Vec<_> = remote.iter().filter_map(|m| m.to_entry()).collect();
            let skipped = remote.len() - entries.len();
            let added = ctx.tracker.merge_remote_moods(entries);
            print_json(&json!({ "fetched": remote.len(), "added": added, "skipped": skipped }))?;
        }
    }
    Ok(())
}

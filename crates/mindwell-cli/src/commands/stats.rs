use chrono::Utc;
use clap::Subcommand;
use mindwell_core::stats::{best_streak, completed_today_count, mood_distribution};
use mindwell_core::wellness::MoodLevel;
use mindwell_core::{FeatureGate, PremiumFeature};
use serde_json::json;

use crate::context::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's habit progress and mood summary
    Today,
    /// Mood distribution and streaks (Premium)
    Analytics,
}

pub fn run(action: StatsAction) -> CliResult {
    let ctx = Context::load()?;
    let now = Utc::now();
    let habits = ctx.tracker.habits();

    match action {
        StatsAction::Today => {
            print_json(&json!({
                "completion_rate": ctx.tracker.completion_rate(),
                "completed_today": completed_today_count(habits),
                "total_habits": habits.len(),
                "best_streak": best_streak(habits),
                "mood": ctx.tracker.mood_insights(now),
            }))?;
        }
        StatsAction::Analytics => {
            FeatureGate::for_session(ctx.session(), now).check(&PremiumFeature::AdvancedAnalytics)?;
            let counts = mood_distribution(ctx.tracker.moods());
            let distribution: Vec<_> = MoodLevel::ALL
                .iter()
                .zip(counts)
                .map(|(level, count)| json!({ "mood": level.value(), "label": level.label(), "count": count }))
                .collect();
            let streaks: Vec<_> = habits
                .iter()
                .map(|h| json!({ "habit": h.name, "streak": h.streak_count, "progress": h.progress_percent }))
                .collect();
            print_json(&json!({
                "mood_distribution": distribution,
                "habit_streaks": streaks,
                "mood": ctx.tracker.mood_insights(now),
            }))?;
        }
    }
    Ok(())
}

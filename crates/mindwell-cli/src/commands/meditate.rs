use chrono::Utc;
use clap::Subcommand;
use mindwell_core::meditation::{format_clock, DURATION_CHOICES_MIN};
use mindwell_core::session::FREE_BREATHING_PATTERNS;
use mindwell_core::storage::keys;
use mindwell_core::{BreathingPattern, Event, FeatureGate, LocalStore, MeditationTimer, PremiumFeature};
use serde_json::json;

use crate::context::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum MeditateAction {
    /// Start a meditation session
    Start {
        /// Length in minutes (5, 10, 15, 20 or 30)
        #[arg(long, default_value = "5")]
        minutes: u32,
        /// Breathing pattern, e.g. 4-4-4-4, 4-7-8, 6-2-6-2
        #[arg(long, default_value = "4-4-4-4")]
        pattern: BreathingPattern,
    },
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Print the session state as JSON
    Status,
    /// Stop and rewind the session
    Reset,
    /// List breathing patterns and durations
    Patterns,
}

fn load_timer(store: &LocalStore) -> Option<MeditationTimer> {
    let json = store.kv_get(keys::MEDITATION_TIMER).ok()??;
    serde_json::from_str(&json).ok()
}

fn save_timer(store: &LocalStore, timer: &MeditationTimer) -> CliResult {
    let json = serde_json::to_string(timer)?;
    store.kv_set(keys::MEDITATION_TIMER, &json)?;
    Ok(())
}

fn print_event(event: &Event) -> CliResult {
    print_json(event)
}

pub fn run(action: MeditateAction) -> CliResult {
    let ctx = Context::load()?;
    let store = ctx.tracker.store();
    let now = Utc::now();

    if let MeditateAction::Patterns = action {
        let gate = FeatureGate::for_session(ctx.session(), now);
        let patterns: Vec<_> = BreathingPattern::presets()
            .iter()
            .map(|(pattern, label, description)| {
                let name = pattern.to_string();
                json!({
                    "pattern": name,
                    "label": label,
                    "description": description,
                    "free": FREE_BREATHING_PATTERNS.contains(&name.as_str()),
                    "available": gate.check(&PremiumFeature::BreathingPattern(name.clone())).is_ok(),
                })
            })
            .collect();
        return print_json(&json!({ "patterns": patterns, "durations_min": DURATION_CHOICES_MIN }));
    }

    if let MeditateAction::Start { minutes, pattern } = action {
        let gate = FeatureGate::for_session(ctx.session(), now);
        gate.check(&PremiumFeature::BreathingPattern(pattern.to_string()))?;
        gate.check(&PremiumFeature::MeditationLength { minutes })?;
        let mut timer = MeditationTimer::new(minutes, pattern)?;
        if let Some(event) = timer.start(now) {
            print_event(&event)?;
        }
        return save_timer(store, &timer);
    }

    let mut timer = load_timer(store).ok_or("no meditation session; run `mindwell-cli meditate start`")?;
    let event = match action {
        MeditateAction::Pause => timer.pause(now),
        MeditateAction::Resume => timer.resume(now),
        MeditateAction::Reset => timer.reset(now),
        _ => timer.tick(now),
    };
    if let Some(event) = &event {
        print_event(event)?;
    }
    if !matches!(event, Some(Event::MeditationReset { .. })) {
        let snapshot = timer.snapshot(now);
        print_event(&snapshot)?;
        eprintln!(
            "{} remaining - {}",
            format_clock(timer.remaining_ms() / 1000),
            timer.current_phase().prompt()
        );
    }
    save_timer(store, &timer)
}

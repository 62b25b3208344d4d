//! Daily affirmation, with a local fallback when the backend is unavailable.

use rand::seq::SliceRandom;

use crate::gateway::ApiClient;

pub const FALLBACK_AFFIRMATIONS: [&str; 7] = [
    "You are stronger than you think and capable of amazing things.",
    "Every small step forward is progress worth celebrating.",
    "You have the power to create positive change in your life.",
    "Your mental health journey is unique and valid.",
    "You deserve peace, happiness, and all good things.",
    "Today is a new opportunity to practice self-compassion.",
    "You are worthy of love and kindness, especially from yourself.",
];

/// A random entry from [`FALLBACK_AFFIRMATIONS`].
pub fn fallback_affirmation() -> &'static str {
    FALLBACK_AFFIRMATIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_AFFIRMATIONS[0])
}

/// Fetch today's affirmation. Any gateway failure falls back to a local one.
pub async fn daily_affirmation(client: &ApiClient) -> String {
    match client.fetch_affirmation().await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => fallback_affirmation().to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "affirmation unavailable; using local fallback");
            fallback_affirmation().to_string()
        }
    }
}

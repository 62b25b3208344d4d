//! Free vs Premium feature checks.

use chrono::{DateTime, Utc};

use super::{PlanTier, Session};
use crate::error::GateError;

/// Habits a Free account may track.
pub const FREE_HABIT_LIMIT: usize = 5;

/// Breathing patterns available without Premium.
pub const FREE_BREATHING_PATTERNS: [&str; 2] = ["4-4-4-4", "4-7-8"];

/// Longest meditation a Free account may start, in minutes.
const FREE_MEDITATION_MINUTES: u32 = 10;

/// Something only Premium unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PremiumFeature {
    /// Tracking a habit beyond the free allowance. Carries the current count.
    AdditionalHabit { current: usize },
    /// A breathing pattern outside [`FREE_BREATHING_PATTERNS`].
    BreathingPattern(String),
    /// Mood distribution and streak breakdowns.
    AdvancedAnalytics,
    /// A guided meditation session of this many minutes.
    MeditationLength { minutes: u32 },
}

/// Answers "may the current plan do this?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureGate {
    plan: PlanTier,
}

impl FeatureGate {
    pub fn new(plan: PlanTier) -> Self {
        Self { plan }
    }

    /// Gate for the session's effective plan at `now`.
    pub fn for_session(session: &Session, now: DateTime<Utc>) -> Self {
        Self::new(session.plan_at(now))
    }

    pub fn plan(&self) -> PlanTier {
        self.plan
    }

    pub fn check(&self, feature: &PremiumFeature) -> Result<(), GateError> {
        if self.plan == PlanTier::Premium {
            return Ok(());
        }
        match feature {
            PremiumFeature::AdditionalHabit { current } if *current >= FREE_HABIT_LIMIT => {
                Err(GateError::LimitReached {
                    what: "habits".into(),
                    limit: FREE_HABIT_LIMIT,
                })
            }
            PremiumFeature::AdditionalHabit { .. } => Ok(()),
            PremiumFeature::BreathingPattern(name) => {
                if FREE_BREATHING_PATTERNS.contains(&name.as_str()) {
                    Ok(())
                } else {
                    Err(GateError::PremiumRequired {
                        feature: format!("Breathing pattern {name}"),
                    })
                }
            }
            PremiumFeature::AdvancedAnalytics => Err(GateError::PremiumRequired {
                feature: "Advanced analytics".into(),
            }),
            PremiumFeature::MeditationLength { minutes } if *minutes > FREE_MEDITATION_MINUTES => {
                Err(GateError::PremiumRequired {
                    feature: format!("{minutes}-minute guided meditation"),
                })
            }
            PremiumFeature::MeditationLength { .. } => Ok(()),
        }
    }
}

/// Feature list shown on the plan comparison and in the text report.
pub fn plan_features(plan: PlanTier) -> &'static [&'static str] {
    match plan {
        PlanTier::Free => &[
            "Unlimited basic journaling",
            "Unlimited mood tracking",
            "5 habits tracking",
            "Basic sentiment analysis",
            "2 breathing patterns",
            "Crisis support resources",
        ],
        PlanTier::Premium => &[
            "Everything in Free",
            "Unlimited habits",
            "Advanced analytics",
            "Guided meditation library",
            "Export & backup data",
            "Professional integrations",
            "Priority support",
            "Custom themes",
        ],
    }
}

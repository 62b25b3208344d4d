//! Crisis support: hotline directory, grounding exercises and self-care
//! suggestions.
//!
//! Everything here is static content available on every plan, with or
//! without a login or a network connection.

use serde::Serialize;

/// How a contact is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    /// Round-the-clock crisis line.
    Emergency,
    /// Support, information and referrals.
    Support,
    /// Text-message line; `number` holds the texting instruction.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisContact {
    pub name: &'static str,
    pub number: &'static str,
    pub description: &'static str,
    pub kind: ContactKind,
}

impl CrisisContact {
    /// "Call" or "Text".
    pub fn action_label(&self) -> &'static str {
        match self.kind {
            ContactKind::Text => "Text",
            ContactKind::Emergency | ContactKind::Support => "Call",
        }
    }

    /// `tel:` URI with everything but digits and `+` stripped. Text lines
    /// have none.
    pub fn dial_uri(&self) -> Option<String> {
        if self.kind == ContactKind::Text {
            return None;
        }
        let digits: String = self
            .number
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        Some(format!("tel:{digits}"))
    }

    /// What to tell someone who picks this contact.
    pub fn instructions(&self) -> String {
        match self.dial_uri() {
            Some(uri) => format!("Call {} on {} ({uri})", self.name, self.number),
            None => format!(
                "To use {}: {}. This connects you to a crisis counselor by text message.",
                self.name, self.number
            ),
        }
    }
}

pub const CONTACTS: [CrisisContact; 5] = [
    CrisisContact {
        name: "Befrienders Kenya",
        number: "+254 722 178 177",
        description: "24/7 suicide prevention & emotional support",
        kind: ContactKind::Emergency,
    },
    CrisisContact {
        name: "Nairobi Women's Hospital",
        number: "+254 20 272 6000",
        description: "Mental health crisis support",
        kind: ContactKind::Emergency,
    },
    CrisisContact {
        name: "Kenya Red Cross",
        number: "+254 20 395 0000",
        description: "Emergency support & crisis intervention",
        kind: ContactKind::Support,
    },
    CrisisContact {
        name: "Mental Health Kenya",
        number: "+254 700 000 000",
        description: "Mental health information & referrals",
        kind: ContactKind::Support,
    },
    CrisisContact {
        name: "Crisis Text Line Kenya",
        number: "Text HOME to 741741",
        description: "Text-based crisis support",
        kind: ContactKind::Text,
    },
];

/// The line offered first in an emergency.
pub fn primary_contact() -> &'static CrisisContact {
    &CONTACTS[0]
}

/// The first text-message line.
pub fn text_contact() -> Option<&'static CrisisContact> {
    CONTACTS.iter().find(|c| c.kind == ContactKind::Text)
}

/// A grounding exercise: static instructions, read top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroundingExercise {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub steps: &'static [&'static str],
}

pub const GROUNDING_EXERCISES: [GroundingExercise; 3] = [
    GroundingExercise {
        id: "5-4-3-2-1",
        title: "5-4-3-2-1 Grounding",
        description: "Use your senses to stay present",
        steps: &[
            "Name 5 things you can see",
            "Name 4 things you can touch",
            "Name 3 things you can hear",
            "Name 2 things you can smell",
            "Name 1 thing you can taste",
        ],
    },
    GroundingExercise {
        id: "breathing",
        title: "4-7-8 Breathing",
        description: "Calm your nervous system",
        steps: &[
            "Breathe in for 4 counts",
            "Hold for 7 counts",
            "Breathe out for 8 counts",
            "Repeat 4 times",
        ],
    },
    GroundingExercise {
        id: "progressive",
        title: "Progressive Muscle Relaxation",
        description: "Release physical tension",
        steps: &[
            "Tense your toes for 5 seconds",
            "Release and feel the relaxation",
            "Move up to your calves",
            "Continue through your body",
            "End with your face and head",
        ],
    },
];

/// Look up an exercise by id, ignoring case.
pub fn grounding_exercise(id: &str) -> Option<&'static GroundingExercise> {
    GROUNDING_EXERCISES
        .iter()
        .find(|e| e.id.eq_ignore_ascii_case(id.trim()))
}

pub const SELF_CARE_STRATEGIES: [&str; 10] = [
    "Take a warm shower or bath",
    "Listen to calming music",
    "Call a trusted friend or family member",
    "Write in your journal",
    "Go for a walk outside",
    "Practice gentle stretching",
    "Watch a comforting movie",
    "Drink a cup of herbal tea",
    "Pet an animal if available",
    "Look at photos that make you smile",
];

/// Signs that call for immediate help.
pub const WARNING_SIGNS: [&str; 5] = [
    "Thoughts of suicide or self-harm",
    "Feeling like you're in immediate danger",
    "Severe panic attacks",
    "Complete inability to function",
    "Substance abuse as a coping mechanism",
];

pub const PROFESSIONAL_SUPPORT: [&str; 5] = [
    "Therapists and counselors",
    "Psychiatrists for medication",
    "Support groups",
    "Mental health apps",
    "Employee assistance programs",
];

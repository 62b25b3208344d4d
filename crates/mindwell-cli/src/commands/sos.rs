use clap::Subcommand;
use mindwell_core::crisis::{
    grounding_exercise, primary_contact, text_contact, CONTACTS, GROUNDING_EXERCISES, PROFESSIONAL_SUPPORT,
    SELF_CARE_STRATEGIES, WARNING_SIGNS,
};

use crate::context::{print_json, CliResult};

#[derive(Subcommand)]
pub enum SosAction {
    /// List crisis lines
    Contacts {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Walk through a grounding exercise
    Ground {
        /// Exercise id: 5-4-3-2-1, breathing or progressive
        #[arg(default_value = "5-4-3-2-1")]
        exercise: String,
        /// List the available exercises instead
        #[arg(long)]
        list: bool,
    },
    /// Small things that can help right now
    SelfCare,
    /// When to seek immediate help, and where
    Signs,
}

/// Needs no login, config or network.
pub fn run(action: Option<SosAction>) -> CliResult {
    match action {
        None => {
            let primary = primary_contact();
            println!("In crisis? Get immediate help. You're not alone.");
            println!("  {}", primary.instructions());
            if let Some(text) = text_contact() {
                println!("  {}", text.instructions());
            }
            println!("Run `mindwell-cli sos contacts` for more lines, `mindwell-cli sos ground` to steady yourself.");
        }
        Some(SosAction::Contacts { json }) => {
            if json {
                print_json(&CONTACTS)?;
            } else {
                for contact in &CONTACTS {
                    println!("{} [{}] {}", contact.name, contact.action_label(), contact.number);
                    println!("    {}", contact.description);
                }
            }
        }
        Some(SosAction::Ground { exercise, list }) => {
            if list {
                for e in &GROUNDING_EXERCISES {
                    println!("{:<12} {} - {}", e.id, e.title, e.description);
                }
                return Ok(());
            }
            let e = grounding_exercise(&exercise)
                .ok_or_else(|| format!("unknown exercise '{exercise}'; see `mindwell-cli sos ground --list`"))?;
            println!("{}: {}", e.title, e.description);
            for (i, step) in e.steps.iter().enumerate() {
                println!("  {}. {step}", i + 1);
            }
        }
        Some(SosAction::SelfCare) => {
            for idea in SELF_CARE_STRATEGIES {
                println!("- {idea}");
            }
        }
        Some(SosAction::Signs) => {
            println!("When to seek immediate help:");
            for sign in WARNING_SIGNS {
                println!("- {sign}");
            }
            println!("Professional support options:");
            for option in PROFESSIONAL_SUPPORT {
                println!("- {option}");
            }
        }
    }
    Ok(())
}

use chrono::Utc;
use clap::Subcommand;
use mindwell_core::wellness::habit_day_label;
use mindwell_core::{HabitCategory, HabitDraft};

use crate::context::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Start tracking a habit
    Add {
        name: String,
        /// wellness, mindfulness, physical or social
        #[arg(long, default_value = "wellness")]
        category: HabitCategory,
        #[arg(long, default_value = "1")]
        target: u32,
        #[arg(long, default_value = "times")]
        unit: String,
    },
    /// List tracked habits
    List,
    /// Mark a habit done (or undone) for today
    Toggle {
        id: String,
        /// Day to toggle (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Stop tracking a habit
    Delete { id: String },
}

pub fn run(action: HabitAction) -> CliResult {
    let mut ctx = Context::load()?;

    match action {
        HabitAction::Add {
            name,
            category,
            target,
            unit,
        } => {
            let draft = HabitDraft::new(name, category).with_target(target, unit);
            let habit = ctx.tracker.add_habit(draft, Utc::now())?;
            print_json(habit)?;
        }
        HabitAction::List => {
            print_json(ctx.tracker.habits())?;
        }
        HabitAction::Toggle { id, date } => {
            let today = date.unwrap_or_else(|| habit_day_label(Utc::now()));
            let habit = ctx.tracker.toggle_habit(&id, &today)?;
            print_json(habit)?;
        }
        HabitAction::Delete { id } => {
            let removed = ctx.tracker.delete_habit(&id)?;
            println!("Deleted habit: {}", removed.name);
        }
    }
    Ok(())
}

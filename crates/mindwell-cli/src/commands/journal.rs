use clap::Subcommand;
use mindwell_core::ValidationError;

use crate::context::{block_on, print_json, CliResult, Context};

const MAX_TITLE_CHARS: usize = 200;

#[derive(Subcommand)]
pub enum JournalAction {
    /// List journal entries
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "10")]
        per_page: u32,
    },
    /// Write a journal entry; the server tags it with a sentiment
    Write { title: String, content: String },
}

pub fn run(action: JournalAction) -> CliResult {
    let ctx = Context::load()?;
    let api = ctx.authed_api()?;

    match action {
        JournalAction::List { page, per_page } => {
            let page = block_on(api.fetch_journal_entries(page, per_page))??;
            print_json(&page)?;
        }
        JournalAction::Write { title, content } => {
            let title = title.trim();
            if title.is_empty() {
                return Err(ValidationError::Required("title".into()).into());
            }
            if content.trim().is_empty() {
                return Err(ValidationError::Required("content".into()).into());
            }
            let len = title.chars().count();
            if len > MAX_TITLE_CHARS {
                return Err(ValidationError::TooLong {
                    field: "title".into(),
                    max: MAX_TITLE_CHARS,
                    len,
                }
                .into());
            }
            let entry = block_on(api.create_journal_entry(title, content.trim()))??;
            print_json(&entry)?;
        }
    }
    Ok(())
}

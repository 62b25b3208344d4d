use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, ValueEnum};
use mindwell_core::{ExportFormat, ProfileSnapshot};

use crate::context::{block_on, CliResult, Context};

#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Csv,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => ExportFormat::Text,
            Format::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
    /// Directory to write into (defaults to the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Print to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,
}

pub fn run(args: ExportArgs) -> CliResult {
    let ctx = Context::load()?;
    let now = Utc::now();
    let format = ExportFormat::from(args.format);

    let journal_entries = journal_total(&ctx);
    let snapshot = ProfileSnapshot::build(
        ctx.session(),
        ctx.tracker.moods(),
        ctx.tracker.habits(),
        journal_entries,
        now,
    );
    let content = format.render(&snapshot, now);

    if args.stdout {
        println!("{content}");
        return Ok(());
    }
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(format.file_name(now.date_naive()));
    std::fs::write(&path, content)?;
    println!("Exported to {}", path.display());
    Ok(())
}

/// Server-side journal count; 0 when logged out or unreachable.
fn journal_total(ctx: &Context) -> u64 {
    if !ctx.session().is_authenticated() {
        return 0;
    }
    let result = ctx
        .api()
        .and_then(|api| block_on(api.fetch_journal_entries(1, 1)));
    match result {
        Ok(Ok(page)) => page.total,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "journal count unavailable");
            0
        }
        Err(e) => {
            tracing::warn!(error = %e, "journal count unavailable");
            0
        }
    }
}

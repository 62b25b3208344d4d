use clap::{CommandFactory, Parser, Subcommand};
use mindwell_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "mindwell-cli", version, about = "MindWell CLI")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mood tracking
    Mood {
        #[command(subcommand)]
        action: commands::mood::MoodAction,
    },
    /// Habit tracking
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Wellness statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Account login, registration and email verification
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Premium subscription
    Payment {
        #[command(subcommand)]
        action: commands::payment::PaymentAction,
    },
    /// Anonymous community posts
    Community {
        #[command(subcommand)]
        action: commands::community::CommunityAction,
    },
    /// Crisis lines, grounding exercises and self-care ideas
    Sos {
        #[command(subcommand)]
        action: Option<commands::sos::SosAction>,
    },
    /// Guided meditation timer
    Meditate {
        #[command(subcommand)]
        action: commands::meditate::MeditateAction,
    },
    /// Export a wellness report
    Export(commands::export::ExportArgs),
    /// Print today's affirmation
    Affirmation,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Delete all local data, including the login
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("MINDWELL_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| {
                let fallback = Config::load()
                    .map(|cfg| cfg.default_log_filter())
                    .unwrap_or("warn");
                EnvFilter::new(fallback)
            })
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Mood { action } => commands::mood::run(action),
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Journal { action } => commands::journal::run(action),
        Commands::Payment { action } => commands::payment::run(action),
        Commands::Community { action } => commands::community::run(action),
        Commands::Sos { action } => commands::sos::run(action),
        Commands::Meditate { action } => commands::meditate::run(action),
        Commands::Export(args) => commands::export::run(args),
        Commands::Affirmation => commands::affirmation::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Reset { yes } => commands::reset::run(yes),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mindwell-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

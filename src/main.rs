use anyhow::Result;
use clap::{Parser, Subcommand};
use handin::commands::{access, check, validate};
use handin::settings::Settings;
use handin::utils;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "handin")]
#[command(about = "Course handin checking and administration CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the course settings TOML (defaults target the production
    /// course tree)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every student's handin against an assignment checklist
    Check {
        /// Assignment identifier, e.g. hw8 (matched case-insensitively)
        assignment: String,

        /// Roster file with one student ID per line (defaults to the
        /// course roster)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Check only these student IDs instead of the roster
        #[arg(long, num_args = 1..)]
        students: Vec<String>,

        /// Skip compilation checks (existence checks still run)
        #[arg(long)]
        no_compile: bool,
    },

    /// Check the current directory against an assignment checklist
    SelfCheck {
        /// Assignment identifier, e.g. hw8 (matched case-insensitively)
        assignment: String,

        /// Skip compilation checks (existence checks still run)
        #[arg(long)]
        no_compile: bool,

        /// Accept the handin even when checks fail
        #[arg(short, long)]
        force: bool,
    },

    /// Create student handin directories and open them for writing
    Open {
        /// Roster file with one student ID per line (defaults to the
        /// course roster)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Operate only on these student IDs instead of the roster
        #[arg(long, num_args = 1..)]
        students: Vec<String>,

        /// Print the permission commands without running them
        #[arg(long)]
        dry_run: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Close student handin directories (student access drops to read-only)
    Close {
        /// Roster file with one student ID per line (defaults to the
        /// course roster)
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Operate only on these student IDs instead of the roster
        #[arg(long, num_args = 1..)]
        students: Vec<String>,

        /// Print the permission commands without running them
        #[arg(long)]
        dry_run: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate an assignment config JSON without running any checks
    ValidateConfig {
        /// Path to a <assignment>_cfg.json file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    utils::install_cleanup_panic_hook();
    // Destructors don't run on interrupt; sweep scratch state by hand.
    let _ = ctrlc::set_handler(|| {
        utils::cleanup_scratch();
        utils::reset_terminal();
        std::process::exit(130);
    });

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Check {
            assignment,
            roster,
            students,
            no_compile,
        } => check::execute(&settings, &assignment, roster, students, no_compile),
        Commands::SelfCheck {
            assignment,
            no_compile,
            force,
        } => match check::execute_self(&settings, &assignment, no_compile, force) {
            Ok(true) => Ok(()),
            Ok(false) => {
                utils::cleanup_scratch();
                std::process::exit(1);
            }
            Err(e) => Err(e),
        },
        Commands::Open {
            roster,
            students,
            dry_run,
            verbose,
        } => access::open(&settings, roster, students, dry_run, verbose),
        Commands::Close {
            roster,
            students,
            dry_run,
            verbose,
        } => access::close(&settings, roster, students, dry_run, verbose),
        Commands::ValidateConfig { path } => validate::execute(&path),
    };

    utils::cleanup_scratch();
    result
}

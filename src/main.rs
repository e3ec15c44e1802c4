use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use spellwatch::checker::dictionary::DictionaryError;
use spellwatch::config::Overrides;
use spellwatch::{cli, dict, ui, Config, Session, SpellChecker};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spellwatch")]
#[command(version, about = "System-wide spell checking while you type", long_about = None)]
struct Cli {
    /// Language/dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long)]
    language: Option<String>,

    /// Shortest word that gets checked (2-10)
    #[arg(short, long, value_name = "N")]
    min_length: Option<usize>,

    /// Personal dictionary file (one word per line)
    #[arg(long)]
    personal_dict: Option<PathBuf>,

    /// Config file to use instead of ./.spellwatch.toml
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log debug details (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download a dictionary
    Download {
        /// Language code (e.g., en_US, en_GB)
        language: String,
    },
    /// Update all dictionaries
    Update,
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellwatch", &mut io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose)?;

    let colored_output = !cli.no_color;
    if !colored_output {
        colored::control::set_override(false);
    }

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command);
    }

    let config = Config::load(Overrides {
        language: cli.language,
        personal_dictionary: cli.personal_dict,
        min_word_length: cli.min_length,
        config_file: cli.config,
    })?;

    cli::output::print_banner(&config.language, config.min_word_length, colored_output);
    if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        cli::output::print_hook_warning(
            "Wayland sessions may block global keyboard hooks; run under X11 if no words show up.",
            colored_output,
        );
    }

    let checker = match SpellChecker::new(&config) {
        Ok(checker) => checker,
        Err(e) => match e.downcast_ref::<DictionaryError>() {
            Some(DictionaryError::NotInstalled { .. }) => {
                cli::output::print_missing_dictionary(&config.language, colored_output);
                std::process::exit(1);
            }
            _ => return Err(e),
        },
    };

    let session = Session::new(checker, &config);
    let stats = session.stats();

    ui::run(session, &config)?;

    cli::output::print_session_summary(&stats, colored_output);
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "spellwatch=debug" } else { "spellwatch=info" };
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_dictionaries()?;
            }
            DictCommands::Download { language } => {
                dict::manager::download_dictionary(&language)?;
            }
            DictCommands::Update => {
                dict::manager::update_dictionaries()?;
            }
            DictCommands::Info { language } => {
                dict::manager::show_info(&language)?;
            }
        },
    }
    Ok(())
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use vertrans::app_config::{self, Config, VerificationProvider};
use vertrans::app_controller::{Controller, RunMode, ensure_mode};
use vertrans::verification::VerifyModule;

/// CLI Wrapper for VerificationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    Anthropic,
}

impl From<CliProvider> for VerificationProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ollama => VerificationProvider::Ollama,
            CliProvider::Anthropic => VerificationProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by the verify and enrich commands
#[derive(Args, Debug)]
struct CommonArgs {
    /// Section JSON file, or a directory scanned recursively for *.json
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Judgment provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use for judgments
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ko')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Report results without writing files
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Modules to run, comma separated (formula,semantic,logic,research)
    #[arg(long, value_delimiter = ',')]
    modules: Option<Vec<String>>,

    /// Also attach enrichment notes
    #[arg(long)]
    enrich: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify translated sections and store the reports
    Verify(VerifyArgs),

    /// Attach explanatory notes for key concepts
    Enrich(CommonArgs),

    /// Generate shell completions for vertrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// vertrans - translation quality verification
#[derive(Parser, Debug)]
#[command(name = "vertrans")]
#[command(version)]
#[command(about = "Quality verification for machine-translated technical text")]
#[command(long_about = "vertrans scores translated sections for formula integrity, meaning preservation,
logical consistency and external corroboration, and can attach concept notes for readers.

EXAMPLES:
    vertrans verify chapter1/                   # Verify every section file below chapter1/
    vertrans verify s1.json --modules formula   # Formula check only
    vertrans verify s1.json --enrich --dry-run  # Verify and enrich, print without saving
    vertrans enrich chapter1/                   # Enrichment only
    vertrans completions bash > vertrans.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vertrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Verify(args) => {
            let modules = args
                .modules
                .map(|names| {
                    names
                        .iter()
                        .map(|name| name.parse::<VerifyModule>())
                        .collect::<Result<Vec<_>>>()
                })
                .transpose()?;
            let mode = RunMode {
                verify: true,
                enrich: args.enrich,
                dry_run: args.common.dry_run,
            };
            run(args.common, modules, mode).await
        }
        Commands::Enrich(common) => {
            let mode = RunMode {
                dry_run: common.dry_run,
                ..RunMode::enrich()
            };
            run(common, None, mode).await
        }
    }
}

fn load_config(options: &CommonArgs, modules: Option<Vec<VerifyModule>>) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.verification.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.verification.active_provider_config_mut().model = model.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(modules) = modules {
        config.verification.modules = modules;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run(options: CommonArgs, modules: Option<Vec<VerifyModule>>, mode: RunMode) -> Result<()> {
    // Apply a command line log level before the config is read
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    ensure_mode(mode)?;
    let config = load_config(&options, modules)?;
    log::set_max_level(config.log_level.to_level_filter());

    info!(
        "{} {} -> {} with {}",
        if mode.verify { "Verifying" } else { "Enriching" },
        config.source_language,
        config.target_language,
        config.verification.get_model()
    );
    if mode.dry_run {
        warn!("Dry run: section files will not be modified");
    }

    let controller = Controller::with_config(config)?;
    controller.test_connection().await?;
    controller.run(&options.path, mode).await?;
    Ok(())
}

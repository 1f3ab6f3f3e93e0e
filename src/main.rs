// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use roundtrip::app_config::{self, Config, GatewayConfig, GatewayProvider};
use roundtrip::language_catalog::LanguageCatalog;
use roundtrip::providers::backend::BackendGateway;
use roundtrip::providers::google::GoogleTranslator;
use roundtrip::providers::mock::MockTranslator;
use roundtrip::telemetry::{LogTracer, OperationTracer, RecordingTracer};
use roundtrip::translation::{
    Orchestrator, OrchestratorConfig, RoundTripGateway, Run, RunOutcome, RunStatus, StepStatus,
    TranslationGateway,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// CLI Wrapper for GatewayProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGatewayProvider {
    Mock,
    Backend,
    Google,
}

impl From<CliGatewayProvider> for GatewayProvider {
    fn from(cli_provider: CliGatewayProvider) -> Self {
        match cli_provider {
            CliGatewayProvider::Mock => GatewayProvider::Mock,
            CliGatewayProvider::Backend => GatewayProvider::Backend,
            CliGatewayProvider::Google => GatewayProvider::Google,
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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a multi-step round-trip translation (default command)
    Translate(TranslateArgs),

    /// List the intermediate language catalogue
    Languages {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: PathBuf,
    },

    /// Generate shell completions for roundtrip
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct RunOptions {
    /// Number of chained round trips, within the configured repeat count bounds
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Translation gateway to use
    #[arg(short, long, value_enum, env = "ROUNDTRIP_PROVIDER")]
    provider: Option<CliGatewayProvider>,

    /// Gateway endpoint URL
    #[arg(short, long, env = "ROUNDTRIP_API_URL")]
    endpoint: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Skip the pause between steps
    #[arg(long)]
    no_delay: bool,

    /// Print the final run as JSON
    #[arg(long)]
    json: bool,

    /// Print a per-operation timing summary after the run
    #[arg(long)]
    trace_summary: bool,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Text to translate
    #[arg(value_name = "TEXT")]
    text: String,

    #[command(flatten)]
    options: RunOptions,
}

/// roundtrip - Multi-step round-trip translation
///
/// Sends text through a random intermediate language and back, feeding each
/// result into the next step.
#[derive(Parser, Debug)]
#[command(name = "roundtrip")]
#[command(version = "0.1.0")]
#[command(about = "Multi-step round-trip translation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "roundtrip translates text into an intermediate language and back, several times in a row.

EXAMPLES:
    roundtrip \"Hello\"                          # Translate with the default config
    roundtrip -n 3 \"Hello\"                     # Chain three round trips
    roundtrip -p backend -e http://host:8080 \"Hello\"
    roundtrip --json --no-delay \"Hello\"        # Print the final run as JSON
    roundtrip languages                        # List intermediate languages
    roundtrip completions bash > roundtrip.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    mock    - Offline fixed phrases (default)
    backend - Remote round-trip service (POST /api/translate)
    google  - Google Cloud Translation (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text to translate
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    #[command(flatten)]
    options: RunOptions,
}

// Custom logger writing coloured, timestamped lines to stderr.
// Filtering follows the global max level so it can change after init.
struct CustomLogger;

impl CustomLogger {
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, label) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the level is refined once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "roundtrip", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Languages { config_path }) => list_languages(&config_path),
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            let text = cli
                .text
                .ok_or_else(|| anyhow!("TEXT is required when no subcommand is specified"))?;
            run_translate(TranslateArgs {
                text,
                options: cli.options,
            })
            .await
        }
    }
}

fn load_config(options: &RunOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.gateway.provider = provider.clone().into();
    }
    if let Some(endpoint) = &options.endpoint {
        config.gateway.endpoint = endpoint.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if options.no_delay {
        config.orchestration.step_delay_ms = 0;
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn build_gateway(config: &GatewayConfig) -> Arc<dyn TranslationGateway> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let catalog = || LanguageCatalog::load_or_default(config.languages_file.as_deref());

    match config.provider {
        GatewayProvider::Mock => Arc::new(RoundTripGateway::new(
            Arc::new(MockTranslator::new()),
            catalog(),
            config.target_language.clone(),
        )),
        GatewayProvider::Backend => Arc::new(BackendGateway::new(config.get_endpoint(), timeout)),
        GatewayProvider::Google => Arc::new(RoundTripGateway::new(
            Arc::new(GoogleTranslator::new(
                config.api_key.clone(),
                config.get_endpoint(),
                timeout,
            )),
            catalog(),
            config.target_language.clone(),
        )),
    }
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let options = args.options;

    // Apply command line log level before anything is logged
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options)?;
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let count = match options.count {
        Some(count) => usize::try_from(count).context("Repeat count out of range")?,
        None => config.orchestration.default_repeat_count,
    };

    info!(
        "roundtrip: {} gateway, {} step(s) back to '{}'",
        config.gateway.provider.display_name(),
        count,
        config.gateway.target_language
    );

    let recorder = options.trace_summary.then(|| RecordingTracer::new().with_log_output());
    let tracer: Arc<dyn OperationTracer> = match &recorder {
        Some(recorder) => Arc::new(recorder.clone()),
        None => Arc::new(LogTracer::new()),
    };

    let orchestrator = Orchestrator::new(
        build_gateway(&config.gateway),
        tracer,
        OrchestratorConfig::from(&config.orchestration),
    );

    let outcome = drive_with_progress(&orchestrator, args.text, count, tokio::signal::ctrl_c).await?;
    let run = orchestrator.snapshot();

    if options.json {
        let rendered = serde_json::to_string_pretty(&run).context("Failed to serialize run to JSON")?;
        println!("{}", rendered);
    } else {
        print_run(&run);
    }

    if let Some(recorder) = &recorder {
        eprintln!("{}", recorder.summary());
    }

    match outcome {
        Ok(RunOutcome::Completed { .. }) => Ok(()),
        Ok(RunOutcome::Abandoned) => Err(anyhow!("Run was cancelled")),
        Err(e) => Err(e.into()),
    }
}

/// Run to completion while drawing progress; each interrupt resets the run
async fn drive_with_progress<I, F>(
    orchestrator: &Orchestrator,
    text: String,
    count: usize,
    mut interrupt: I,
) -> Result<Result<RunOutcome, roundtrip::OrchestrationError>>
where
    I: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    let progress_bar = ProgressBar::new(count as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} steps {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));

    let runner = orchestrator.clone();
    let mut task = tokio::spawn(async move { runner.run(&text, count).await });

    // One listener spans every poll tick; re-armed after each interrupt
    let signal = interrupt();
    tokio::pin!(signal);
    let mut listening = true;

    let result = loop {
        tokio::select! {
            joined = &mut task => break joined.context("Translation task failed")?,
            received = &mut signal, if listening => match received {
                Ok(()) => {
                    warn!("Interrupted, resetting run");
                    orchestrator.reset();
                    signal.set(interrupt());
                }
                Err(e) => {
                    warn!("Could not listen for interrupts: {}", e);
                    listening = false;
                }
            },
            _ = tokio::time::sleep(POLL_INTERVAL) => {
                let run = orchestrator.snapshot();
                progress_bar.set_position(run.completed_count() as u64);
                progress_bar.set_message(run.status_display());
            }
        }
    };

    let run = orchestrator.snapshot();
    progress_bar.set_position(run.completed_count() as u64);
    progress_bar.finish_and_clear();
    debug!("{}", run);

    Ok(result)
}

fn print_run(run: &Run) {
    for step in &run.steps {
        match step.status {
            StepStatus::Completed => {
                println!("Step {}: {}", step.id, step.input_text);
                println!("  via {}: {}", step.intermediate_language, step.intermediate_text);
                println!("  => {}", step.final_text);
            }
            StepStatus::Failed => {
                let reason = run.failure.as_ref().map(|f| f.reason.as_str()).unwrap_or("unknown error");
                println!("Step {}: {}", step.id, step.input_text);
                println!("  failed: {}", reason);
            }
            StepStatus::Pending | StepStatus::InProgress => {
                println!("Step {}: skipped", step.id);
            }
        }
    }

    match (&run.overall_status, &run.final_text) {
        (RunStatus::Completed, Some(final_text)) => println!("\nFinal: {}", final_text),
        _ => println!("\n{}", run.status_display()),
    }
}

fn list_languages(config_path: &Path) -> Result<()> {
    let config = Config::load_or_create(config_path)?;
    let catalog = LanguageCatalog::load_or_default(config.gateway.languages_file.as_deref());

    for language in catalog.languages() {
        let official = if language.is_official { "" } else { " (unofficial)" };
        println!("{:<4} {} / {}{}", language.code, language.name, language.native_name, official);
    }
    Ok(())
}

// crates/auth-e2e-cli/src/main.rs
// ============================================================================
// Module: Auth E2E CLI Entry Point
// Description: Command dispatcher for harness runs, readiness waits, listing.
// Purpose: Run the end-to-end catalog against a live auth service.
// Dependencies: clap, auth-e2e-core, thiserror, tokio, tracing-subscriber.
// ============================================================================

//! ## Overview
//! `auth-e2e run` loads configuration from the environment, applies flag
//! overrides, runs the selected scenarios, and writes run artifacts.
//! `auth-e2e wait` runs the readiness gate alone. `auth-e2e list` prints the
//! catalog. Logs go to stderr; command output goes to stdout.
//!
//! Exit codes: 0 when every scenario passed or skipped, 1 when any scenario
//! failed, 2 when the target never became ready, 3 for configuration or
//! output errors.


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use auth_e2e_core::AuthApiClient;
use auth_e2e_core::HarnessConfig;
use auth_e2e_core::PageErrorPolicy;
use auth_e2e_core::RunArtifacts;
use auth_e2e_core::RunError;
use auth_e2e_core::RunReport;
use auth_e2e_core::Runner;
use auth_e2e_core::RunnerPolicy;
use auth_e2e_core::ScenarioContext;
use auth_e2e_core::SuiteFilter;
use auth_e2e_core::report::default_run_root;
use auth_e2e_core::suites;
use auth_e2e_core::wait_until_ready;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use url::Url;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// At least one scenario failed.
const EXIT_SCENARIO_FAILURE: u8 = 1;
/// The readiness gate failed.
const EXIT_UNAVAILABLE: u8 = 2;
/// Configuration or output failure.
const EXIT_CONFIG: u8 = 3;
/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "auth-e2e", version, about = "End-to-end checks for the auth service")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scenario catalog.
    Run(RunCommand),
    /// Wait for the target to become ready, then exit.
    Wait(WaitCommand),
    /// List catalog scenarios.
    List(ListCommand),
}

/// Log output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Suite selection flag.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum SuiteArg {
    /// API scenarios.
    Api,
    /// UI scenarios.
    Ui,
    /// Both suites.
    All,
}

impl From<SuiteArg> for SuiteFilter {
    fn from(value: SuiteArg) -> Self {
        match value {
            SuiteArg::Api => Self::Api,
            SuiteArg::Ui => Self::Ui,
            SuiteArg::All => Self::All,
        }
    }
}

/// Target overrides shared by `run` and `wait`.
#[derive(Args, Debug, Default)]
struct TargetArgs {
    /// Service base URL for both the API and UI (overrides the environment).
    #[arg(long, value_name = "URL")]
    base_url: Option<Url>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    #[command(flatten)]
    target: TargetArgs,
    /// Suite to run.
    #[arg(long, value_enum, default_value_t = SuiteArg::All)]
    suite: SuiteArg,
    /// Only run scenarios whose name contains this text.
    #[arg(long, value_name = "TEXT")]
    filter: Option<String>,
    /// WebDriver endpoint for UI scenarios.
    #[arg(long, value_name = "URL")]
    webdriver_url: Option<Url>,
    /// Maximum concurrent scenarios.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    workers: Option<u16>,
    /// Retries per failing scenario.
    #[arg(long, value_name = "N")]
    retries: Option<u32>,
    /// Artifact directory (defaults to target/auth-e2e/run_<ms>).
    #[arg(long, value_name = "DIR")]
    run_root: Option<PathBuf>,
    /// Fail UI scenarios on uncaught page-script errors.
    #[arg(long, action = ArgAction::SetTrue)]
    fail_on_page_errors: bool,
}

/// Arguments for `wait`.
#[derive(Args, Debug)]
struct WaitCommand {
    #[command(flatten)]
    target: TargetArgs,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Suite to list.
    #[arg(long, value_enum, default_value_t = SuiteArg::All)]
    suite: SuiteArg,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<auth_e2e_core::ConfigError> for CliError {
    fn from(err: auth_e2e_core::ConfigError) -> Self {
        Self::new(format!("invalid configuration: {err}"))
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    match dispatch(cli.command).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string(), EXIT_CONFIG),
    }
}

/// Installs the global subscriber; logs go to stderr.
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let text = (format == LogFormat::Text)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json = (format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let _ = tracing_subscriber::registry().with(filter).with(text).with(json).try_init();
}

/// Executes one subcommand.
async fn dispatch(command: Command) -> CliResult<ExitCode> {
    match command {
        Command::Run(args) => run_command(args).await,
        Command::Wait(args) => wait_command(args).await,
        Command::List(args) => list_command(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

async fn run_command(args: RunCommand) -> CliResult<ExitCode> {
    let mut config = apply_target(HarnessConfig::load()?, &args.target);
    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = Some(url.clone());
    }
    let policy = runner_policy(&config, &args);
    let scenarios = suites::select(args.suite.into(), args.filter.as_deref());
    if scenarios.is_empty() {
        return Err(CliError::new("no scenarios match the requested suite and filter"));
    }

    let api = AuthApiClient::new(config.auth_base_url.clone(), config.request_timeout)?;
    let page_errors =
        if args.fail_on_page_errors { PageErrorPolicy::Fail } else { PageErrorPolicy::Suppress };
    let context = ScenarioContext::new(api.clone(), config.user_factory())
        .with_ui_base_url(config.base_url.clone())
        .with_app_base_url(config.app_base_url.clone())
        .with_page_errors(page_errors);
    let context = attach_browser(context, config.webdriver_url.as_ref());

    let report = match Runner::new(policy).run(Arc::new(context), scenarios).await {
        Ok(report) => report,
        Err(RunError::ServiceUnavailable(err)) => {
            return Ok(emit_error(&err.to_string(), EXIT_UNAVAILABLE));
        }
        Err(err) => return Err(CliError::new(err.to_string())),
    };

    let root = args.run_root.or(config.run_root).unwrap_or_else(default_run_root);
    let written = RunArtifacts::create(&root)
        .and_then(|artifacts| artifacts.write_run(&report, &api.transcript()))
        .map_err(|err| CliError::new(format!("failed to write artifacts to {}: {err}", root.display())))?;
    write_stdout_line(&summary_line(&report)).map_err(output_error)?;
    write_stdout_line(&format!("summary: {}", written.summary_markdown.display()))
        .map_err(output_error)?;
    Ok(ExitCode::from(exit_status_for(&report)))
}

async fn wait_command(args: WaitCommand) -> CliResult<ExitCode> {
    let config = apply_target(HarnessConfig::load()?, &args.target);
    let api = AuthApiClient::new(config.auth_base_url.clone(), config.request_timeout)?;
    match wait_until_ready(&api, config.readiness).await {
        Ok(state) => {
            write_stdout_line(&format!(
                "{} ready after {} attempt(s)",
                config.auth_base_url, state.attempts_made
            ))
            .map_err(output_error)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(emit_error(&err.to_string(), EXIT_UNAVAILABLE)),
    }
}

fn list_command(args: &ListCommand) -> CliResult<ExitCode> {
    for scenario in suites::select(args.suite.into(), None) {
        write_stdout_line(&format!("{}\t{}", scenario.suite(), scenario.name()))
            .map_err(output_error)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies a `--base-url` override to both API and UI targets.
fn apply_target(config: HarnessConfig, target: &TargetArgs) -> HarnessConfig {
    match &target.base_url {
        Some(url) => config.with_target(url.clone()),
        None => config,
    }
}

/// Resolves the runner policy from CI mode, readiness bounds, and flags.
fn runner_policy(config: &HarnessConfig, args: &RunCommand) -> RunnerPolicy {
    let mut policy = config.runner_policy();
    if let Some(workers) = args.workers {
        policy.workers = usize::from(workers);
    }
    if let Some(retries) = args.retries {
        policy.retries = retries;
    }
    policy
}

#[cfg(feature = "webdriver")]
fn attach_browser(context: ScenarioContext, webdriver_url: Option<&Url>) -> ScenarioContext {
    match webdriver_url {
        Some(url) => context
            .with_browser(Arc::new(auth_e2e_core::WebDriverLauncher::new(url.clone()))),
        None => context,
    }
}

#[cfg(not(feature = "webdriver"))]
fn attach_browser(context: ScenarioContext, webdriver_url: Option<&Url>) -> ScenarioContext {
    if webdriver_url.is_some() {
        tracing::warn!("built without the webdriver feature; UI scenarios will be skipped");
    }
    context
}

/// One-line run outcome.
fn summary_line(report: &RunReport) -> String {
    format!(
        "{}: {} passed, {} failed, {} skipped",
        if report.is_success() { "PASS" } else { "FAIL" },
        report.counts.passed,
        report.counts.failed,
        report.counts.skipped
    )
}

/// Maps a finished run to the process exit status.
const fn exit_status_for(report: &RunReport) -> u8 {
    if report.is_success() { 0 } else { EXIT_SCENARIO_FAILURE }
}

fn output_error(err: std::io::Error) -> CliError {
    CliError::new(format!("failed to write to stdout: {err}"))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns `code`.
fn emit_error(message: &str, code: u8) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(code)
}

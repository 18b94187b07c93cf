use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intperf::app::{App, SessionOutcome, TerminalKeys};
use intperf::cli::{get_version, Cli};
use intperf::core::recorder::resolve_log_path;
use intperf::core::{
    CommandSource, InterfaceGroups, MonitorError, SampleRecorder, SessionConfig, SimulatedSource,
    SnapshotSource,
};
use intperf::screens::{MonitorScreen, Theme};
use intperf::utils::AppConfig;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(directory: &Path) {
    // Daily rotated file; stdout belongs to the dashboard
    let file_appender = rolling::daily(directory, "intperf.log");
    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    // Default to `info` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if !cli.no_trace {
        let directory = app_config.trace_directory();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create log directory {}", directory.display()))?;
        init_logging(&directory);
    }
    info!(version = get_version(), "starting intperf");

    let groups = match InterfaceGroups::classify(&cli.interfaces) {
        Ok(groups) => groups,
        Err(err @ MonitorError::UnknownInterface { .. }) => {
            error!(error = %err, "rejected interface arguments");
            eprintln!("{}", err.to_string().red().bold());
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };
    if groups.is_empty() {
        anyhow::bail!("no interfaces given");
    }
    let specs: Vec<String> = groups
        .specs()
        .into_iter()
        .map(|(kind, spec)| {
            info!(group = kind.label(), spec = %spec, "interface group");
            spec
        })
        .collect();

    let sampling = app_config.sampling()?;
    let log_destination = cli
        .logfile
        .as_deref()
        .map(|name| resolve_log_path(name, app_config.log_directory.as_deref()));
    let session = SessionConfig::new(cli.interval, cli.errors, log_destination)?;

    let recorder = match &session.log_destination {
        Some(path) => Some(SampleRecorder::create(path).map_err(|err| {
            error!(error = %err, "sample log unavailable");
            err
        })?),
        None => None,
    };

    let source: Box<dyn SnapshotSource> = if cli.simulate {
        Box::new(SimulatedSource::new())
    } else {
        Box::new(CommandSource::new(app_config.command_template())?)
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    let mut app = App::new(
        MonitorScreen::new(terminal, Theme::detect()),
        TerminalKeys,
        source,
        specs,
        session,
        sampling,
        recorder,
    );

    let result = app.run().and_then(|outcome| {
        if let SessionOutcome::Aborted(ref err) = outcome {
            app.acknowledge(err)?;
        }
        Ok(outcome)
    });

    // Restore terminal
    disable_raw_mode()?;
    let terminal = app.screen_mut().terminal_mut();
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result? {
        SessionOutcome::Terminated => {
            info!("session ended by user");
            Ok(ExitCode::SUCCESS)
        }
        SessionOutcome::Interrupted => {
            info!("session interrupted");
            println!("end");
            Ok(ExitCode::SUCCESS)
        }
        SessionOutcome::Aborted(err) => {
            match err.failed_spec() {
                Some(spec) => eprintln!("{} {}", "Wrong interface".red().bold(), spec),
                None => eprintln!("{}", err.to_string().red().bold()),
            }
            eprintln!("{}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

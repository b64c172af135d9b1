//! AuditDesk command-line interface.
//!
//! Results go to stdout, logs to stderr.

mod args;
mod output;

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use auditdesk_core::AuditService;
use auditdesk_core::ingest::{ReconciliationInput, SamplingInput};
use auditdesk_core::ports::{FileSessionStore, JsonFileDataSource};
use auditdesk_core::reconciliation::{ReconciliationEngine, ReconciliationSummary};
use auditdesk_core::sampling::{SampleSession, SamplingPolicy};
use auditdesk_shared::config::{DisplayConfig, LoggingConfig};
use auditdesk_shared::{AppConfig, AppError};

use args::{Cli, Command, OutputFormat, ReconcileArgs, SampleArgs};
use output::ReconciliationReport;

type Service = AuditService<JsonFileDataSource, FileSessionStore>;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            let err = AppError::from(err);
            eprintln!("{}: {err}", err.error_code());
            return exit_code(&err);
        }
    };
    init_tracing(&config.logging);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Command failed");
            match err.downcast_ref::<AppError>() {
                Some(app) => {
                    eprintln!("{}: {app}", app.error_code());
                    exit_code(app)
                }
                None => {
                    eprintln!("error: {err:#}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn exit_code(err: &AppError) -> ExitCode {
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_service(config: &AppConfig) -> Result<Service, AppError> {
    let service = AuditService::new(
        JsonFileDataSource::new(&config.storage.data_dir),
        FileSessionStore::new(&config.storage.session_dir),
        SamplingPolicy::from(&config.sampling),
    )?;
    Ok(service.with_default_seed(config.sampling.default_seed))
}

fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let display = cli.display(&config.display);
    match &cli.command {
        Command::Sample(args) => sample(&service, args, cli.format, &display),
        Command::Reconcile(args) => reconcile(&service, args, cli.format, &display),
        Command::Adjust {
            period,
            code,
            addition,
            deduction,
            note,
        } => {
            let annotation =
                service.adjust(&period.key(), code, *addition, *deduction, note.as_str())?;
            println!("{}", output::json(&annotation)?);
            Ok(())
        }
        Command::ClearAdjustment { period, code } => {
            let annotation = service.clear_adjustment(&period.key(), code)?;
            println!("{}", output::json(&annotation)?);
            Ok(())
        }
        Command::Note { period, code, text } => {
            let annotation = service.annotate(&period.key(), code, text.clone())?;
            println!("{}", output::json(&annotation)?);
            Ok(())
        }
        Command::Review(args) => {
            let action = args.action().map_err(AppError::Validation)?;
            let decision = service.review(&args.period.key(), &args.code, action)?;
            info!(code = %args.code, status = %decision.status, "Review recorded");
            println!("{}", output::json(&decision)?);
            Ok(())
        }
        Command::MarkTested {
            session,
            transaction_id,
        } => {
            let updated = service.mark_tested(session, transaction_id)?;
            print_session(&updated, cli.format, &display)
        }
    }
}

fn sample(
    service: &Service,
    args: &SampleArgs,
    format: OutputFormat,
    display: &DisplayConfig,
) -> anyhow::Result<()> {
    let session = if let Some(path) = &args.input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let input = SamplingInput::from_json(&text).map_err(AppError::from)?;
        let seed = args.seed.or(input.seed);
        service.sample_transactions(&input.transactions, &input.config, seed)?
    } else if let Some(period) = args.period() {
        let config = args.configuration().map_err(AppError::Validation)?;
        service.sample(&args.query(period), &config, args.seed)?
    } else {
        return Err(anyhow!(AppError::Validation(
            "either --input or --client/--year is required".to_string()
        )));
    };

    if let Some(key) = &args.session {
        service.save_sample_session(key, &session)?;
        info!(session = %key, "Sampling session saved");
    }
    print_session(&session, format, display)
}

fn reconcile(
    service: &Service,
    args: &ReconcileArgs,
    format: OutputFormat,
    display: &DisplayConfig,
) -> anyhow::Result<()> {
    let run = if let Some(path) = &args.input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let input = ReconciliationInput::from_json(&text).map_err(AppError::from)?;
        ReconciliationEngine::compute(
            &input.a07,
            &input.trial_balance,
            &input.mapping_rules,
            &input.annotations,
        )
    } else if let Some(period) = args.period() {
        service.reconcile(&period)?
    } else {
        return Err(anyhow!(AppError::Validation(
            "either --input or --client/--year is required".to_string()
        )));
    };

    match format {
        OutputFormat::Json => {
            let report = ReconciliationReport {
                summary: ReconciliationSummary::from_run(&run),
                run: (!args.summary_only).then_some(&run),
            };
            println!("{}", output::json(&report)?);
        }
        OutputFormat::Text => print!("{}", output::reconciliation_text(&run, display)),
    }
    Ok(())
}

fn print_session(
    session: &SampleSession,
    format: OutputFormat,
    display: &DisplayConfig,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", output::json(session)?),
        OutputFormat::Text => print!("{}", output::session_text(session, display)),
    }
    Ok(())
}

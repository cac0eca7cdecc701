use anyhow::Context;
use clap::Parser;
use cms_unpublisher::adapters::report::write_report;
use cms_unpublisher::core::TokioSleeper;
use cms_unpublisher::utils::logger;
use cms_unpublisher::{
    Cli, CmsError, Command, ContentstackClient, RunArgs, RunOptions, RunOutcome, RunReport,
    Settings, StopSignal, Workflow,
};
use std::time::Duration;

const EXIT_SETUP: i32 = 1;
const EXIT_ENTRY_ERRORS: i32 = 2;
const EXIT_ABORTED: i32 = 3;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = match Cli::parse().command {
        Command::Run(args) => args,
    };

    let prepared = prepare(&args);
    let verbose = matches!(&prepared, Ok((_, options)) if options.verbose);
    if args.json_logs {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    let result = match prepared {
        Ok((settings, options)) => execute(&args, settings, options).await,
        Err(e) => Err(e),
    };

    let exit_code = match result {
        Ok(report) => exit_code_for(&report, args.strict),
        Err(e) => {
            match e.downcast_ref::<CmsError>() {
                Some(cms_error) => {
                    tracing::error!(
                        "❌ Setup failed: {} (Category: {:?}, Severity: {:?})",
                        cms_error,
                        cms_error.category(),
                        cms_error.severity()
                    );
                    eprintln!("❌ {}", cms_error.user_friendly_message());
                    eprintln!("💡 {}", cms_error.recovery_suggestion());
                }
                None => eprintln!("❌ {:#}", e),
            }
            EXIT_SETUP
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn prepare(args: &RunArgs) -> anyhow::Result<(Settings, RunOptions)> {
    let settings = args.settings()?;
    let options = args.run_options(&settings)?;
    Ok((settings, options))
}

async fn execute(
    args: &RunArgs,
    settings: Settings,
    options: RunOptions,
) -> anyhow::Result<RunReport> {
    let credentials = settings.resolve_credentials(options.mode)?;
    let client = ContentstackClient::new(&settings.api, credentials)?;

    tracing::debug!(options = ?options, "Resolved run options");

    let stop = match args.deadline_secs {
        Some(secs) => StopSignal::with_deadline(Duration::from_secs(secs)),
        None => StopSignal::new(),
    };
    let interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            interrupt.trigger();
        }
    });

    let workflow = Workflow::new(client, TokioSleeper, options).with_stop_signal(stop);
    let report = workflow.run().await;

    if let Some(path) = &args.report {
        if let Err(e) = write_report(path, &report.decisions)
            .with_context(|| format!("Failed to write report to {}", path.display()))
        {
            tracing::error!("❌ {:#}", e);
        }
    }

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &RunReport) {
    match report.outcome {
        RunOutcome::Completed => println!("✅ Run completed: {}", report.summary),
        RunOutcome::CompletedWithErrors => {
            println!("⚠️ Run completed with errors: {}", report.summary)
        }
        RunOutcome::AbortedFatal => eprintln!(
            "❌ Run aborted: {}",
            report.fatal_error.as_deref().unwrap_or("unknown error")
        ),
        RunOutcome::Cancelled => println!("🛑 Run cancelled: {}", report.summary),
    }
}

fn exit_code_for(report: &RunReport, strict: bool) -> i32 {
    match report.outcome {
        RunOutcome::Completed => 0,
        RunOutcome::CompletedWithErrors if strict => EXIT_ENTRY_ERRORS,
        RunOutcome::CompletedWithErrors => 0,
        RunOutcome::AbortedFatal => EXIT_ABORTED,
        RunOutcome::Cancelled => EXIT_CANCELLED,
    }
}

#![forbid(unsafe_code)]

//! `agent-console` — terminal client for supervising remote agent runs.
//!
//! Reads operator queries from stdin, drives the session controller, and
//! renders the message timeline and approval prompts. All orchestration
//! logic lives in the library; this binary is only the presentation shell.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use agent_console::config::GlobalConfig;
use agent_console::controller::{DecisionOutcome, SampleOutcome, SessionController, SubmitOutcome};
use agent_console::gateway::http::HttpGateway;
use agent_console::gateway::SessionGateway;
use agent_console::models::approval::PendingApproval;
use agent_console::models::timeline::{Author, Timeline};
use agent_console::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "agent-console", about = "Supervise remote agent runs", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the gateway base URL from the config file.
    #[arg(long)]
    base_url: Option<String>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("agent-console bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(ref path) => GlobalConfig::load(path)?,
        None => GlobalConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.gateway.base_url = base_url;
    }
    info!(base_url = %config.gateway.base_url, "configuration loaded");

    // ── Build the controller ────────────────────────────
    let gateway: Arc<dyn SessionGateway> = Arc::new(HttpGateway::new(&config.gateway)?);
    let (mut controller, mut samples) = SessionController::new(
        gateway,
        Duration::from_secs(config.poll.interval_seconds),
    );

    println!("agent-console — type a task for the agent.");
    println!("Commands: /approve, /deny <reason>, /quit");

    // Cursor into the timeline for incremental printing.
    let mut printed = 0usize;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // ── Event loop: operator input and poll samples ─────
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_line(&mut controller, line.trim(), &mut printed).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        return Err(AppError::Io(format!("stdin read failed: {err}")));
                    }
                }
            }
            Some(sample) = samples.recv() => {
                let outcome = controller.handle_sample(sample).await;
                flush_timeline(controller.timeline(), &mut printed);
                match outcome {
                    SampleOutcome::Suspended => {
                        if let Some(pending) = controller.pending_approval() {
                            render_approval_prompt(pending);
                        }
                    }
                    SampleOutcome::Completed { summary, tool_call_count } => {
                        if let Some(summary) = summary {
                            println!("  (summary: {summary})");
                        }
                        println!("  (run finished; {tool_call_count} tool call(s))");
                    }
                    _ => {}
                }
            }
        }
    }

    info!("agent-console shut down");
    Ok(())
}

/// Process one operator input line. Returns `false` to exit the loop.
async fn handle_line(controller: &mut SessionController, line: &str, printed: &mut usize) -> bool {
    match line {
        "" => return true,
        "/quit" => return false,
        "/approve" => {
            let outcome = controller.decide(true, None).await;
            flush_timeline(controller.timeline(), printed);
            report_decision(&outcome);
        }
        line if line == "/deny" || line.starts_with("/deny ") => {
            let reason = line.strip_prefix("/deny").map(str::trim).filter(|r| !r.is_empty());
            let outcome = controller.decide(false, reason).await;
            flush_timeline(controller.timeline(), printed);
            report_decision(&outcome);
        }
        query => {
            let outcome = controller.submit(query).await;
            flush_timeline(controller.timeline(), printed);
            if let SubmitOutcome::Started { run_id } = outcome {
                println!("  (run {run_id} started; polling)");
            }
        }
    }
    true
}

/// Print any timeline entries appended since the last flush.
fn flush_timeline(timeline: &Timeline, printed: &mut usize) {
    for entry in &timeline.entries()[*printed..] {
        let author = match entry.author {
            Author::Human => "you",
            Author::Agent => "agent",
        };
        println!("{author}> {}", entry.body);
    }
    *printed = timeline.len();
}

fn render_approval_prompt(pending: &PendingApproval) {
    println!("⚠ Critical action requires approval");
    println!("  tool:      {}", pending.tool_name);
    println!(
        "  arguments: {}",
        serde_json::to_string_pretty(&pending.tool_arguments)
            .unwrap_or_else(|_| pending.tool_arguments.to_string())
    );
    println!("  reason:    {}", pending.reasoning_summary);
    println!("Respond with /approve or /deny <reason>.");
}

fn report_decision(outcome: &DecisionOutcome) {
    match outcome {
        DecisionOutcome::ReasonRequired => {
            println!("A reason is required to deny: /deny <reason>");
        }
        DecisionOutcome::NoPendingApproval => {
            println!("No critical action is awaiting a decision.");
        }
        DecisionOutcome::AlreadyDecided => {
            println!("A decision was already submitted for this run.");
        }
        DecisionOutcome::SubmitFailed => {
            println!("Could not submit the decision. Please try again.");
        }
        DecisionOutcome::Approved | DecisionOutcome::Denied => {}
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}

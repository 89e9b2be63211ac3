//! `repl` entrypoint.
use anyhow::Result;
use clap::Parser;
use core_config::Config;
use core_events::{EVENT_CHANNEL_CAP, Event};
use core_input::AsyncInputShutdown;
use core_session::{ExitReason, Session, SessionReport};
use core_terminal::{CrosstermBackend, enter_guard, stdin_is_tty};
use std::io::{Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

const INPUT_JOIN_TIMEOUT: Duration = Duration::from_millis(200);
// tokio's stdin reader parks a blocking thread that never returns on its own.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "repl", version, about = "Interactive line-editing REPL")]
struct Args {
    /// Prompt text (overrides `[session] prompt`).
    #[arg(long)]
    pub prompt: Option<String>,
    /// Configuration file path (overrides discovery of `repl.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Transcript to replay before the first prompt.
    #[arg(long)]
    pub load: Option<PathBuf>,
    /// Do not write a log file.
    #[arg(long = "no-log")]
    pub no_log: bool,
}

fn configure_logging(config: &Config) -> Option<WorkerGuard> {
    if !config.log_enabled() {
        return None;
    }
    let log_path = config.log_file();
    let log_dir = match log_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = log_path.file_name()?;
    if log_path.exists() {
        let _ = std::fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Read the config without logging; its notices are replayed once the
/// subscriber is installed.
fn load_config(args: &Args) -> Config {
    let mut config = core_config::read_from(args.config.clone());
    if let Some(prompt) = &args.prompt {
        config.override_prompt(prompt.clone());
    }
    if args.no_log {
        config.disable_log();
    }
    config
}

async fn stop_input(task: JoinHandle<()>, shutdown: AsyncInputShutdown, reason: ExitReason) {
    trace!(target: "runtime.shutdown", reason = reason.as_str(), "input_task_shutdown_signal");
    shutdown.signal();
    match tokio::time::timeout(INPUT_JOIN_TIMEOUT, task).await {
        Ok(Ok(())) => {
            trace!(target: "runtime.shutdown", reason = reason.as_str(), "input_task_joined")
        }
        Ok(Err(err)) if err.is_cancelled() => {
            trace!(target: "runtime.shutdown", reason = reason.as_str(), "input_task_cancelled")
        }
        Ok(Err(err)) => error!(
            target: "runtime.shutdown",
            reason = reason.as_str(),
            ?err,
            "input_task_join_failed"
        ),
        Err(_) => warn!(target: "runtime.shutdown", reason = reason.as_str(), "input_task_timeout"),
    }
}

async fn run_session(config: &Config, load: Option<&Path>) -> Result<SessionReport<Stdout>> {
    drive(config, load, tokio::io::stdin(), std::io::stdout()).await
}

/// Wire an input source and an output sink to a session and run it. The
/// input task is signalled and joined however the session ends.
async fn drive<R, W>(
    config: &Config,
    load: Option<&Path>,
    reader: R,
    out: W,
) -> Result<SessionReport<W>>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: Write + 'static,
{
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(reader, tx);

    let mut session = Session::new(out)
        .with_prompt(config.prompt())
        .with_sentinel(config.sentinel());
    let replayed = match load {
        Some(path) => {
            info!(target: "runtime", "startup_load");
            session.run_command("load", &[path.display().to_string()])
        }
        None => Ok(()),
    };

    let result = match replayed {
        Ok(()) => session.run(rx).await,
        Err(err) => {
            error!(target: "runtime", error = %err, "startup_load_failed");
            Err(err)
        }
    };
    let reason = result
        .as_ref()
        .map(|report| report.reason)
        .unwrap_or(ExitReason::InputClosed);
    stop_input(input_task, input_shutdown, reason).await;
    result
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args);
    let _log_guard = configure_logging(&config);
    config.emit_notices();
    install_panic_hook();
    info!(target: "runtime", interactive = stdin_is_tty(), "startup");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut backend = CrosstermBackend::new();
    let guard = if stdin_is_tty() {
        Some(enter_guard(&mut backend)?)
    } else {
        None
    };

    let result = runtime.block_on(run_session(&config, args.load.as_deref()));
    if let Some(guard) = guard {
        guard.release()?;
    }
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    let report = result?;
    info!(target: "runtime.shutdown", reason = report.reason.as_str(), "exit");
    Ok(())
}

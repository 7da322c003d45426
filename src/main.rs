//! Countdown Timer CLI
//!
//! Every stateful command resumes the persisted session, applies one action
//! and hands the session back to the store, arming a wake-up alarm when the
//! countdown keeps running after the process exits.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;

use countdown::cli::{Cli, Commands, Display};
use countdown::controller::{now_epoch_seconds, run_ticks, TickOutcome, TimerController, TimerEvent};
use countdown::store::{JsonFileStore, SessionStore};
use countdown::wakeup::{build_scheduler, handle_timer_expired, SchedulerBackend, WakeupScheduler};

type AppController = TimerController<JsonFileStore, Box<dyn WakeupScheduler>>;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let store = match (&command, cli.store) {
        (Commands::Completions { shell }, _) => {
            generate_completions(*shell);
            return Ok(());
        }
        (_, Some(path)) => JsonFileStore::new(path),
        (_, None) => JsonFileStore::open_default()?,
    };
    tracing::debug!("Using session store {:?}", store.path());

    match command {
        Commands::Completions { .. } => Ok(()),
        Commands::Start => with_session(store, cli.wakeup, |controller| {
            controller.start()?;
            Display::show_start_success(controller.session());
            Ok(())
        }),
        Commands::Pause => with_session(store, cli.wakeup, |controller| {
            controller.pause()?;
            Display::show_pause_success(controller.session());
            Ok(())
        }),
        Commands::Stop => with_session(store, cli.wakeup, |controller| {
            controller.stop()?;
            Display::show_stop_success(controller.session());
            Ok(())
        }),
        Commands::Status => with_session(store, cli.wakeup, |controller| {
            Display::show_status(controller.session());
            Ok(())
        }),
        Commands::Watch => watch(store, cli.wakeup).await,
        Commands::Config(args) => {
            if let Some(minutes) = args.length {
                store.set_timer_length_minutes(minutes)?;
            }
            Display::show_config(store.timer_length_minutes()?);
            Ok(())
        }
        Commands::Expire => {
            handle_timer_expired(&store).context("Failed to reset expired countdown")?;
            tracing::info!("Expired countdown reset to Stopped");
            Ok(())
        }
    }
}

/// Builds the controller and brings the persisted session to the foreground.
fn open_controller(
    store: JsonFileStore,
    backend: SchedulerBackend,
) -> Result<(AppController, mpsc::UnboundedReceiver<TimerEvent>)> {
    let scheduler = build_scheduler(backend, store.path().to_path_buf())?;
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let mut controller = TimerController::new(store, scheduler, event_tx)?;
    controller.enter_foreground(now_epoch_seconds())?;

    Ok((controller, event_rx))
}

/// Runs one action between a foreground resume and a background hand-off.
///
/// The hand-off runs even when the action is rejected, so the resumed
/// session is always written back.
fn with_session<F>(store: JsonFileStore, backend: SchedulerBackend, action: F) -> Result<()>
where
    F: FnOnce(&mut AppController) -> Result<()>,
{
    let (mut controller, _event_rx) = open_controller(store, backend)?;

    let outcome = action(&mut controller);
    let backgrounded = controller.enter_background(now_epoch_seconds());

    outcome?;
    backgrounded.context("Failed to hand the countdown to the background")?;
    Ok(())
}

/// Counts down in the terminal until the timer finishes or the process is
/// asked to stop.
///
/// The countdown is anchored to the wall clock up front, so even a watch
/// that is killed outright leaves an armed alarm and a correctable snapshot.
async fn watch(store: JsonFileStore, backend: SchedulerBackend) -> Result<()> {
    let (mut controller, mut event_rx) = open_controller(store, backend)?;
    controller
        .anchor(now_epoch_seconds())
        .context("Failed to arm the wake-up for the watched countdown")?;

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            Display::show_event(&event);
        }
    });

    let outcome = run_ticks(&mut controller, now_epoch_seconds, shutdown_signal()).await;
    let backgrounded = controller.enter_background(now_epoch_seconds());

    let session = controller.session().clone();
    drop(controller);
    let _ = printer.await;

    match outcome? {
        TickOutcome::Idle => Display::show_not_running(session.state),
        TickOutcome::Interrupted => Display::show_watch_detached(&session),
        TickOutcome::Finished => {}
    }
    backgrounded.context("Failed to hand the countdown to the background")?;
    Ok(())
}

/// Completes on Ctrl-C, and on SIGTERM or SIGHUP where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::hangup())) {
            (Ok(mut term), Ok(mut hangup)) => {
                tokio::select! {
                    _ = term.recv() => tracing::debug!("Received SIGTERM"),
                    _ = hangup.recv() => tracing::debug!("Received SIGHUP"),
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Failed to listen for termination signals: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

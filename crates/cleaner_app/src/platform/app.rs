use std::collections::VecDeque;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use cleaner_core::{preview_fields, update, AppState, Msg, RunEnd, RunPlan};
use cleaner_engine::RunController;
use engine_logging::engine_info;

use super::cli::{Cli, Command};
use super::console::Console;
use super::effects::EffectRunner;
use super::{logging, settings};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log_file.as_deref(), cli.verbose);

    let settings_path = match &cli.config {
        Some(path) => path.clone(),
        None => settings::default_settings_path()
            .context("no user config directory; pass --config")?,
    };
    let mut settings = settings::load_settings(&settings_path);
    cli.apply_overrides(&mut settings)?;

    if let Some(Command::Fields) = cli.command {
        println!("{}", preview_fields(&settings.prompt));
        return Ok(());
    }

    settings::save_settings(&settings_path, &settings)
        .with_context(|| format!("saving settings to {}", settings_path.display()))?;

    let plan = RunPlan::prepare(
        settings.input_path(),
        settings.output_path(),
        settings.run_config(),
    )?;
    let controller =
        RunController::with_settings(settings.client_settings())?.with_bom(settings.utf8_bom);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let interrupt_msg = if cli.discard_on_interrupt {
        Msg::StopNoSaveClicked
    } else {
        Msg::StopAndSaveClicked
    };
    ctrlc::set_handler(move || {
        let _ = msg_tx.send(interrupt_msg.clone());
    })
    .context("installing Ctrl-C handler")?;

    drive(
        EffectRunner::new(controller),
        msg_rx,
        Msg::StartClicked(Box::new(plan)),
    )
}

/// Message loop: feeds engine events and interrupts through `update` until
/// the run is back to idle.
fn drive(runner: EffectRunner, msg_rx: mpsc::Receiver<Msg>, first: Msg) -> anyhow::Result<()> {
    let mut state = AppState::new();
    let mut console = Console::default();
    let mut failure = None;
    let mut inbox = VecDeque::from([first]);

    loop {
        runner.drain_events(&mut inbox);
        while let Some(msg) = inbox.pop_front() {
            match &msg {
                Msg::StartFailed(reason) | Msg::RunEnded(RunEnd::Failed(reason)) => {
                    failure = Some(reason.clone());
                }
                Msg::StopAndSaveClicked | Msg::StopNoSaveClicked => {
                    engine_info!("interrupt received: {:?}", msg);
                }
                _ => {}
            }
            let (next, effects) = update(state, msg);
            state = next;
            runner.enqueue(effects, &mut inbox);
        }

        if state.consume_dirty() {
            console.render(&state.view());
        }
        if !state.run_state().is_active() {
            break;
        }

        match msg_rx.recv_timeout(POLL_INTERVAL) {
            Ok(msg) => inbox.push_back(msg),
            Err(RecvTimeoutError::Timeout) => inbox.push_back(Msg::Tick),
            Err(RecvTimeoutError::Disconnected) => thread::sleep(POLL_INTERVAL),
        }
    }

    runner.wait();
    match failure {
        Some(reason) => Err(anyhow!(reason)),
        None => Ok(()),
    }
}

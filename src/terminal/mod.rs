pub mod draft;
pub mod events;
pub mod state;
pub mod ui;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::store::repo::EmailStore;
use crate::terminal::state::AppState;
use crate::worker::{StoreCommand, StoreEvent, spawn_store_worker};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the triage screen until the operator quits.
pub fn run_tui(store: Box<dyn EmailStore>) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!("cannot install error hooks: {e}"))?;

    let (cmd_tx, cmd_rx) = mpsc::channel::<StoreCommand>();
    let (evt_tx, evt_rx) = mpsc::channel::<StoreEvent>();
    // not joined on exit: an unbounded request may still be in flight
    let _worker = spawn_store_worker(store, cmd_rx, evt_tx);

    let mut state = AppState::new();
    cmd_tx.send(state.begin_fetch())?;

    let terminal = ratatui::init();
    let result = run(terminal, &mut state, &cmd_tx, &evt_rx);
    ratatui::restore();

    let _ = cmd_tx.send(StoreCommand::Shutdown);
    result
}

fn run(
    mut terminal: DefaultTerminal,
    state: &mut AppState,
    commands: &Sender<StoreCommand>,
    results: &Receiver<StoreEvent>,
) -> Result<()> {
    loop {
        for ev in results.try_iter() {
            state.apply_event(ev);
        }

        terminal.draw(|f| ui::render(f, state))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if events::handle_key(key, state, commands)? {
                    break;
                }
            }
        }
    }
    Ok(())
}

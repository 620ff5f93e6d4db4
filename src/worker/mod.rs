use log::{debug, error, info};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::domain::email::{Email, EmailId};
use crate::store::repo::{EmailStore, StoreError};

#[derive(Debug)]
pub enum StoreCommand {
    FetchEmails,
    /// `id` is captured when the save is issued, not when it completes.
    SaveResponse { id: EmailId, text: String },
    Shutdown,
}

#[derive(Debug)]
pub enum StoreEvent {
    Emails(Result<Vec<Email>, StoreError>),
    Saved {
        id: EmailId,
        result: Result<(), StoreError>,
    },
}

/// Runs store requests on a background thread, one at a time and in the
/// order they were sent, so the UI loop never blocks on the network.
pub fn spawn_store_worker(
    store: Box<dyn EmailStore>,
    commands: Receiver<StoreCommand>,
    events: Sender<StoreEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("store worker started");
        while let Ok(cmd) = commands.recv() {
            debug!("store worker: {cmd:?}");
            let event = match cmd {
                StoreCommand::FetchEmails => {
                    let result = store.list_emails();
                    match &result {
                        Ok(emails) => info!("loaded {} emails", emails.len()),
                        Err(e) => error!("loading emails failed: {e}"),
                    }
                    StoreEvent::Emails(result)
                }
                StoreCommand::SaveResponse { id, text } => {
                    let result = store.save_response(&id, &text);
                    match &result {
                        Ok(()) => info!("saved response for email {id}"),
                        Err(e) => error!("saving response for email {id} failed: {e}"),
                    }
                    StoreEvent::Saved { id, result }
                }
                StoreCommand::Shutdown => break,
            };
            if events.send(event).is_err() {
                // UI side is gone
                break;
            }
        }
        info!("store worker stopped");
    })
}

//! Fixture-backed email store for local development.
//!
//! Serves the same two endpoints the triage client talks to, holding the
//! emails in memory. Saved drafts live until the process exits.

use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::domain::email::{Email, ResponseUpdate};

pub struct DevStore {
    emails: Vec<Email>,
}

impl DevStore {
    /// Urgent emails come first; otherwise the given order is kept.
    ///
    /// Ids are addressed by their path form, so `1` and `"1"` are the same
    /// email here; only the first one in the fixture is kept.
    pub fn new(emails: Vec<Email>) -> Self {
        let mut seen = HashSet::new();
        let mut emails: Vec<Email> = emails
            .into_iter()
            .filter(|e| {
                let fresh = seen.insert(e.id.to_string());
                if !fresh {
                    warn!("dropping email with duplicate id {}", e.id);
                }
                fresh
            })
            .collect();
        emails.sort_by_key(|e| !e.is_urgent());
        Self { emails }
    }

    pub fn load_fixture(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("cannot read fixture {}: {e}", path.display()))?;
        let emails: Vec<Email> = serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid fixture {}: {e}", path.display()))?;
        info!("loaded {} emails from {}", emails.len(), path.display());
        Ok(Self::new(emails))
    }

    pub fn emails(&self) -> &[Email] {
        &self.emails
    }

    pub fn update_response(&mut self, id: &str, ai_response: String) -> bool {
        match self.emails.iter_mut().find(|e| e.id.to_string() == id) {
            Some(email) => {
                email.ai_response = Some(ai_response);
                true
            }
            None => false,
        }
    }

    /// Maps a request to a status code and JSON body.
    pub fn route(&mut self, method: &Method, url: &str, body: &str) -> (u16, Value) {
        let path = url.split('?').next().unwrap_or("");
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            (Method::Get, ["emails"]) => match serde_json::to_value(&self.emails) {
                Ok(v) => (200, v),
                Err(e) => (500, json!({ "detail": e.to_string() })),
            },
            (Method::Post, ["emails", raw_id, "response"]) => {
                let id = match urlencoding::decode(raw_id) {
                    Ok(id) => id.into_owned(),
                    Err(_) => return (404, json!({ "detail": "Email not found" })),
                };
                let update: ResponseUpdate = match serde_json::from_str(body) {
                    Ok(u) => u,
                    Err(e) => return (422, json!({ "detail": e.to_string() })),
                };
                if self.update_response(&id, update.ai_response) {
                    info!("updated response for email {id}");
                    (200, json!({ "message": "Response updated" }))
                } else {
                    warn!("response for unknown email {id}");
                    (404, json!({ "detail": "Email not found" }))
                }
            }
            _ => (404, json!({ "detail": "Not Found" })),
        }
    }
}

pub struct StoreServer {
    server: Server,
    store: DevStore,
}

impl StoreServer {
    pub fn bind(addr: &str, store: DevStore) -> Result<Self> {
        let server =
            Server::http(addr).map_err(|e| anyhow!("Failed to bind store server on {addr}: {e}"))?;
        Ok(Self { server, store })
    }

    /// Bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> String {
        self.server.server_addr().to_string()
    }

    /// Serves requests until `running` is cleared, then hands the store back.
    pub fn run(mut self, running: Arc<AtomicBool>) -> Result<DevStore> {
        info!("email store listening on http://{}", self.local_addr());
        while running.load(Ordering::SeqCst) {
            let Some(request) = self.server.recv_timeout(Duration::from_millis(200))? else {
                continue;
            };
            if let Err(e) = self.handle(request) {
                warn!("store request failed: {e}");
            }
        }
        info!("email store stopped");
        Ok(self.store)
    }

    fn handle(&mut self, mut request: Request) -> Result<()> {
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body)?;

        let method = request.method().clone();
        let url = request.url().to_string();
        let (status, payload) = self.store.route(&method, &url, &body);
        debug!("{method} {url} -> {status}");

        let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
            .map_err(|_| anyhow!("invalid content-type header"))?;
        let response = Response::from_string(payload.to_string())
            .with_status_code(status)
            .with_header(content_type);
        request.respond(response)?;
        Ok(())
    }
}

/// Serves `fixture` on `addr` until Ctrl-C.
pub fn serve(addr: &str, fixture: &Path) -> Result<()> {
    let store = DevStore::load_fixture(fixture)?;
    let server = StoreServer::bind(addr, store)?;

    let running = Arc::new(AtomicBool::new(true));
    let r2 = running.clone();
    ctrlc::set_handler(move || {
        r2.store(false, Ordering::SeqCst);
    })?;

    server.run(running)?;
    Ok(())
}

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use url::Url;

use crate::domain::email::{Email, EmailId, ResponseUpdate};
use crate::store::repo::{EmailStore, StoreError};

/// `EmailStore` backed by the HTTP endpoints `GET /emails` and
/// `POST /emails/{id}/response`.
pub struct HttpEmailStore {
    base: Url,
    http: Client,
}

impl HttpEmailStore {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let base = Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::Transport)?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            for s in segments {
                path.push(s);
            }
        }
        Ok(url)
    }
}

/// Turns a non-success response into `StoreError::Status`, keeping the
/// server's `detail` field when it sent one.
fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .map(|d| match d {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });
    Err(StoreError::Status {
        status: status.as_u16(),
        detail,
    })
}

impl EmailStore for HttpEmailStore {
    fn list_emails(&self) -> Result<Vec<Email>, StoreError> {
        let url = self.endpoint(&["emails"])?;
        debug!("GET {url}");
        let resp = self.http.get(url).send().map_err(StoreError::Transport)?;
        let body = check_status(resp)?.text().map_err(StoreError::Transport)?;
        let emails: Vec<Email> = serde_json::from_str(&body).map_err(StoreError::Decode)?;
        debug!("fetched {} emails", emails.len());
        Ok(emails)
    }

    fn save_response(&self, id: &EmailId, ai_response: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        let url = self.endpoint(&["emails", &id, "response"])?;
        debug!("POST {url}");
        let body = ResponseUpdate {
            ai_response: ai_response.to_string(),
        };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .map_err(StoreError::Transport)?;
        check_status(resp).map_err(|e| {
            warn!("saving response for email {id} failed: {e}");
            e
        })?;
        Ok(())
    }
}

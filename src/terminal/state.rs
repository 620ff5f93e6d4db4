use log::{info, warn};
use ratatui::widgets::ListState;
use std::collections::VecDeque;

use crate::domain::email::{Email, EmailId};
use crate::store::repo::StoreError;
use crate::terminal::draft::DraftEditor;
use crate::worker::{StoreCommand, StoreEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Modal message that swallows input until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

/// All view state of the triage screen. Only the UI loop mutates it.
pub struct AppState {
    pub emails: Vec<Email>,
    /// Keyboard cursor in the list; distinct from the selected email.
    pub list_state: ListState,

    /// The email shown in the right panel.
    pub selected: Option<EmailId>,
    pub draft: DraftEditor,
    pub detail_scroll: u16,

    pub focus: Focus,
    pub loading: bool,
    /// Ids of saves still in flight, in issue order.
    pub pending_saves: Vec<EmailId>,

    /// Load failure shown above the panels.
    pub banner: Option<String>,
    /// Save results waiting to be acknowledged; the front one is shown.
    pub notices: VecDeque<Notice>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            emails: vec![],
            list_state: ListState::default(),
            selected: None,
            draft: DraftEditor::default(),
            detail_scroll: 0,
            focus: Focus::List,
            loading: false,
            pending_saves: vec![],
            banner: None,
            notices: VecDeque::new(),
        }
    }

    pub fn begin_fetch(&mut self) -> StoreCommand {
        self.loading = true;
        StoreCommand::FetchEmails
    }

    pub fn apply_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Emails(result) => self.apply_emails(result),
            StoreEvent::Saved { id, result } => self.apply_saved(&id, result),
        }
    }

    /// Replaces the whole collection. A failed load leaves an empty list and
    /// a banner. The selection survives only if its id is still present.
    pub fn apply_emails(&mut self, result: Result<Vec<Email>, StoreError>) {
        self.loading = false;
        match result {
            Ok(emails) => {
                self.emails = emails;
                self.banner = None;
            }
            Err(e) => {
                self.emails.clear();
                self.banner = Some(format!("Could not load emails: {e}"));
            }
        }

        let gone = self
            .selected
            .as_ref()
            .is_some_and(|id| !self.emails.iter().any(|e| &e.id == id));
        if gone {
            info!("selected email is gone after reload");
            self.clear_selection();
        }

        if self.emails.is_empty() {
            self.list_state.select(None);
        } else {
            let cur = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(cur.min(self.emails.len() - 1)));
        }
    }

    pub fn apply_saved(&mut self, id: &EmailId, result: Result<(), StoreError>) {
        if let Some(pos) = self.pending_saves.iter().position(|p| p == id) {
            self.pending_saves.remove(pos);
        }
        let label = self.label_for(id);
        self.notices.push_back(match result {
            Ok(()) => Notice {
                kind: NoticeKind::Info,
                title: "Saved".to_string(),
                message: format!("Response saved for {label}."),
            },
            Err(e) => {
                warn!("save failed for email {id}: {e}");
                Notice {
                    kind: NoticeKind::Error,
                    title: "Save failed".to_string(),
                    message: format!("Response for {label} was not saved: {e}"),
                }
            }
        });
    }

    fn label_for(&self, id: &EmailId) -> String {
        match self.emails.iter().find(|e| &e.id == id) {
            Some(e) if !e.subject.is_empty() => format!("\"{}\"", e.subject),
            _ => format!("email {id}"),
        }
    }

    pub fn cursor_id(&self) -> Option<&EmailId> {
        let idx = self.list_state.selected()?;
        self.emails.get(idx).map(|e| &e.id)
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if self.emails.is_empty() {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let len = self.emails.len() as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
    }

    pub fn cursor_first(&mut self) {
        if !self.emails.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn cursor_last(&mut self) {
        if !self.emails.is_empty() {
            self.list_state.select(Some(self.emails.len() - 1));
        }
    }

    /// Selects the email under the cursor.
    pub fn select_at_cursor(&mut self) {
        if let Some(id) = self.cursor_id().cloned() {
            self.select(&id);
        }
    }

    /// Selects `id` and reseeds the draft from its `ai_response`, dropping
    /// unsaved edits to the previous draft.
    pub fn select(&mut self, id: &EmailId) -> bool {
        let Some(pos) = self.emails.iter().position(|e| &e.id == id) else {
            return false;
        };
        let seed = self.emails[pos].draft().to_string();
        self.selected = Some(id.clone());
        self.draft.set(&seed);
        self.detail_scroll = 0;
        self.list_state.select(Some(pos));
        true
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.draft.set("");
        self.detail_scroll = 0;
        self.focus = Focus::List;
    }

    pub fn selected_email(&self) -> Option<&Email> {
        let id = self.selected.as_ref()?;
        self.emails.iter().find(|e| &e.id == id)
    }

    pub fn is_selected(&self, email: &Email) -> bool {
        self.selected.as_ref() == Some(&email.id)
    }

    pub fn response_text(&self) -> &str {
        self.draft.as_str()
    }

    /// Builds the save request for the current selection, if any.
    pub fn save_command(&mut self) -> Option<StoreCommand> {
        let id = self.selected.clone()?;
        self.pending_saves.push(id.clone());
        Some(StoreCommand::SaveResponse {
            id,
            text: self.response_text().to_string(),
        })
    }

    pub fn edit_draft(&mut self) {
        if self.selected.is_some() {
            self.focus = Focus::Draft;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::List if self.selected.is_some() => Focus::Draft,
            _ => Focus::List,
        };
    }

    pub fn scroll_detail(&mut self, delta: i32) {
        if delta < 0 {
            self.detail_scroll = self.detail_scroll.saturating_sub((-delta) as u16);
        } else {
            self.detail_scroll = self.detail_scroll.saturating_add(delta as u16);
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    /// Whether a save for `id` is still in flight.
    pub fn is_saving(&self, id: &EmailId) -> bool {
        self.pending_saves.contains(id)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn email(id: i64, subject: &str, priority: &str, draft: &str) -> Email {
        Email {
            id: EmailId::Int(id),
            subject: subject.to_string(),
            sender: format!("customer{id}@example.com"),
            sent_date: "2024-08-19 10:00:00".to_string(),
            body: format!("Body of {subject}"),
            phone_numbers: vec![],
            alternate_emails: vec![],
            customer_requests: vec![],
            sentiment: "Neutral".to_string(),
            priority: priority.to_string(),
            ai_response: Some(draft.to_string()),
        }
    }

    pub(crate) fn loaded(emails: Vec<Email>) -> AppState {
        let mut state = AppState::new();
        let _ = state.begin_fetch();
        state.apply_emails(Ok(emails));
        state
    }

    #[test]
    fn loading_keeps_server_order_and_places_the_cursor() {
        let state = loaded(vec![
            email(3, "C", "Urgent", ""),
            email(1, "A", "Not urgent", ""),
            email(2, "B", "Not urgent", ""),
        ]);
        assert!(!state.loading);
        let ids: Vec<_> = state.emails.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
        assert_eq!(state.list_state.selected(), Some(0));
        assert!(state.selected.is_none());
    }

    #[test]
    fn selecting_another_email_reseeds_the_draft() {
        let mut state = loaded(vec![email(1, "A", "", "draft A"), email(2, "B", "", "draft B")]);
        state.select_at_cursor();
        assert_eq!(state.response_text(), "draft A");
        state.draft.insert('!');
        assert_eq!(state.response_text(), "draft A!");

        state.move_cursor(1);
        state.select_at_cursor();
        assert_eq!(state.selected, Some(EmailId::Int(2)));
        assert_eq!(state.response_text(), "draft B");

        state.select(&EmailId::Int(1));
        assert_eq!(state.response_text(), "draft A");
    }

    #[test]
    fn cursor_movement_does_not_select() {
        let mut state = loaded(vec![email(1, "A", "", "a"), email(2, "B", "", "b")]);
        state.move_cursor(1);
        state.move_cursor(5);
        assert_eq!(state.list_state.selected(), Some(1));
        assert!(state.selected.is_none());
        state.move_cursor(-9);
        assert_eq!(state.list_state.selected(), Some(0));
    }

    #[test]
    fn exactly_one_email_is_marked_selected() {
        let mut state = loaded(vec![email(1, "A", "", ""), email(2, "B", "", "")]);
        state.select(&EmailId::Int(2));
        let marked: Vec<_> = state.emails.iter().filter(|e| state.is_selected(e)).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].id, EmailId::Int(2));
    }

    #[test]
    fn failed_load_leaves_an_empty_list_and_a_banner() {
        let mut state = AppState::new();
        let _ = state.begin_fetch();
        let err = serde_json::from_str::<Vec<Email>>("{\"oops\": 1}").unwrap_err();
        state.apply_emails(Err(StoreError::Decode(err)));
        assert!(state.emails.is_empty());
        assert!(!state.loading);
        assert_eq!(state.list_state.selected(), None);
        assert!(state.banner.as_deref().unwrap().starts_with("Could not load emails"));
    }

    #[test]
    fn reload_keeps_a_surviving_selection_and_its_draft() {
        let mut state = loaded(vec![email(1, "A", "", "a"), email(2, "B", "", "b")]);
        state.select(&EmailId::Int(2));
        state.draft.insert('?');
        state.apply_emails(Ok(vec![email(2, "B", "", "b2"), email(5, "E", "", "e")]));
        assert_eq!(state.selected, Some(EmailId::Int(2)));
        assert_eq!(state.response_text(), "b?");

        state.apply_emails(Ok(vec![email(5, "E", "", "e")]));
        assert!(state.selected.is_none());
        assert_eq!(state.response_text(), "");
    }

    #[test]
    fn save_captures_the_selected_id_and_exact_text() {
        let mut state = loaded(vec![email(1, "Help", "Urgent", "Draft...")]);
        assert!(state.save_command().is_none());

        state.select_at_cursor();
        state.draft.set("");
        for c in "Final.".chars() {
            state.draft.insert(c);
        }
        match state.save_command() {
            Some(StoreCommand::SaveResponse { id, text }) => {
                assert_eq!(id, EmailId::Int(1));
                assert_eq!(text, "Final.");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(state.pending_saves, vec![EmailId::Int(1)]);
    }

    #[test]
    fn stale_save_reports_against_the_captured_email() {
        let mut state = loaded(vec![email(1, "A", "", "a"), email(2, "B", "", "b")]);
        state.select(&EmailId::Int(1));
        let Some(StoreCommand::SaveResponse { id, .. }) = state.save_command() else {
            panic!("expected a save");
        };
        state.select(&EmailId::Int(2));

        state.apply_saved(&id, Ok(()));
        let notice = state.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert!(notice.message.contains("\"A\""));
        assert_eq!(state.selected, Some(EmailId::Int(2)));
        assert!(state.pending_saves.is_empty());
        // list keeps the original draft
        assert_eq!(state.emails[0].draft(), "a");
    }

    #[test]
    fn failed_save_is_reported_as_an_error() {
        let mut state = loaded(vec![email(1, "A", "", "a")]);
        state.apply_saved(
            &EmailId::Int(1),
            Err(StoreError::Status {
                status: 404,
                detail: Some("Email not found".into()),
            }),
        );
        let notice = state.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.contains("Email not found"));
    }

    #[test]
    fn earlier_failure_is_not_hidden_by_a_later_success() {
        let mut state = loaded(vec![email(1, "A", "", "a"), email(2, "B", "", "b")]);
        state.select(&EmailId::Int(1));
        assert!(state.save_command().is_some());
        state.select(&EmailId::Int(2));
        assert!(state.save_command().is_some());
        assert!(state.is_saving(&EmailId::Int(1)));
        assert!(state.is_saving(&EmailId::Int(2)));

        state.apply_saved(
            &EmailId::Int(1),
            Err(StoreError::Status {
                status: 500,
                detail: Some("boom".into()),
            }),
        );
        state.apply_saved(&EmailId::Int(2), Ok(()));
        assert!(state.pending_saves.is_empty());

        let first = state.notice().unwrap();
        assert_eq!(first.kind, NoticeKind::Error);
        assert!(first.message.contains("\"A\""));
        assert!(first.message.contains("boom"));

        state.dismiss_notice();
        let second = state.notice().unwrap();
        assert_eq!(second.kind, NoticeKind::Info);
        assert!(second.message.contains("\"B\""));

        state.dismiss_notice();
        assert!(state.notice().is_none());
    }

    #[test]
    fn saving_marker_follows_the_email_being_saved() {
        let mut state = loaded(vec![email(1, "A", "", "a"), email(2, "B", "", "b")]);
        state.select(&EmailId::Int(1));
        let _ = state.save_command();
        state.select(&EmailId::Int(2));
        assert!(state.is_saving(&EmailId::Int(1)));
        assert!(!state.is_saving(&EmailId::Int(2)));
        state.apply_saved(&EmailId::Int(1), Ok(()));
        assert!(!state.is_saving(&EmailId::Int(1)));
    }

    #[test]
    fn draft_focus_requires_a_selection() {
        let mut state = loaded(vec![email(1, "A", "", "a")]);
        state.toggle_focus();
        assert_eq!(state.focus, Focus::List);
        state.edit_draft();
        assert_eq!(state.focus, Focus::List);
        state.select_at_cursor();
        state.toggle_focus();
        assert_eq!(state.focus, Focus::Draft);
        state.toggle_focus();
        assert_eq!(state.focus, Focus::List);
    }
}

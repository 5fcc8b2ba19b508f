//! App state - pure data structure with no I/O logic

use std::collections::HashMap;

use crate::compose::{AuthField, BodyMode, KeyValueSet, RequestForm};
use crate::messages::ui_events::{InputMode, KvColumn, Panel, SaveField};
use crate::messages::RenderState;
use crate::models::{RequestDescriptor, ResponseRecord};
use crate::storage::History;
use crate::view::{classify, render_plan, PrettyText, ResponseView};

/// Inputs of the save popup
#[derive(Clone, Debug)]
pub struct SaveDraft {
    pub name: String,
    pub description: String,
    pub collection: String,
    pub field: SaveField,
}

impl Default for SaveDraft {
    fn default() -> Self {
        SaveDraft {
            name: String::new(),
            description: String::new(),
            collection: String::new(),
            field: SaveField::Name,
        }
    }
}

/// A dispatched request awaiting its outcome
#[derive(Clone, Debug)]
pub struct PendingSend {
    pub form: RequestForm,
    pub descriptor: RequestDescriptor,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    // Request being edited
    pub form: RequestForm,
    pub cursor_position: usize,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub selected_row: usize,
    pub kv_column: KvColumn,
    pub auth_field_index: usize,
    pub response_scroll: u16,
    pub show_response_headers: bool,

    // Response (replaced wholesale, never patched)
    pub response: Option<ResponseRecord>,

    // Dispatch bookkeeping
    pub next_request_id: u64,
    /// Newest dispatch; only its outcome reaches the display
    pub latest_dispatch: Option<u64>,
    pub in_flight: HashMap<u64, PendingSend>,
    pub pending_save: Option<u64>,

    // Feedback
    pub error: Option<String>,
    pub notice: Option<String>,
    pub diagnostics: Vec<String>,

    // History
    pub history: History,
    pub history_index: Option<usize>,

    // Popups
    pub show_help: bool,
    pub show_save: bool,
    pub save: SaveDraft,

    pub relay_url: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let form = RequestForm::default();
        let cursor_position = form.url.len();
        AppState {
            form,
            cursor_position,
            active_panel: Panel::Url,
            input_mode: InputMode::Normal,
            selected_row: 0,
            kv_column: KvColumn::Key,
            auth_field_index: 0,
            response_scroll: 0,
            show_response_headers: false,
            response: None,
            next_request_id: 1,
            latest_dispatch: None,
            in_flight: HashMap::new(),
            pending_save: None,
            error: None,
            notice: None,
            diagnostics: Vec::new(),
            history: History::new(),
            history_index: None,
            show_help: false,
            show_save: false,
            save: SaveDraft::default(),
            relay_url: String::new(),
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_loading(&self) -> bool {
        self.latest_dispatch
            .is_some_and(|id| self.in_flight.contains_key(&id))
    }

    /// The key/value rows shown in the active panel, if it has any
    pub fn active_rows(&self) -> Option<&KeyValueSet> {
        match self.active_panel {
            Panel::Params => Some(&self.form.params),
            Panel::Headers => Some(&self.form.headers),
            Panel::Body if self.form.body.mode() == BodyMode::Form => Some(&self.form.body.form),
            _ => None,
        }
    }

    pub fn active_rows_mut(&mut self) -> Option<&mut KeyValueSet> {
        match self.active_panel {
            Panel::Params => Some(&mut self.form.params),
            Panel::Headers => Some(&mut self.form.headers),
            Panel::Body if self.form.body.mode() == BodyMode::Form => Some(&mut self.form.body.form),
            _ => None,
        }
    }

    pub fn auth_field(&self) -> Option<AuthField> {
        let fields = self.form.auth.fields();
        if fields.is_empty() {
            None
        } else {
            Some(fields[self.auth_field_index % fields.len()])
        }
    }

    /// Get the current input field content
    pub fn current_input(&self) -> Option<&str> {
        match self.active_panel {
            Panel::Url => Some(&self.form.url),
            Panel::Auth => self.auth_field().map(|f| self.form.auth.field(f)),
            Panel::Body => match self.form.body.mode() {
                BodyMode::Json => Some(&self.form.body.json_text),
                BodyMode::Raw => Some(&self.form.body.raw_text),
                BodyMode::Form => self.current_row_text(),
                BodyMode::None => None,
            },
            Panel::Params | Panel::Headers => self.current_row_text(),
            Panel::Response => None,
        }
    }

    fn current_row_text(&self) -> Option<&str> {
        let rows = self.active_rows()?;
        let row = rows.rows().get(self.selected_row)?;
        Some(match self.kv_column {
            KvColumn::Key => &row.key,
            KvColumn::Value => &row.value,
        })
    }

    /// Get mutable reference to current input field
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        match self.active_panel {
            Panel::Url => Some(&mut self.form.url),
            Panel::Auth => {
                let field = self.auth_field()?;
                Some(self.form.auth.field_mut(field))
            }
            Panel::Body => match self.form.body.mode() {
                BodyMode::Json => Some(&mut self.form.body.json_text),
                BodyMode::Raw => Some(&mut self.form.body.raw_text),
                BodyMode::Form => self.current_row_text_mut(),
                BodyMode::None => None,
            },
            Panel::Params | Panel::Headers => self.current_row_text_mut(),
            Panel::Response => None,
        }
    }

    fn current_row_text_mut(&mut self) -> Option<&mut String> {
        let column = self.kv_column;
        let index = self.selected_row;
        let rows = self.active_rows_mut()?;
        let id = rows.id_at(index)?;
        let row = rows.get_mut(id)?;
        Some(match column {
            KvColumn::Key => &mut row.key,
            KvColumn::Value => &mut row.value,
        })
    }

    fn response_view(&self) -> Option<ResponseView> {
        self.response.as_ref().map(classify)
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let response = self.response_view();
        let response_text = match &response {
            Some(view) => {
                let plan = if self.show_response_headers {
                    &view.headers
                } else {
                    &view.body
                };
                render_plan(plan, Some(&PrettyText))
            }
            None => String::from("Press 's' to send your first request."),
        };

        RenderState {
            form: self.form.clone(),
            active_panel: self.active_panel,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            selected_row: self.selected_row,
            kv_column: self.kv_column,
            auth_field: self.auth_field(),
            response,
            response_text,
            show_response_headers: self.show_response_headers,
            response_scroll: self.response_scroll,
            is_loading: self.is_loading(),
            in_flight: self.in_flight.len(),
            error: self.error.clone(),
            notice: self.notice.clone(),
            diagnostics: self.diagnostics.clone(),
            history_index: self.history_index,
            history_len: self.history.len(),
            show_help: self.show_help,
            show_save: self.show_save,
            save_name: self.save.name.clone(),
            save_description: self.save.description.clone(),
            save_collection: self.save.collection.clone(),
            save_field: self.save.field,
            relay_url: self.relay_url.clone(),
        }
    }
}

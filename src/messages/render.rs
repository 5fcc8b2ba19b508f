//! Render state - data structure sent from App layer to UI for rendering

use crate::compose::{AuthField, RequestForm};
use crate::messages::ui_events::{InputMode, KvColumn, Panel, SaveField};
use crate::view::ResponseView;

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Request being edited
    pub form: RequestForm,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub selected_row: usize,
    pub kv_column: KvColumn,
    pub auth_field: Option<AuthField>,

    // Response
    pub response: Option<ResponseView>,
    pub response_text: String,
    pub show_response_headers: bool,
    pub response_scroll: u16,
    pub is_loading: bool,
    pub in_flight: usize,

    // Feedback
    pub error: Option<String>,
    pub notice: Option<String>,
    pub diagnostics: Vec<String>,

    // History
    pub history_index: Option<usize>,
    pub history_len: usize,

    // Popups
    pub show_help: bool,
    pub show_save: bool,
    pub save_name: String,
    pub save_description: String,
    pub save_collection: String,
    pub save_field: SaveField,

    pub relay_url: String,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            form: RequestForm::default(),
            active_panel: Panel::Url,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            selected_row: 0,
            kv_column: KvColumn::Key,
            auth_field: None,
            response: None,
            response_text: String::new(),
            show_response_headers: false,
            response_scroll: 0,
            is_loading: false,
            in_flight: 0,
            error: None,
            notice: None,
            diagnostics: Vec::new(),
            history_index: None,
            history_len: 0,
            show_help: false,
            show_save: false,
            save_name: String::new(),
            save_description: String::new(),
            save_collection: String::new(),
            save_field: SaveField::Name,
            relay_url: String::new(),
        }
    }
}

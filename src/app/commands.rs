//! Command handlers - business logic for processing UI events

use crate::app::{AppState, PendingSend};
use crate::compose::BodyMode;
use crate::messages::ui_events::{InputMode, KvColumn, Panel, SaveField};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::HistoryEntry;

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn next_panel(&mut self) {
        self.active_panel = self.active_panel.next();
        self.reset_selection();
    }

    pub fn prev_panel(&mut self) {
        self.active_panel = self.active_panel.prev();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.selected_row = 0;
        self.kv_column = KvColumn::Key;
        self.auth_field_index = 0;
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        // nothing to type into (auth none, body none, empty row list)
        let Some(len) = self.current_input().map(str::len) else {
            return;
        };
        self.input_mode = InputMode::Editing;
        self.cursor_position = len;
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Tab while editing: key <-> value on rows, next credential field on auth
    pub fn next_field(&mut self) {
        match self.active_panel {
            Panel::Auth => {
                self.auth_field_index = self.auth_field_index.wrapping_add(1);
            }
            _ if self.active_rows().is_some() => {
                self.kv_column = self.kv_column.toggle();
            }
            _ => return,
        }
        self.cursor_position = self.current_input().map(str::len).unwrap_or(0);
    }

    pub fn move_cursor_left(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let Some(input) = self.current_input() else {
            return;
        };
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            if cursor_pos <= input.len() {
                input.insert(cursor_pos, c);
                self.cursor_position = cursor_pos + c.len_utf8();
            }
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    // ========================
    // Request options
    // ========================

    pub fn cycle_method(&mut self) {
        self.form.method = self.form.method.next();
    }

    pub fn toggle_follow_redirects(&mut self) {
        self.form.options.follow_redirects = !self.form.options.follow_redirects;
    }

    pub fn toggle_verify_ssl(&mut self) {
        self.form.options.verify_ssl = !self.form.options.verify_ssl;
    }

    // ========================
    // Response scrolling
    // ========================

    pub fn scroll_up(&mut self) {
        self.response_scroll = self.response_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.response_scroll = self.response_scroll.saturating_add(1);
    }

    pub fn toggle_response_headers(&mut self) {
        self.show_response_headers = !self.show_response_headers;
        self.response_scroll = 0;
    }

    // ========================
    // Key/value rows
    // ========================

    pub fn next_row(&mut self) {
        if let Some(len) = self.active_rows().map(|r| r.len()).filter(|len| *len > 0) {
            self.selected_row = (self.selected_row + 1) % len;
        }
    }

    pub fn prev_row(&mut self) {
        if let Some(len) = self.active_rows().map(|r| r.len()).filter(|len| *len > 0) {
            self.selected_row = self.selected_row.checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// Append an empty row and start typing its key
    pub fn add_row(&mut self) {
        let Some(rows) = self.active_rows_mut() else {
            return;
        };
        rows.add();
        let last = rows.len() - 1;
        self.selected_row = last;
        self.kv_column = KvColumn::Key;
        self.input_mode = InputMode::Editing;
        self.cursor_position = 0;
    }

    pub fn delete_row(&mut self) {
        let index = self.selected_row;
        let Some(rows) = self.active_rows_mut() else {
            return;
        };
        if let Some(id) = rows.id_at(index) {
            rows.remove(id);
            if index > 0 && index >= rows.len() {
                self.selected_row = index - 1;
            }
        }
    }

    // ========================
    // Auth and body
    // ========================

    pub fn cycle_auth_mode(&mut self) {
        self.form.auth.cycle_mode();
        self.auth_field_index = 0;
    }

    pub fn toggle_api_key_location(&mut self) {
        self.form.auth.api_key.location = self.form.auth.api_key.location.toggle();
    }

    pub fn cycle_body_mode(&mut self) {
        self.form.body.cycle_mode();
        self.selected_row = 0;
        self.kv_column = KvColumn::Key;
        if self.form.body.mode() == BodyMode::Form && self.form.body.form.is_empty() {
            self.form.body.form.add();
        }
    }

    // ========================
    // History
    // ========================

    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let idx = match self.history_index {
            None => 0,
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(i) => i,
        };
        self.load_history(idx);
    }

    pub fn history_next(&mut self) {
        match self.history_index {
            Some(0) | None => {
                self.history_index = None;
            }
            Some(i) => self.load_history(i - 1),
        }
    }

    fn load_history(&mut self, idx: usize) {
        if let Some(entry) = self.history.get(idx) {
            self.form = entry.form.clone();
            self.history_index = Some(idx);
            self.cursor_position = self.form.url.len();
            self.reset_selection();
        }
    }

    // ========================
    // Save popup
    // ========================

    pub fn open_save(&mut self) {
        self.show_save = true;
        self.save.field = SaveField::Name;
    }

    pub fn cancel_save(&mut self) {
        self.show_save = false;
    }

    pub fn save_next_field(&mut self) {
        self.save.field = self.save.field.next();
    }

    fn save_input_mut(&mut self) -> &mut String {
        match self.save.field {
            SaveField::Name => &mut self.save.name,
            SaveField::Description => &mut self.save.description,
            SaveField::Collection => &mut self.save.collection,
        }
    }

    pub fn save_char(&mut self, c: char) {
        if self.save.field == SaveField::Collection && !c.is_ascii_digit() {
            return;
        }
        self.save_input_mut().push(c);
    }

    pub fn save_backspace(&mut self) {
        self.save_input_mut().pop();
    }

    /// Validate the popup and build the save command. Validation failures stay in the popup.
    pub fn prepare_save(&mut self) -> Option<NetworkCommand> {
        let collection_id = self.save.collection.trim().parse::<u64>().ok();
        let plan = match self
            .form
            .save_payload(&self.save.name, &self.save.description, collection_id)
        {
            Ok(plan) => plan,
            Err(err) => {
                self.error = Some(err.to_string());
                return None;
            }
        };

        self.diagnostics = plan.diagnostics.iter().map(|d| d.to_string()).collect();
        self.error = None;
        self.show_save = false;

        let id = self.next_id();
        self.pending_save = Some(id);
        self.notice = Some(String::from("Saving..."));
        Some(NetworkCommand::Save {
            id,
            collection_id: plan.collection_id,
            payload: plan.payload,
        })
    }

    // ========================
    // Request sending
    // ========================

    /// Compose the form and emit a dispatch.
    ///
    /// Sending while another request is in flight starts an independent
    /// request; the older one is not cancelled, its outcome is just ignored.
    pub fn prepare_request(&mut self) -> Option<NetworkCommand> {
        let composition = match self.form.compose() {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(error = %err, "Compose failed");
                self.error = Some(err.to_string());
                return None;
            }
        };

        self.diagnostics = composition
            .diagnostics
            .iter()
            .map(|d| d.to_string())
            .collect();
        self.error = None;
        self.notice = None;

        let id = self.next_id();
        self.latest_dispatch = Some(id);
        self.in_flight.insert(
            id,
            PendingSend {
                form: self.form.clone(),
                descriptor: composition.descriptor.clone(),
            },
        );

        Some(NetworkCommand::Dispatch {
            id,
            descriptor: composition.descriptor,
        })
    }

    // ========================
    // Popups
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        tracing::debug!(id = response.id(), "Network response");
        match response {
            NetworkResponse::Completed { id, record } => {
                self.record_history(id, record.status_code, None);
                if self.latest_dispatch == Some(id) {
                    self.response = Some(record);
                    self.response_scroll = 0;
                    self.error = None;
                } else {
                    tracing::debug!(id, "Dropping stale response");
                }
            }
            NetworkResponse::Failed { id, error } => {
                let message = error.to_string();
                self.record_history(id, None, Some(message.clone()));
                if self.latest_dispatch == Some(id) {
                    // the previous response stays on screen
                    self.error = Some(format!("Error: {}", message));
                } else {
                    tracing::debug!(id, "Dropping stale failure");
                }
            }
            NetworkResponse::Saved { id, saved } => {
                if self.pending_save == Some(id) {
                    self.pending_save = None;
                    self.notice = Some(match saved.id {
                        Some(request_id) => format!("Request saved successfully (id {})", request_id),
                        None => String::from("Request saved successfully"),
                    });
                    self.save = Default::default();
                }
            }
            NetworkResponse::SaveFailed { id, error } => {
                if self.pending_save == Some(id) {
                    self.pending_save = None;
                    self.notice = None;
                    self.error = Some(format!("Error saving request: {}", error));
                }
            }
        }
    }

    fn record_history(&mut self, id: u64, status_code: Option<i64>, error: Option<String>) {
        if let Some(pending) = self.in_flight.remove(&id) {
            self.history.push(HistoryEntry {
                form: pending.form,
                request: pending.descriptor,
                status_code,
                error,
                timestamp: chrono::Utc::now(),
            });
            self.history_index = None;
        }
    }
}

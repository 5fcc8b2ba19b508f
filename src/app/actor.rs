//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::ui_events::InputMode;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
        relay_url: String,
    ) -> Self {
        let mut state = AppState::new();
        state.relay_url = relay_url;
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        tracing::info!("Quit requested");
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send_command(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            if self.network_tx.send(cmd).is_err() {
                tracing::error!("Network actor is gone, command dropped");
            }
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Panel navigation
            UiEvent::NextPanel => self.state.next_panel(),
            UiEvent::PrevPanel => self.state.prev_panel(),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),

            // Input editing
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::NextField => self.state.next_field(),

            // Request actions
            UiEvent::CycleMethod => self.state.cycle_method(),
            UiEvent::ToggleFollowRedirects => self.state.toggle_follow_redirects(),
            UiEvent::ToggleVerifySsl => self.state.toggle_verify_ssl(),
            UiEvent::SendRequest => {
                if self.state.input_mode == InputMode::Editing {
                    self.state.stop_editing();
                }
                let cmd = self.state.prepare_request();
                self.send_command(cmd);
            }

            // Rows
            UiEvent::NextRow => self.state.next_row(),
            UiEvent::PrevRow => self.state.prev_row(),
            UiEvent::AddRow => self.state.add_row(),
            UiEvent::DeleteRow => self.state.delete_row(),

            // Auth and body
            UiEvent::CycleAuthMode => self.state.cycle_auth_mode(),
            UiEvent::ToggleApiKeyLocation => self.state.toggle_api_key_location(),
            UiEvent::CycleBodyMode => self.state.cycle_body_mode(),

            // Response
            UiEvent::ToggleResponseHeaders => self.state.toggle_response_headers(),

            // History
            UiEvent::HistoryPrev => self.state.history_prev(),
            UiEvent::HistoryNext => self.state.history_next(),

            // Save
            UiEvent::OpenSave => self.state.open_save(),
            UiEvent::SaveChar(c) => self.state.save_char(c),
            UiEvent::SaveBackspace => self.state.save_backspace(),
            UiEvent::SaveNextField => self.state.save_next_field(),
            UiEvent::SubmitSave => {
                let cmd = self.state.prepare_save();
                self.send_command(cmd);
            }
            UiEvent::CancelSave => self.state.cancel_save(),

            // Popups
            UiEvent::ToggleHelp => self.state.toggle_help(),
            UiEvent::CloseHelp => self.state.close_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_emits_dispatch() {
        let (net_tx, mut net_rx) = mpsc::unbounded_channel();
        let (render_tx, _render_rx) = mpsc::unbounded_channel();
        let mut actor = AppActor::new(net_tx, render_tx, "http://relay".into());

        assert!(!actor.handle_ui_event(UiEvent::SendRequest));
        match net_rx.try_recv() {
            Ok(NetworkCommand::Dispatch { id, .. }) => assert_eq!(id, 1),
            other => panic!("expected dispatch, got {:?}", other),
        }
        assert!(actor.handle_ui_event(UiEvent::Quit));
    }
}

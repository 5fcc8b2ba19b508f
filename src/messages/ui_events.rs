//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Panel navigation
    NextPanel,
    PrevPanel,
    ScrollUp,
    ScrollDown,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    NextField,

    // Request actions
    SendRequest,
    CycleMethod,
    ToggleFollowRedirects,
    ToggleVerifySsl,

    // Key/value rows (params, headers, form body)
    NextRow,
    PrevRow,
    AddRow,
    DeleteRow,

    // Auth and body
    CycleAuthMode,
    ToggleApiKeyLocation,
    CycleBodyMode,

    // Response
    ToggleResponseHeaders,

    // History
    HistoryPrev,
    HistoryNext,

    // Save popup
    OpenSave,
    SaveChar(char),
    SaveBackspace,
    SaveNextField,
    SubmitSave,
    CancelSave,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Active panel in the UI (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Panel {
    Url,
    Params,
    Headers,
    Auth,
    Body,
    Response,
}

impl Panel {
    pub fn next(&self) -> Panel {
        match self {
            Panel::Url => Panel::Params,
            Panel::Params => Panel::Headers,
            Panel::Headers => Panel::Auth,
            Panel::Auth => Panel::Body,
            Panel::Body => Panel::Response,
            Panel::Response => Panel::Url,
        }
    }

    pub fn prev(&self) -> Panel {
        match self {
            Panel::Url => Panel::Response,
            Panel::Params => Panel::Url,
            Panel::Headers => Panel::Params,
            Panel::Auth => Panel::Headers,
            Panel::Body => Panel::Auth,
            Panel::Response => Panel::Body,
        }
    }

    fn has_rows(&self) -> bool {
        matches!(self, Panel::Params | Panel::Headers | Panel::Body)
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Which half of a key/value row is being edited
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KvColumn {
    Key,
    Value,
}

impl KvColumn {
    pub fn toggle(&self) -> KvColumn {
        match self {
            KvColumn::Key => KvColumn::Value,
            KvColumn::Value => KvColumn::Key,
        }
    }
}

/// Field of the save popup
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SaveField {
    Name,
    Description,
    Collection,
}

impl SaveField {
    pub fn next(&self) -> SaveField {
        match self {
            SaveField::Name => SaveField::Description,
            SaveField::Description => SaveField::Collection,
            SaveField::Collection => SaveField::Name,
        }
    }
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_panel: Panel,
    input_mode: InputMode,
    show_help: bool,
    show_save: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Up if input_mode == InputMode::Normal => return Some(UiEvent::HistoryPrev),
            KeyCode::Down if input_mode == InputMode::Normal => return Some(UiEvent::HistoryNext),
            _ => {}
        }
    }

    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if show_save {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::CancelSave),
            KeyCode::Enter => Some(UiEvent::SubmitSave),
            KeyCode::Tab => Some(UiEvent::SaveNextField),
            KeyCode::Backspace => Some(UiEvent::SaveBackspace),
            KeyCode::Char(c) => Some(UiEvent::SaveChar(c)),
            _ => None,
        };
    }

    match input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => Some(UiEvent::Quit),
            KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
            KeyCode::Tab => Some(UiEvent::NextPanel),
            KeyCode::BackTab => Some(UiEvent::PrevPanel),
            KeyCode::Char('e') | KeyCode::Enter => match active_panel {
                Panel::Response => None,
                _ => Some(UiEvent::StartEditing),
            },
            KeyCode::Char('m') => Some(UiEvent::CycleMethod),
            KeyCode::Char('s') => Some(UiEvent::SendRequest),
            KeyCode::Char('w') => Some(UiEvent::OpenSave),
            KeyCode::Char('r') => Some(UiEvent::ToggleFollowRedirects),
            KeyCode::Char('v') => Some(UiEvent::ToggleVerifySsl),
            KeyCode::Up => match active_panel {
                p if p.has_rows() => Some(UiEvent::PrevRow),
                Panel::Auth => Some(UiEvent::NextField),
                Panel::Response => Some(UiEvent::ScrollUp),
                _ => None,
            },
            KeyCode::Down => match active_panel {
                p if p.has_rows() => Some(UiEvent::NextRow),
                Panel::Auth => Some(UiEvent::NextField),
                Panel::Response => Some(UiEvent::ScrollDown),
                _ => None,
            },
            KeyCode::Char('a') if active_panel.has_rows() => Some(UiEvent::AddRow),
            KeyCode::Char('d') if active_panel.has_rows() => Some(UiEvent::DeleteRow),
            KeyCode::Char('t') if active_panel == Panel::Auth => Some(UiEvent::CycleAuthMode),
            KeyCode::Char('l') if active_panel == Panel::Auth => Some(UiEvent::ToggleApiKeyLocation),
            KeyCode::Char('t') if active_panel == Panel::Body => Some(UiEvent::CycleBodyMode),
            KeyCode::Char('h') if active_panel == Panel::Response => {
                Some(UiEvent::ToggleResponseHeaders)
            }
            _ => None,
        },
        InputMode::Editing => match key.code {
            KeyCode::Esc => Some(UiEvent::StopEditing),
            KeyCode::Left => Some(UiEvent::CursorLeft),
            KeyCode::Right => Some(UiEvent::CursorRight),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::Enter => {
                if active_panel == Panel::Url {
                    Some(UiEvent::SendRequest)
                } else {
                    Some(UiEvent::StopEditing)
                }
            }
            _ => None,
        },
    }
}

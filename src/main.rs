//! Probe TUI - Actor-based request composer for a ProbeFlex-style relay
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async relay calls

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use probe_tui::compose::{AuthField, AuthMode, BodyMode};
use probe_tui::config::Config;
use probe_tui::constants::{APP_NAME, LOG_FILE_NAME};
use probe_tui::messages::ui_events::{key_to_ui_event, InputMode, KvColumn, Panel, SaveField};
use probe_tui::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use probe_tui::network::{NetworkActor, RelayClient};
use probe_tui::ui::{self, band_color, centered_rect, highlight_json, method_color};
use probe_tui::view::RenderPlan;
use probe_tui::AppActor;

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE_NAME);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = Config::load()?;
    if config.csrf_token.is_none() {
        tracing::warn!("No CSRF token configured, sends will be refused");
    }
    tracing::info!(relay = %config.relay_url, timeout_ms = config.timeout_ms, "Starting");
    let client = RelayClient::new(&config);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(client, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(net_cmd_tx, render_tx, config.relay_url.clone());
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_panel,
                    current_state.input_mode,
                    current_state.show_help,
                    current_state.show_save,
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Method + URL
            Constraint::Length(1),  // Panel tabs
            Constraint::Length(10), // Params/Headers/Auth/Body
            Constraint::Min(5),     // Response
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    draw_url_bar(f, state, chunks[0]);
    draw_panel_tabs(f, state, chunks[1]);
    draw_middle_panel(f, state, chunks[2]);
    draw_response(f, state, chunks[3]);
    draw_status_bar(f, state, chunks[4]);

    // Popups
    if state.show_help {
        draw_help_popup(f, area);
    }

    if state.show_save {
        draw_save_popup(f, state, area);
    }
}

fn is_editing(state: &RenderState, panel: Panel) -> bool {
    state.active_panel == panel && state.input_mode == InputMode::Editing
}

/// Display width of the text before the byte cursor
fn cursor_offset(text: &str, cursor: usize) -> u16 {
    text.get(..cursor.min(text.len()))
        .map(|s| s.chars().count())
        .unwrap_or(0) as u16
}

fn place_cursor(f: &mut Frame, area: Rect, x: u16, y: u16) {
    let max_x = area.x + area.width.saturating_sub(2);
    let max_y = area.y + area.height.saturating_sub(2);
    f.set_cursor_position(Position::new((area.x + 1 + x).min(max_x), (area.y + 1 + y).min(max_y)));
}

fn draw_url_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let form = &state.form;
    let is_focused = state.active_panel == Panel::Url;
    let mcolor = method_color(form.method);

    let border_style = if is_editing(state, Panel::Url) {
        Style::default().fg(Color::Yellow)
    } else if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let loading = if state.is_loading { " [...]" } else { "" };
    let history_indicator = state
        .history_index
        .map(|i| format!(" [history {}/{}]", i + 1, state.history_len))
        .unwrap_or_default();
    let flags = format!(
        " redirects:{} ssl:{} ",
        if form.options.follow_redirects { "on" } else { "off" },
        if form.options.verify_ssl { "on" } else { "off" },
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {}{}{} ", form.method.as_str(), loading, history_indicator),
            Style::default().fg(mcolor).bold(),
        ))
        .title(Line::from(flags).right_aligned());

    let input = Paragraph::new(form.url.as_str()).block(block);
    f.render_widget(input, area);

    if is_editing(state, Panel::Url) {
        place_cursor(f, area, cursor_offset(&form.url, state.cursor_position), 0);
    }
}

fn draw_panel_tabs(f: &mut Frame, state: &RenderState, area: Rect) {
    let titles = ["Params", "Headers", "Auth", "Body"];
    let tabs = ui::render_tabs(&titles, panel_tab_index(state.active_panel));
    f.render_widget(tabs, area);
}

fn panel_tab_index(panel: Panel) -> usize {
    match panel {
        Panel::Headers => 1,
        Panel::Auth => 2,
        Panel::Body => 3,
        Panel::Url | Panel::Params | Panel::Response => 0,
    }
}

fn draw_middle_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    match state.active_panel {
        Panel::Headers => draw_rows(f, state, area, Panel::Headers),
        Panel::Auth => draw_auth_panel(f, state, area),
        Panel::Body => draw_body_panel(f, state, area),
        Panel::Url | Panel::Params | Panel::Response => draw_rows(f, state, area, Panel::Params),
    }
}

fn draw_rows(f: &mut Frame, state: &RenderState, area: Rect, panel: Panel) {
    let form = &state.form;
    let (rows, title) = match panel {
        Panel::Headers => (&form.headers, " Headers (a:add d:del e:edit) "),
        Panel::Body => (&form.body.form, " Body: form (a:add d:del e:edit t:mode) "),
        _ if form.method.is_paramless() => (&form.params, " Params (a:add d:del e:edit) "),
        _ => (&form.params, " Params (sent as relay params) "),
    };
    let is_focused = state.active_panel == panel;

    let list = ui::render_key_value_list(
        rows,
        title,
        Some(state.selected_row),
        state.kv_column,
        is_focused,
    );
    f.render_widget(list, area);

    if is_editing(state, panel) {
        if let Some(row) = rows.rows().get(state.selected_row) {
            let key_width = if row.key.is_empty() { 5 } else { row.key.chars().count() as u16 };
            let x = match state.kv_column {
                KvColumn::Key => 2 + cursor_offset(&row.key, state.cursor_position),
                KvColumn::Value => 2 + key_width + 2 + cursor_offset(&row.value, state.cursor_position),
            };
            place_cursor(f, area, x, state.selected_row as u16);
        }
    }
}

fn auth_label(field: AuthField) -> &'static str {
    match field {
        AuthField::Username => "Username",
        AuthField::Password => "Password",
        AuthField::Token => "Token",
        AuthField::KeyName => "Key",
        AuthField::KeyValue => "Value",
    }
}

fn draw_auth_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let auth = &state.form.auth;
    let is_focused = state.active_panel == Panel::Auth;
    const LABEL_WIDTH: u16 = 12;

    let mut lines: Vec<Line> = Vec::new();
    if auth.mode() == AuthMode::None {
        lines.push(Line::from(Span::styled(
            "No auth. Press 't' to cycle auth type.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for &field in auth.fields() {
        let value = auth.field(field);
        let shown = if field == AuthField::Password {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let selected = is_focused && state.auth_field == Some(field);
        let label_style = if selected {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", format!("{}:", auth_label(field)), width = LABEL_WIDTH as usize), label_style),
            Span::raw(if shown.is_empty() { String::from("<empty>") } else { shown }),
        ]));
    }

    if auth.mode() == AuthMode::ApiKey {
        lines.push(Line::from(Span::styled(
            format!("Add to:     {} (l:toggle)", auth.api_key.location.as_str()),
            Style::default().fg(Color::Gray),
        )));
    }

    let title = format!(" Auth: {} (t:cycle) ", auth.mode().as_str());
    let block = ui::focus_block(&title, is_focused);
    f.render_widget(Paragraph::new(lines).block(block), area);

    if is_editing(state, Panel::Auth) {
        if let Some(field) = state.auth_field {
            let row = auth.fields().iter().position(|candidate| *candidate == field).unwrap_or(0) as u16;
            let x = LABEL_WIDTH + cursor_offset(auth.field(field), state.cursor_position);
            place_cursor(f, area, x, row);
        }
    }
}

fn draw_body_panel(f: &mut Frame, state: &RenderState, area: Rect) {
    let body = &state.form.body;
    let is_focused = state.active_panel == Panel::Body;

    let (text, highlighted) = match body.mode() {
        BodyMode::Form => {
            draw_rows(f, state, area, Panel::Body);
            return;
        }
        BodyMode::None => {
            let hint = Paragraph::new(Span::styled(
                "No body. Press 't' to cycle body type.",
                Style::default().fg(Color::DarkGray),
            ));
            let block = ui::focus_block(" Body: none (t:mode) ", is_focused);
            f.render_widget(hint.block(block), area);
            return;
        }
        BodyMode::Json => (body.json_text.as_str(), true),
        BodyMode::Raw => (body.raw_text.as_str(), false),
    };

    let title = format!(" Body: {} (e:edit t:mode) ", body.mode().as_str());
    let block = ui::focus_block(&title, is_focused);
    let content = if highlighted {
        Paragraph::new(highlight_json(text))
    } else {
        Paragraph::new(text)
    };
    f.render_widget(content.block(block), area);

    if is_editing(state, Panel::Body) {
        let before = text.get(..state.cursor_position.min(text.len())).unwrap_or("");
        let row = before.matches('\n').count() as u16;
        let col = before.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) as u16;
        place_cursor(f, area, col, row);
    }
}

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Response;
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let section = if state.show_response_headers { "Headers" } else { "Body" };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines = match &state.response {
        Some(view) => {
            block = block
                .title(Span::styled(
                    format!(" {} ", view.status_label),
                    Style::default().fg(band_color(view.band)).bold(),
                ))
                .title(format!(" {} (h:toggle) ", section))
                .title_bottom(Line::from(format!(" {} ", view.elapsed_label)).right_aligned());

            let plan = if state.show_response_headers { &view.headers } else { &view.body };
            match plan {
                RenderPlan::Tree(_) => highlight_json(&state.response_text),
                RenderPlan::Text(_) => state
                    .response_text
                    .lines()
                    .map(|l| Line::from(l.to_string()))
                    .collect(),
            }
        }
        None => {
            block = block.title(" Response ");
            vec![Line::from(Span::styled(
                state.response_text.clone(),
                Style::default().fg(Color::DarkGray),
            ))]
        }
    };

    if state.is_loading {
        block = block.title(Line::from(" sending... ").right_aligned());
    }

    let response = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(response, area);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let (text, color) = if let Some(error) = &state.error {
        (format!(" {} ", error), Color::Red)
    } else if let Some(notice) = &state.notice {
        (format!(" {} ", notice), Color::Green)
    } else if let Some(first) = state.diagnostics.first() {
        (format!(" warning: {} ", first), Color::Yellow)
    } else if state.is_loading {
        (format!(" Sending via {} ({} in flight) ", state.relay_url, state.in_flight), Color::DarkGray)
    } else if state.input_mode == InputMode::Editing {
        (String::from(" ESC:stop editing | arrows:move | Tab:next field "), Color::DarkGray)
    } else {
        (
            format!(" Tab:panel | e:edit | m:method | s:send | w:save | ?:help | q:quit | relay {} ", state.relay_url),
            Color::DarkGray,
        )
    };

    let bar = Paragraph::new(text).style(Style::default().fg(color));
    f.render_widget(bar, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = format!(
        r#"
 {} - Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Switch panels
   Up / Down          Select row / scroll response
   Ctrl+Up / Down     Navigate history

 REQUEST
   m                  Cycle HTTP method
   s                  Send request
   e / Enter          Edit current field
   r                  Toggle follow redirects
   v                  Toggle SSL verification
   w                  Save to collection

 PARAMS / HEADERS / FORM BODY
   a                  Add row
   d                  Delete selected row
   Tab (editing)      Switch key / value

 AUTH
   t                  Cycle auth type
   l                  API key: header / query
   Tab (editing)      Next credential field

 BODY
   t                  Cycle none / json / form / raw

 RESPONSE
   h                  Show headers / body

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#,
        APP_NAME
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_save_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(60, 30, area);

    let field_line = |label: &str, value: &str, field: SaveField| {
        let style = if state.save_field == field {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(format!(" {:<13}", label), style),
            Span::raw(value.to_string()),
        ])
    };

    let lines = vec![
        Line::from(""),
        field_line("Name:", &state.save_name, SaveField::Name),
        field_line("Description:", &state.save_description, SaveField::Description),
        field_line("Collection #:", &state.save_collection, SaveField::Collection),
        Line::from(""),
        Line::from(Span::styled(
            " Tab:next field | Enter:save | Esc:cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Save Request ")
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(lines).block(block), popup_area);
}

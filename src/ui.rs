//! Reusable widgets and colors for the terminal UI

use ratatui::{prelude::*, widgets::*};

use crate::compose::KeyValueSet;
use crate::messages::ui_events::KvColumn;
use crate::models::HttpMethod;
use crate::view::StatusBand;

/// Bordered block, yellow when focused
pub fn focus_block(title: &str, is_focused: bool) -> Block<'_> {
    let style = if is_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

/// Renders a key/value row list (params, headers, form body).
///
/// The selected row shows which column is being edited.
pub fn render_key_value_list<'a>(
    rows: &'a KeyValueSet,
    title: &'a str,
    selected: Option<usize>,
    column: KvColumn,
    is_focused: bool,
) -> List<'a> {
    let items: Vec<ListItem> = if rows.is_empty() {
        vec![ListItem::new("(empty, press 'a' to add)").style(Style::default().fg(Color::DarkGray))]
    } else {
        rows.rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let key = if row.key.is_empty() { "<key>" } else { row.key.as_str() };
                if Some(i) == selected && is_focused {
                    let (key_style, value_style) = match column {
                        KvColumn::Key => (Style::default().fg(Color::Yellow).bold(), Style::default()),
                        KvColumn::Value => (Style::default(), Style::default().fg(Color::Yellow).bold()),
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw("> "),
                        Span::styled(key, key_style),
                        Span::raw(": "),
                        Span::styled(row.value.as_str(), value_style),
                    ]))
                } else {
                    let style = if row.key.trim().is_empty() {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    ListItem::new(format!("  {}: {}", key, row.value)).style(style)
                }
            })
            .collect()
    };

    List::new(items).block(focus_block(title, is_focused))
}

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Simple JSON syntax highlighting, line by line
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines().map(highlight_json_line).collect()
}

fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                flush_plain(&mut spans, &mut current);
                let mut literal = String::from('"');
                let mut escaped = false;
                for s in chars.by_ref() {
                    literal.push(s);
                    if escaped {
                        escaped = false;
                    } else if s == '\\' {
                        escaped = true;
                    } else if s == '"' {
                        break;
                    }
                }
                let is_key = chars.clone().find(|c| !c.is_whitespace()) == Some(':');
                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(literal, Style::default().fg(color)));
            }
            '{' | '}' | '[' | ']' => {
                flush_plain(&mut spans, &mut current);
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
            }
            ':' | ',' => {
                flush_plain(&mut spans, &mut current);
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::White)));
            }
            _ => current.push(c),
        }
    }
    flush_plain(&mut spans, &mut current);

    Line::from(spans)
}

/// Emit buffered bare tokens: numbers, literals, whitespace
fn flush_plain(spans: &mut Vec<Span<'static>>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    let trimmed = token.trim();
    let style = match trimmed {
        "true" | "false" | "null" => Style::default().fg(Color::Magenta),
        t if !t.is_empty() && t.parse::<f64>().is_ok() => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    };
    spans.push(Span::styled(token, style));
}

/// Status badge color
pub fn band_color(band: StatusBand) -> Color {
    match band {
        StatusBand::Success => Color::Green,
        StatusBand::Redirect => Color::Cyan,
        StatusBand::ClientError => Color::Red,
        StatusBand::ServerError => Color::Magenta,
        StatusBand::Neutral => Color::Yellow,
    }
}

/// Method color
pub fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::GET => Color::Green,
        HttpMethod::POST => Color::Yellow,
        HttpMethod::PUT => Color::Blue,
        HttpMethod::PATCH => Color::Cyan,
        HttpMethod::DELETE => Color::Red,
        HttpMethod::HEAD | HttpMethod::OPTIONS => Color::White,
    }
}

/// Helper to create centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_keys_and_values_colored_differently() {
        let lines = highlight_json(r#"  "name": "a:b","#);
        let line = &lines[0];
        let key = line.spans.iter().find(|s| s.content == "\"name\"").unwrap();
        let value = line.spans.iter().find(|s| s.content == "\"a:b\"").unwrap();
        assert_eq!(key.style.fg, Some(Color::Cyan));
        assert_eq!(value.style.fg, Some(Color::Green));
    }

    #[test]
    fn test_highlight_preserves_text() {
        let input = r#"{"n": -1.5, "ok": true, "s": "q\"x"}"#;
        let lines = highlight_json(input);
        assert_eq!(texts(&lines[0]).concat(), input);
    }

    #[test]
    fn test_band_colors() {
        assert_eq!(band_color(StatusBand::from_code(Some(204))), Color::Green);
        assert_eq!(band_color(StatusBand::from_code(None)), Color::Yellow);
    }
}

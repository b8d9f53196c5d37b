use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};
use crate::utils::truncate_string;

use super::styles;
use super::tabs::{banks, dashboard, donations, donors, requests};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

/// Columns between the left text and the right-aligned hint. Measured in
/// chars, not bytes; display names can carry multibyte characters.
fn title_gap(area_width: usize, title: &str, account: &str, hint: &str) -> usize {
    area_width.saturating_sub(
        title.chars().count() + account.chars().count() + 2 + hint.chars().count() + 4,
    )
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  hemodesk";
    let help_hint = "[?] Help";

    let account = match app.me {
        Some(ref user) => format!("{} ({})", user.display_name(), user.role),
        None => "not signed in".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(format!("  {}", account), styles::muted_style()),
        Span::raw(" ".repeat(title_gap(
            area.width as usize,
            title,
            &account,
            help_hint,
        ))),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let main_tabs = vec![
        ("[1] Dashboard", app.current_tab == Tab::Dashboard),
        ("[2] Donations", app.current_tab == Tab::Donations),
        ("[3] Requests", app.current_tab == Tab::Requests),
        ("[4] Banks", app.current_tab == Tab::Banks),
        ("[5] Donors", app.current_tab == Tab::Donors),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in main_tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    // Active search query shows on the right of the tab bar
    if !app.search_query.is_empty() || app.state == AppState::Searching {
        let search_text = format!("/{}", app.search_query);
        let main_width: usize = spans.iter().map(|s| s.content.len()).sum();
        let padding = (area.width as usize).saturating_sub(main_width + search_text.len() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(search_text, styles::search_style()));
    }

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Donations => donations::render(frame, app, area),
        Tab::Requests => requests::render(frame, app, area),
        Tab::Banks => banks::render(frame, app, area),
        Tab::Donors => donors::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.is_admin() {
        "[a]pprove | [u]pdate | [q]uit"
    } else {
        "[u]pdate | [q]uit"
    };

    let left_text = if let Some(ref msg) = app.status_message {
        // Long server errors must not push the shortcuts off screen
        let budget = (area.width as usize).saturating_sub(34).max(20);
        format!(" {} ", truncate_string(msg, budget))
    } else if app.refreshing {
        " Refreshing... ".to_string()
    } else {
        let (donations, requests) = app.pending_counts();
        format!(" {} donations / {} requests pending ", donations, requests)
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    // Fixed size dialog matching login/quit overlays
    let area = centered_rect_fixed(52, 26, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = vec![
        Line::from(Span::styled(
            "      ┬ ┬┌─┐┌┬┐┌─┐┌┬┐┌─┐┌─┐┬┌─",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "      ├─┤├┤ ││││ │ ││├┤ └─┐├┴┐",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "      ┴ ┴└─┘┴ ┴└─┘─┴┘└─┘└─┘┴ ┴",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-5       ", styles::help_key_style()),
            Span::styled("Switch tabs", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", styles::help_key_style()),
            Span::styled("Prev/next tab", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", styles::help_key_style()),
            Span::styled("Navigate list", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  /         ", styles::help_key_style()),
            Span::styled("Search", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  u         ", styles::help_key_style()),
            Span::styled("Refresh data from server", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  L         ", styles::help_key_style()),
            Span::styled("Log out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Donors Tab", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  n/g/c     ", styles::help_key_style()),
            Span::styled("Sort by name/group/city", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  f/v       ", styles::help_key_style()),
            Span::styled("Filter by blood group / availability", styles::help_desc_style()),
        ]),
    ];

    if app.is_admin() {
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(" Admin", styles::highlight_style())));
        help_text.push(Line::from(vec![
            Span::styled("  a / x     ", styles::help_key_style()),
            Span::styled("Approve / reject selected record", styles::help_desc_style()),
        ]));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![
        Span::styled("       Press ", styles::muted_style()),
        Span::styled("?", styles::help_key_style()),
        Span::styled(" or ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" to close", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    // Fixed size dialog - compact
    let height = if app.login_error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(46, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = vec![];

    lines.push(Line::from(Span::styled(
        "       ┬ ┬┌─┐┌┬┐┌─┐┌┬┐┌─┐┌─┐┬┌─",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "       ├─┤├┤ ││││ │ ││├┤ └─┐├┴┐",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "       ┴ ┴└─┘┴ ┴└─┘─┴┘└─┘└─┘┴ ┴",
        styles::title_style(),
    )));
    lines.push(Line::from(""));

    // Username field (46 width - 2 borders = 44 interior, field ~31 chars)
    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let username_display = format!("{:<16}", app.login_username);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(format!("{}{}", username_display, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Password field
    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.len().min(16));
    let password_display = format!("{:<16}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Login button
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    if button_focused {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled(" ▶ Login ◀ ", button_style),
            Span::raw("]"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled("   Login   ", button_style),
            Span::raw("]"),
        ]));
    }

    // Error message
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    // Fixed size dialog matching login screen
    let area = centered_rect_fixed(46, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "       ┬ ┬┌─┐┌┬┐┌─┐┌┬┐┌─┐┌─┐┬┌─",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "       ├─┤├┤ ││││ │ ││├┤ └─┐├┴┐",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "       ┴ ┴└─┘┴ ┴└─┘─┴┘└─┘└─┘┴ ┴",
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_gap_counts_chars_not_bytes() {
        let ascii = title_gap(80, "  hemodesk", "Dana Reyes (donor)", "[?] Help");
        // Same char count, more bytes; the hint must land in the same column
        let accented = title_gap(80, "  hemodesk", "Dána Réyes (donor)", "[?] Help");
        assert_eq!(ascii, accented);
    }

    #[test]
    fn test_title_gap_never_underflows() {
        assert_eq!(title_gap(10, "  hemodesk", "a very long account name", "[?] Help"), 0);
    }
}

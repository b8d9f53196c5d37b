use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_donor_list(frame, app, chunks[0]);
    render_donor_detail(frame, app, chunks[1]);
}

fn render_donor_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header_cells = [
        Cell::from("Name"),
        Cell::from("Group"),
        Cell::from("City"),
        Cell::from("Available"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let sorted = app.sorted_donors();

    let rows: Vec<Row> = sorted
        .iter()
        .enumerate()
        .map(|(i, donor)| {
            let style = if i == app.donor_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let available = if donor.available {
                Span::styled("yes", styles::success_style())
            } else {
                Span::styled("no", styles::muted_style())
            };

            Row::new(vec![
                Cell::from(donor.display_name()),
                Cell::from(donor.blood_group.as_str()),
                Cell::from(donor.city_or_dash()),
                Cell::from(available),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(38),
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(10),
    ];

    // Show active filters in the panel title
    let mut filters = String::new();
    if let Some(group) = app.donor_group_filter {
        filters.push_str(&format!(" [{}]", group));
    }
    if app.donor_available_only {
        filters.push_str(" [available]");
    }

    let sort_help = "[n]ame [g]roup [c]ity [f]ilter [v]";
    let title = format!(" Donors ({}){} - {} ", sorted.len(), filters, sort_help);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.donor_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_donor_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let sorted = app.sorted_donors();
    let selected = sorted.get(app.donor_selection).copied();

    let lines = match selected {
        Some(donor) => {
            let mut lines = vec![
                Line::from(Span::styled(donor.display_name(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Group:        ", styles::muted_style()),
                    Span::raw(donor.blood_group.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("City:         ", styles::muted_style()),
                    Span::raw(donor.city_or_dash()),
                ]),
            ];

            if let Some(ref phone) = donor.phone {
                if !phone.is_empty() {
                    lines.push(Line::from(vec![
                        Span::styled("Phone:        ", styles::muted_style()),
                        Span::raw(phone.as_str()),
                    ]));
                }
            }

            if let Some(ref email) = donor.user.email {
                if !email.is_empty() {
                    lines.push(Line::from(vec![
                        Span::styled("Email:        ", styles::muted_style()),
                        Span::raw(email.as_str()),
                    ]));
                }
            }

            let last_donated = donor
                .last_donated
                .map(|d| d.format("%b %d, %Y").to_string())
                .unwrap_or_else(|| "never".to_string());
            lines.push(Line::from(vec![
                Span::styled("Last donated: ", styles::muted_style()),
                Span::raw(last_donated),
            ]));

            lines.push(Line::from(vec![
                Span::styled("Available:    ", styles::muted_style()),
                if donor.available {
                    Span::styled("yes", styles::success_style())
                } else {
                    Span::styled("no", styles::muted_style())
                },
            ]));

            lines
        }
        None => vec![Line::from(Span::styled(
            "No matching donors",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Detail ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

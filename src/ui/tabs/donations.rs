use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::format_date;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_donation_list(frame, app, chunks[0]);
    render_donation_detail(frame, app, chunks[1]);
}

fn render_donation_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header_cells = [
        Cell::from("Donor"),
        Cell::from("Group"),
        Cell::from("Units"),
        Cell::from("Status"),
        Cell::from("Date"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let visible = app.visible_donations();

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, donation)| {
            let style = if i == app.donation_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(donation.donor_name()),
                Cell::from(donation.blood_group.as_str()),
                Cell::from(donation.units.to_string()),
                Cell::from(Span::styled(
                    donation.status_label(),
                    styles::status_label_style(donation.status_label()),
                )),
                Cell::from(format_date(&donation.created_at.to_rfc3339())),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(34),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Fill(1),
    ];

    let title = if app.is_admin() {
        format!(" Donations ({}) - [a]pprove ", visible.len())
    } else {
        format!(" Donations ({}) ", visible.len())
    };

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
    state.select(Some(app.donation_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_donation_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let visible = app.visible_donations();
    let selected = visible.get(app.donation_selection).copied();

    let lines = match selected {
        Some(donation) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("Donation #{}", donation.id),
                    styles::title_style(),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Donor:  ", styles::muted_style()),
                    Span::raw(donation.donor_name()),
                ]),
                Line::from(vec![
                    Span::styled("Group:  ", styles::muted_style()),
                    Span::raw(donation.blood_group.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Units:  ", styles::muted_style()),
                    Span::raw(donation.units.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Status: ", styles::muted_style()),
                    Span::styled(
                        donation.status_label(),
                        styles::status_label_style(donation.status_label()),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Date:   ", styles::muted_style()),
                    Span::raw(format_date(&donation.created_at.to_rfc3339())),
                ]),
            ];

            if let Some(bank_id) = donation.blood_bank {
                let bank_name = app
                    .banks
                    .iter()
                    .find(|b| b.id == bank_id)
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| format!("#{}", bank_id));
                lines.push(Line::from(vec![
                    Span::styled("Bank:   ", styles::muted_style()),
                    Span::raw(bank_name),
                ]));
            }

            if app.is_admin() && !donation.approved {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Press ", styles::muted_style()),
                    Span::styled("a", styles::help_key_style()),
                    Span::styled(" to approve", styles::muted_style()),
                ]));
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "No donations",
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

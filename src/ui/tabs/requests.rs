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

    render_request_list(frame, app, chunks[0]);
    render_request_detail(frame, app, chunks[1]);
}

fn render_request_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header_cells = [
        Cell::from("Requester"),
        Cell::from("Group"),
        Cell::from("Units"),
        Cell::from("Status"),
        Cell::from("Date"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let visible = app.visible_requests();

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, request)| {
            let style = if i == app.request_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(request.requester_name()),
                Cell::from(request.blood_group.as_str()),
                Cell::from(request.units.to_string()),
                Cell::from(Span::styled(
                    request.status.as_str(),
                    styles::status_label_style(request.status.as_str()),
                )),
                Cell::from(format_date(&request.created_at.to_rfc3339())),
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
        format!(" Requests ({}) - [a]pprove [x] reject ", visible.len())
    } else {
        format!(" Requests ({}) ", visible.len())
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
    state.select(Some(app.request_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_request_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let visible = app.visible_requests();
    let selected = visible.get(app.request_selection).copied();

    let lines = match selected {
        Some(request) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("Request #{}", request.id),
                    styles::title_style(),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Requester: ", styles::muted_style()),
                    Span::raw(request.requester_name()),
                ]),
                Line::from(vec![
                    Span::styled("Group:     ", styles::muted_style()),
                    Span::raw(request.blood_group.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Units:     ", styles::muted_style()),
                    Span::raw(request.units.to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Status:    ", styles::muted_style()),
                    Span::styled(
                        request.status.as_str(),
                        styles::status_label_style(request.status.as_str()),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Date:      ", styles::muted_style()),
                    Span::raw(format_date(&request.created_at.to_rfc3339())),
                ]),
            ];

            // Show how much matching stock exists across all banks
            let stock: u32 = app
                .banks
                .iter()
                .map(|b| b.units_for(request.blood_group))
                .sum();
            lines.push(Line::from(vec![
                Span::styled("In stock:  ", styles::muted_style()),
                Span::styled(format!("{} units", stock), styles::stock_style(stock)),
            ]));

            if app.is_admin() && request.is_pending() {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Press ", styles::muted_style()),
                    Span::styled("a", styles::help_key_style()),
                    Span::styled(" to approve, ", styles::muted_style()),
                    Span::styled("x", styles::help_key_style()),
                    Span::styled(" to reject", styles::muted_style()),
                ]));
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "No blood requests",
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

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::BloodGroup;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_bank_list(frame, app, chunks[0]);
    render_bank_detail(frame, app, chunks[1]);
}

fn render_bank_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header_cells = [Cell::from("Name"), Cell::from("City"), Cell::from("Units")];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let visible = app.visible_banks();

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, bank)| {
            let style = if i == app.bank_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(bank.name.as_str()),
                Cell::from(bank.city.as_str()),
                Cell::from(bank.total_units().to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(45),
        Constraint::Fill(1),
        Constraint::Length(8),
    ];

    let title = format!(" Blood Banks ({}) ", visible.len());

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
    state.select(Some(app.bank_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_bank_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let visible = app.visible_banks();
    let selected = visible.get(app.bank_selection).copied();

    let lines = match selected {
        Some(bank) => {
            let mut lines = vec![
                Line::from(Span::styled(&bank.name, styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("City:    ", styles::muted_style()),
                    Span::raw(bank.city.as_str()),
                ]),
            ];

            if let Some(ref address) = bank.address {
                if !address.is_empty() {
                    lines.push(Line::from(vec![
                        Span::styled("Address: ", styles::muted_style()),
                        Span::raw(address.as_str()),
                    ]));
                }
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Inventory",
                styles::highlight_style(),
            )));

            for group in BloodGroup::ALL {
                let units = bank.units_for(group);
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<4}", group.as_str()), styles::muted_style()),
                    Span::styled(format!("{:>4} ", units), styles::stock_style(units)),
                    Span::styled(
                        "█".repeat((units as usize).min(30)),
                        styles::stock_style(units),
                    ),
                ]));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  Total ", styles::muted_style()),
                Span::styled(
                    format!("{} units", bank.total_units()),
                    styles::highlight_style(),
                ),
            ]));

            lines
        }
        None => vec![Line::from(Span::styled(
            "No blood banks",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Inventory ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{BloodGroup, RequestStatus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_summary(frame, app, chunks[0]);
    render_stock_chart(frame, app, chunks[1]);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    if app.is_admin() {
        lines.push(Line::from(Span::styled("Overview", styles::title_style())));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Registered donors:  ", styles::muted_style()),
            Span::styled(
                app.dashboard.total_donors.to_string(),
                styles::highlight_style(),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Pending requests:   ", styles::muted_style()),
            Span::styled(
                app.dashboard.pending_requests.to_string(),
                styles::highlight_style(),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Units in stock:     ", styles::muted_style()),
            Span::styled(
                app.dashboard.total_units().to_string(),
                styles::highlight_style(),
            ),
        ]));

        let pending_donations = app.donations.iter().filter(|d| !d.approved).count();
        lines.push(Line::from(vec![
            Span::styled("Pending donations:  ", styles::muted_style()),
            Span::styled(pending_donations.to_string(), styles::highlight_style()),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "My Activity",
            styles::title_style(),
        )));
        lines.push(Line::from(""));

        let my_id = app.me.as_ref().map(|u| u.id);
        let my_donations = app
            .donations
            .iter()
            .filter(|d| d.donor.as_ref().map(|u| u.id) == my_id)
            .count();
        let my_requests: Vec<_> = app
            .requests
            .iter()
            .filter(|r| r.requester.as_ref().map(|u| u.id) == my_id)
            .collect();
        let my_pending = my_requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count();

        lines.push(Line::from(vec![
            Span::styled("My donations:       ", styles::muted_style()),
            Span::styled(my_donations.to_string(), styles::highlight_style()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("My requests:        ", styles::muted_style()),
            Span::styled(my_requests.len().to_string(), styles::highlight_style()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Awaiting review:    ", styles::muted_style()),
            Span::styled(my_pending.to_string(), styles::highlight_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Blood banks:        ", styles::muted_style()),
        Span::styled(app.banks.len().to_string(), styles::highlight_style()),
    ]));

    let block = Block::default()
        .title(" Summary ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Per-group stock bars. Admins see the server aggregate; other roles
/// see the sum of visible bank inventories.
fn render_stock_chart(frame: &mut Frame, app: &App, area: Rect) {
    let stock: Vec<(BloodGroup, u32)> = BloodGroup::ALL
        .iter()
        .map(|&group| {
            let units = if app.is_admin() && !app.dashboard.available_units.is_empty() {
                app.dashboard
                    .available_units
                    .get(&group)
                    .copied()
                    .unwrap_or(0)
            } else {
                app.banks.iter().map(|b| b.units_for(group)).sum()
            };
            (group, units)
        })
        .collect();

    let max_bar = (area.width as usize).saturating_sub(16).max(10);

    let mut lines = vec![];
    for (group, units) in &stock {
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<4}", group.as_str()), styles::muted_style()),
            Span::styled(format!("{:>4} ", units), styles::stock_style(*units)),
            Span::styled(
                "█".repeat((*units as usize).min(max_bar)),
                styles::stock_style(*units),
            ),
        ]));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(" Available Units by Group ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

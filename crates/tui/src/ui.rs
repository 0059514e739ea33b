//! Rendering for the dashboard: chrome, survey list, open regions and the
//! shortcut diagnostics overlay.

use chordchain_engine::ChainExecutionResult;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::dashboard::survey::{ACCOUNT_MENU_ITEMS, NAV_ITEMS};
use crate::dashboard::{Dashboard, Region};

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;
const ERROR: Color = Color::Red;
const RECENT_RESULTS: usize = 6;

fn title_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

fn selected_style() -> Style {
    Style::default().fg(Color::Black).bg(ACCENT)
}

/// Returns a rectangle centered in `r` sized by percentage.
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

pub fn draw(frame: &mut Frame, dashboard: &Dashboard) {
    let state = dashboard.state();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)])
        .split(frame.area());

    render_header(frame, rows[0], dashboard);

    let sidebar_width = if state.is_open(Region::Navigation) { 22 } else { 0 };
    let overlay_width = if state.is_open(Region::Overlay) { 48 } else { 0 };
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(sidebar_width),
            Constraint::Min(20),
            Constraint::Length(overlay_width),
        ])
        .split(rows[1]);

    if sidebar_width > 0 {
        render_nav_panel(frame, body[0], dashboard);
    }
    render_survey_page(frame, body[1], dashboard);
    if overlay_width > 0 {
        render_diagnostics(frame, body[2], dashboard);
    }
    render_footer(frame, rows[2], dashboard);

    if state.is_open(Region::AccountMenu) {
        render_account_menu(frame, rows[1], dashboard);
    }
    if state.is_open(Region::Modal) {
        render_modal(frame, frame.area(), dashboard);
    }
}

fn render_header(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let section = dashboard.state().nav_item();
    let line = Line::from(vec![
        Span::styled("Chordchain", title_style()),
        Span::raw("  /  "),
        Span::raw(section),
        Span::styled("   [m] account  [Ctrl+b] menu  [F12] diagnostics", Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
}

fn render_nav_panel(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let items: Vec<ListItem> = NAV_ITEMS.iter().map(|item| ListItem::new(*item)).collect();
    let mut list_state = ListState::default().with_selected(Some(dashboard.state().nav_index()));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(Span::styled("Navigation", title_style())))
        .highlight_style(selected_style());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_survey_page(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let state = dashboard.state();
    let items: Vec<ListItem> = state
        .surveys()
        .iter()
        .map(|survey| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<28}", survey.title)),
                Span::styled(format!("{:>6} responses", survey.responses), Style::default().fg(MUTED)),
                Span::raw(format!("  {:>3}% complete", survey.completion)),
            ]))
        })
        .collect();
    let selected = (!state.surveys().is_empty()).then_some(state.survey_index());
    let mut list_state = ListState::default().with_selected(selected);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(Span::styled("Surveys", title_style())))
        .highlight_style(selected_style());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_account_menu(frame: &mut Frame, body: Rect, dashboard: &Dashboard) {
    let width = 20.min(body.width);
    let height = (ACCOUNT_MENU_ITEMS.len() as u16 + 2).min(body.height);
    let area = Rect::new(body.x + body.width.saturating_sub(width), body.y, width, height);
    let items: Vec<ListItem> = ACCOUNT_MENU_ITEMS.iter().map(|item| ListItem::new(*item)).collect();
    let mut list_state = ListState::default().with_selected(Some(dashboard.state().menu_index()));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Account"))
        .highlight_style(selected_style());
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_modal(frame: &mut Frame, screen: Rect, dashboard: &Dashboard) {
    let area = centered_rect(50, 30, screen);
    let title = dashboard.state().selected_survey().map(|survey| survey.title).unwrap_or("Survey");
    let text = vec![
        Line::from(Span::styled(title, title_style())),
        Line::from(""),
        Line::from("Submit your response to this survey?"),
        Line::from(""),
        Line::from(Span::styled("[Enter] submit   [Esc] cancel", Style::default().fg(MUTED))),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Confirm")),
        area,
    );
}

fn render_diagnostics(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let chord = Dashboard::inspected_chord();
    let info = dashboard.dispatcher().debug_info(&chord);
    let mut lines = vec![Line::from(Span::styled(
        format!("{} participants ({} enabled)", info.chord, info.enabled_count()),
        title_style(),
    ))];
    for participant in &info.participants {
        let style = if participant.enabled {
            Style::default()
        } else {
            Style::default().fg(MUTED).add_modifier(Modifier::CROSSED_OUT)
        };
        lines.push(Line::from(Span::styled(
            format!("{:>5}  {}", participant.priority, participant.provider_id),
            style,
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Recent dispatches", title_style())));
    for result in dashboard.dispatcher().recent_results(RECENT_RESULTS).iter().rev() {
        lines.push(result_line(result));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Diagnostics")),
        area,
    );
}

fn result_line(result: &ChainExecutionResult) -> Line<'static> {
    let summary = format!(
        "{:<12} {}/{} {}",
        result.chord, result.handlers_executed, result.total_handlers, result.final_action
    );
    let mut spans = vec![Span::raw(summary)];
    if result.errors().next().is_some() {
        spans.push(Span::styled(" !", Style::default().fg(ERROR).add_modifier(Modifier::BOLD)));
    }
    Line::from(spans)
}

fn render_footer(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let line = Line::from(vec![
        Span::raw(dashboard.state().status()),
        Span::styled("   [q] quit  [Ctrl+c] force quit", Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line).block(Block::default().borders(Borders::ALL)), area);
}

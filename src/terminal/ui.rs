use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::domain::email::{Email, join_or_none};
use crate::terminal::state::{AppState, Focus, NoticeKind};

pub const URGENT_BG: Color = Color::Rgb(255, 230, 230);
const SELECTED_FG: Color = Color::Blue;
const DRAFT_ROWS: u16 = 15;

/// Row style for the list: urgent rows are tinted whatever the selection,
/// the selected row is drawn bold in blue.
pub fn row_style(email: &Email, selected: bool) -> Style {
    let mut style = if email.is_urgent() {
        Style::default().bg(URGENT_BG).fg(Color::Black)
    } else {
        Style::default()
    };
    if selected {
        style = style.fg(SELECTED_FG).add_modifier(Modifier::BOLD);
    }
    style
}

fn row_item(email: &Email, selected: bool) -> ListItem<'static> {
    let marker = if selected { "┃ " } else { "  " };
    let subject = Line::from(vec![
        Span::raw(marker),
        Span::styled(
            email.subject.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    let meta = Line::from(vec![
        Span::raw(marker),
        Span::raw(format!(
            "From: {} | Priority: {} | Sentiment: {}",
            email.sender, email.priority, email.sentiment
        )),
    ]);
    ListItem::new(Text::from(vec![subject, meta])).style(row_style(email, selected))
}

/// Read-only fields of the detail panel.
pub fn detail_lines(email: &Email) -> Vec<Line<'static>> {
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("{label}: "),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            email.subject.clone(),
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        )),
        Line::default(),
        field("From", email.sender.clone()),
        field("Received", email.sent_date.clone()),
        Line::from(Span::styled(
            "Body:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(email.body.lines().map(|l| Line::from(l.to_string())));
    lines.extend([
        Line::default(),
        field("Phone Numbers", join_or_none(&email.phone_numbers)),
        field("Alternate Emails", join_or_none(&email.alternate_emails)),
        field("Customer Requests", join_or_none(&email.customer_requests)),
        field("Sentiment", email.sentiment.clone()),
        field("Priority", email.priority.clone()),
    ]);
    lines
}

pub fn render(f: &mut Frame, state: &mut AppState) {
    let banner_height = if state.banner.is_some() { 1 } else { 0 };
    let [banner, main, footer] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    if let Some(msg) = &state.banner {
        let p = Paragraph::new(format!("{msg} (r to retry)"))
            .style(Style::default().fg(Color::White).bg(Color::Red));
        f.render_widget(p, banner);
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(main);

    render_list(f, state, left);
    render_detail(f, state, right);
    render_footer(f, state, footer);

    if state.notice().is_some() {
        render_notice(f, state);
    }
}

fn focus_color(focused: bool) -> Color {
    if focused { Color::Yellow } else { Color::DarkGray }
}

fn render_list(f: &mut Frame, state: &mut AppState, area: Rect) {
    let title = if state.loading {
        " Support Emails (loading…) ".to_string()
    } else {
        format!(" Support Emails ({}) ", state.emails.len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(focus_color(state.focus == Focus::List)));

    let items: Vec<ListItem> = state
        .emails
        .iter()
        .map(|e| row_item(e, state.is_selected(e)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED));

    f.render_stateful_widget(list, area, &mut state.list_state);
}

fn render_detail(f: &mut Frame, state: &AppState, area: Rect) {
    let Some(email) = state.selected_email() else {
        let p = Paragraph::new("Select an email to view details and response")
            .block(Block::default().title(" Email ").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    };

    let [fields_area, draft_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(DRAFT_ROWS + 2)]).areas(area);

    let fields = Paragraph::new(detail_lines(email))
        .block(Block::default().title(" Email ").borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .scroll((state.detail_scroll, 0));
    f.render_widget(fields, fields_area);

    let editing = state.focus == Focus::Draft;
    let mut title = " AI Draft Response ".to_string();
    if editing {
        title.push_str("(editing) ");
    }
    if state.is_saving(&email.id) {
        title.push_str("(saving…) ");
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(focus_color(editing)));
    let inner = block.inner(draft_area);

    // keep the cursor inside the visible window
    let (line, col) = state.draft.cursor_position();
    let row_off = (line as u16).saturating_sub(inner.height.saturating_sub(1));
    let col_off = (col as u16).saturating_sub(inner.width.saturating_sub(1));

    let editor = Paragraph::new(state.draft.as_str())
        .block(block)
        .scroll((row_off, col_off));
    f.render_widget(editor, draft_area);

    if editing && state.notice().is_none() && inner.width > 0 && inner.height > 0 {
        f.set_cursor_position(Position::new(
            inner.x + (col as u16 - col_off),
            inner.y + (line as u16 - row_off),
        ));
    }
}

fn render_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    let hints = match state.focus {
        Focus::List => vec![
            key("j/k"),
            Span::raw(" move  "),
            key("Enter"),
            Span::raw(" open  "),
            key("e"),
            Span::raw(" edit  "),
            key("s"),
            Span::raw(" save  "),
            key("r"),
            Span::raw(" reload  "),
            key("q"),
            Span::raw(" quit"),
        ],
        Focus::Draft => vec![
            key("Ctrl+S"),
            Span::raw(" save  "),
            key("Esc"),
            Span::raw(" back to list"),
        ],
    };
    f.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn render_notice(f: &mut Frame, state: &AppState) {
    let Some(notice) = state.notice() else {
        return;
    };
    let color = match notice.kind {
        NoticeKind::Info => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    let area = centered(f.area(), 60.min(f.area().width), 7.min(f.area().height));
    let text = Text::from(vec![
        Line::from(notice.message.clone()),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let p = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", notice.title))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

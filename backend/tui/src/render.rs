//! TUI Rendering
//!
//! Translates `AppState` into Ratatui `Widget`s and draws to the terminal frame.
//! Every screen is a pure function of what the controller exposes.

use govsync_core::{AnalysisResult, AppView, Screen, Session};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use crate::app::AppState;

/// Main draw loop function.
pub fn draw_ui(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(3), // Key hints / notice
        ])
        .split(f.size());

    draw_header(f, chunks[0], state);

    let screen = state.controller.screen();
    let session = state.controller.session();
    match (screen, session) {
        (Screen::Dashboard, _) => draw_dashboard(f, chunks[1], session),
        (Screen::Capture, _) => draw_capture(f, chunks[1], state),
        (Screen::Analyzing, Some(session)) => draw_analyzing(f, chunks[1], session, state.spinner()),
        (Screen::Review | Screen::Complete, Some(session)) => match session.analysis() {
            Some(result) => draw_review(f, chunks[1], result),
            None => draw_placeholder(f, chunks[1], "No analysis available"),
        },
        (Screen::Failed, _) => draw_failed(f, chunks[1], state.controller.error_message()),
        (Screen::NotImplemented(view), _) => {
            draw_placeholder(f, chunks[1], &format!("{} is not implemented yet", view.title()))
        }
        _ => draw_placeholder(f, chunks[1], "No active session"),
    }

    draw_footer(f, chunks[2], screen, state.notice.as_deref());
}

fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let view = state.controller.view();
    let mut spans = vec![Span::styled(
        format!(" GovSync │ {}", view.title()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if view == AppView::ProcessTransfer {
        if let Some(session) = state.controller.session() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("Session #{}", session.short_id()),
                Style::default().fg(Color::DarkGray),
            ));
            spans.push(Span::raw("  "));
            spans.push(status_badge(session));
        }
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn status_badge(session: &Session) -> Span<'static> {
    use govsync_core::SessionStatus::*;
    let color = match session.status() {
        Scanning => Color::Cyan,
        Analyzing => Color::Yellow,
        Review | Complete => Color::Green,
        Error => Color::Red,
    };
    Span::styled(
        session.status().as_str().to_uppercase(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn draw_dashboard(f: &mut Frame, area: Rect, session: Option<&Session>) {
    let mut lines = vec![
        Line::from("Driver's license transfer desk"),
        Line::from(""),
        Line::from(vec![
            Span::styled("[n] ", Style::default().fg(Color::Yellow)),
            Span::raw("Start new transfer"),
        ]),
        Line::from(vec![
            Span::styled("[h] ", Style::default().fg(Color::Yellow)),
            Span::raw("History"),
        ]),
        Line::from(vec![
            Span::styled("[s] ", Style::default().fg(Color::Yellow)),
            Span::raw("Settings"),
        ]),
    ];
    if let Some(session) = session {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "Open session #{} ({}); starting a new transfer discards it",
                session.short_id(),
                session.status()
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let body = Paragraph::new(lines).block(Block::default().title("Dashboard").borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_capture(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let prompt = Paragraph::new(vec![
        Line::from("Scan the front of the applicant's out-of-province license."),
        Line::from(""),
        Line::from("Enter the path of the scanned image (JPEG, PNG, WebP or HEIC)."),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().title("Capture").borders(Borders::ALL));
    f.render_widget(prompt, chunks[0]);

    let input = Paragraph::new(state.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title("Image path").borders(Borders::ALL));
    f.render_widget(input, chunks[1]);
}

fn draw_analyzing(f: &mut Frame, area: Rect, session: &Session, spinner: char) {
    let mut lines = vec![Line::from(Span::styled(
        format!("{spinner} Analyzing document..."),
        Style::default().fg(Color::Yellow),
    ))];
    if let Some(image) = session.captured_image() {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Source: {}", image.source)));
        lines.push(Line::from(format!(
            "Type:   {} ({})",
            image.mime_type,
            human_bytes(image.len())
        )));
    }
    let body = Paragraph::new(lines).block(Block::default().title("Analyzing").borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_review(f: &mut Frame, area: Rect, result: &AnalysisResult) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let license = &result.license_data;
    let authenticity = if license.is_authentic {
        Cell::from(format!(
            "Authentic ({:.0}%)",
            license.authenticity_confidence * 100.0
        ))
        .style(Style::default().fg(Color::Green))
    } else {
        Cell::from(format!(
            "Suspect ({:.0}%)",
            license.authenticity_confidence * 100.0
        ))
        .style(Style::default().fg(Color::Red))
    };
    let license_rows = vec![
        field_row("Name", license.full_name()),
        field_row("Date of birth", license.dob.clone()),
        field_row("Address", license.address.clone()),
        field_row("License #", license.license_number.clone()),
        field_row("Issued by", license.origin_province.clone()),
        field_row("Class", license.current_class.clone()),
        field_row("Expires", license.expiry_date.clone()),
        field_row("Conditions", join_or_none(&license.conditions)),
        field_row("Restrictions", join_or_none(&license.restrictions)),
        Row::new(vec![Cell::from("Authenticity"), authenticity]),
    ];
    f.render_widget(
        Table::new(license_rows, [Constraint::Length(14), Constraint::Min(10)])
            .block(Block::default().title("Extracted Data").borders(Borders::ALL)),
        chunks[0],
    );

    let eq = &result.equivalency;
    let exchange = if eq.is_direct_exchange {
        Cell::from("Direct exchange").style(Style::default().fg(Color::Green))
    } else {
        Cell::from("Testing required").style(Style::default().fg(Color::Yellow))
    };
    let mut eq_rows = vec![
        field_row("Target class", eq.target_class.clone()),
        Row::new(vec![Cell::from("Exchange"), exchange]),
        field_row("Tests", join_or_none(&eq.required_tests)),
        field_row("Documents", join_or_none(&eq.required_docs)),
        field_row("Fees", format!("${:.2}", eq.fees)),
        field_row("Policy", eq.policy_citation.clone()),
    ];
    if !eq.notes.is_empty() {
        eq_rows.push(field_row("Notes", eq.notes.clone()));
    }
    f.render_widget(
        Table::new(eq_rows, [Constraint::Length(14), Constraint::Min(10)])
            .block(Block::default().title("Equivalency").borders(Borders::ALL)),
        chunks[1],
    );
}

fn draw_failed(f: &mut Frame, area: Rect, message: Option<&str>) {
    let lines = vec![
        Line::from(Span::styled(
            "Analysis failed",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.unwrap_or(govsync_core::DEFAULT_ANALYSIS_FAILURE).to_string()),
        Line::from(""),
        Line::from("Press [r] to rescan the document."),
    ];
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Error").borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, text: &str) {
    let body = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, area);
}

fn draw_footer(f: &mut Frame, area: Rect, screen: Screen, notice: Option<&str>) {
    let line = match notice {
        Some(notice) => Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            key_hints(screen),
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn key_hints(screen: Screen) -> &'static str {
    match screen {
        Screen::Dashboard => "n new transfer · h history · s settings · q quit",
        Screen::Capture => "Enter submit · Esc back to dashboard · Ctrl+C quit",
        Screen::Analyzing => "Esc back to dashboard · Ctrl+C quit",
        Screen::Review | Screen::Complete => "n new transfer · Esc back to dashboard · Ctrl+C quit",
        Screen::Failed => "r retry · Esc back to dashboard · Ctrl+C quit",
        Screen::NotImplemented(_) => "Esc dashboard · q quit",
    }
}

fn field_row(label: &'static str, value: String) -> Row<'static> {
    Row::new(vec![
        Cell::from(label).style(Style::default().fg(Color::DarkGray)),
        Cell::from(value),
    ])
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn human_bytes(len: usize) -> String {
    const KIB: f64 = 1024.0;
    let len = len as f64;
    if len >= KIB * KIB {
        format!("{:.1} MiB", len / (KIB * KIB))
    } else if len >= KIB {
        format!("{:.1} KiB", len / KIB)
    } else {
        format!("{len} B")
    }
}

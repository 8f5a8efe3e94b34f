//! UI rendering for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap,
    },
    Frame,
};
use redliner_core::{ClassifiedClause, Notification, RiskLevel, SessionPhase, Severity};

use crate::app::App;

// ========== Risk Colors ==========

/// High risk clauses and badges
const RISK_RED: Color = Color::Rgb(220, 60, 60);
/// Medium risk clauses and badges
const RISK_AMBER: Color = Color::Rgb(230, 160, 30);
/// Low risk clauses and badges
const RISK_GREEN: Color = Color::Rgb(80, 180, 80);

// ========== Chrome Colors ==========

/// Border color for informational blocks
const BORDER_INFO: Color = Color::Rgb(0, 150, 150);
/// Border color for the redline document pane
const BORDER_DOCUMENT: Color = Color::Rgb(80, 160, 80);
/// Border color for the clause detail overlay
const BORDER_DETAIL: Color = Color::Rgb(180, 100, 180);
/// Label color for metadata attributes
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);
/// Dim gray for secondary text
const DIM: Color = Color::Rgb(128, 128, 128);

/// Render the application UI.
///
/// `busy_label` switches on the modal overlay drawn while a backend call is
/// in flight.
pub fn render(frame: &mut Frame, app: &mut App, busy_label: Option<&str>) {
    match app.session.session().phase() {
        SessionPhase::Upload => render_upload_view(frame, app),
        SessionPhase::Dashboard => render_dashboard_view(frame, app),
        SessionPhase::Results => render_results_view(frame, app),
    }

    let selected = app.session.session().selected_clause().cloned();
    if let Some(clause) = selected {
        render_clause_detail(frame, app, &clause);
    }

    if let Some(label) = busy_label {
        render_busy_overlay(frame, label);
    }

    render_toasts(frame, app.session.session().notifications());
}

// ========== Upload View ==========

fn render_upload_view(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Layout: header, file table, footer
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(5),    // File table
        Constraint::Length(2), // Footer
    ])
    .split(area);

    render_header(frame, "Upload Contract Document", chunks[0]);
    render_file_table(frame, app, chunks[1]);
    render_footer(
        frame,
        "enter upload  r rescan  j/k move  x dismiss toast  q quit",
        chunks[2],
    );
}

fn render_file_table(frame: &mut Frame, app: &mut App, area: Rect) {
    if let Some(ref error) = app.scan_error {
        let paragraph = Paragraph::new(format!("Could not scan directory: {}", error))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(bordered_block(" PDF Files ", BORDER_INFO));
        frame.render_widget(paragraph, area);
        return;
    }

    if app.pdf_files.is_empty() {
        let empty = Paragraph::new(format!(
            "No PDF files found in {}\n\nDrop a contract PDF there and press 'r' to rescan.",
            app.scan_dir().display()
        ))
        .style(Style::default().fg(DIM))
        .block(bordered_block(" PDF Files ", BORDER_INFO));
        frame.render_widget(empty, area);
        return;
    }

    let header_cells = ["File", "Size"]
        .into_iter()
        .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold()));
    let header = Row::new(header_cells).height(1);

    let rows = app.pdf_files.iter().map(|entry| {
        // Flag files the upload would reject locally
        let size_style = if entry.size_bytes > redliner_core::MAX_UPLOAD_BYTES {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(DIM)
        };
        Row::new([
            Cell::from(entry.name.as_str()),
            Cell::from(format_size(entry.size_bytes)).style(size_style),
        ])
    });

    let widths = [
        Constraint::Fill(1),    // File (flexible)
        Constraint::Length(10), // Size
    ];

    let title = format!(" PDF Files in {} ", app.scan_dir().display());
    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered_block(&title, BORDER_INFO))
        .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)).bold())
        .highlight_symbol("» ");

    frame.render_stateful_widget(table, area, &mut app.file_table_state);
}

// ========== Dashboard View ==========

fn render_dashboard_view(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: header, document info, hint, footer
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Length(8), // Document info
        Constraint::Min(3),    // Hint
        Constraint::Length(2), // Footer
    ])
    .split(area);

    render_header(frame, "Risk Analysis Dashboard", chunks[0]);
    render_document_info(frame, app, chunks[1]);

    let hint = Paragraph::new("Document uploaded and ready for analysis. Press 'a' to analyze.")
        .style(Style::default().fg(DIM))
        .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[2]);

    render_footer(
        frame,
        "a analyze  n new session  x dismiss toast  q quit",
        chunks[3],
    );
}

fn render_document_info(frame: &mut Frame, app: &App, area: Rect) {
    let Some(doc) = app.session.session().document() else {
        return;
    };

    let label = Style::default().fg(LABEL_COLOR);
    let lines = vec![
        metadata_line("Filename", &doc.filename, label),
        metadata_line("Total Chunks", &doc.total_chunks.to_string(), label),
        metadata_line("Contract Clauses", &doc.total_clauses.to_string(), label),
        metadata_line("Word Count", &doc.word_count.to_string(), label),
        metadata_line("Document ID", &doc.doc_id, label),
    ];

    let paragraph = Paragraph::new(lines).block(bordered_block(" Document Information ", BORDER_INFO));
    frame.render_widget(paragraph, area);
}

fn metadata_line<'a>(key: &'a str, value: &str, label: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<18}", key), label),
        Span::raw(value.to_string()),
    ])
}

// ========== Results View ==========

fn render_results_view(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Layout: header, content, footer
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(8),    // Content
        Constraint::Length(2), // Footer
    ])
    .split(area);

    let title = match app.session.session().result() {
        Some(result) => format!(
            "Redlined Contract — {} clauses, overall {}",
            result.total_clauses,
            result.overall_risk.as_str()
        ),
        None => "Redlined Contract".to_string(),
    };
    render_header(frame, &title, chunks[0]);

    // Content split: document pane on the left, summary panel on the right
    let content = Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_redline_pane(frame, app, content[0]);
    render_summary_panel(frame, app, content[1]);

    render_footer(
        frame,
        "enter clause detail  j/k move  e export  n new session  q quit",
        chunks[2],
    );
}

fn render_redline_pane(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.blocks.is_empty() {
        let empty = Paragraph::new("The analysis returned no redlined clauses")
            .style(Style::default().fg(DIM))
            .block(bordered_block(" Contract Document ", BORDER_DOCUMENT));
        frame.render_widget(empty, area);
        return;
    }

    let text_width = area.width.saturating_sub(8).max(20) as usize;

    let rows = app.blocks.iter().map(|block| {
        let (badge, color) = match block.risk {
            Some(RiskLevel::Red) => ("●", RISK_RED),
            Some(RiskLevel::Amber) => ("●", RISK_AMBER),
            Some(RiskLevel::Green) => ("●", RISK_GREEN),
            None => ("·", DIM),
        };
        let marker = match block.marker_index {
            Some(i) => format!("{:>3}", i),
            None => "  —".to_string(),
        };
        Row::new([
            Cell::from(Span::styled(badge, Style::default().fg(color))),
            Cell::from(Span::styled(marker, Style::default().fg(DIM))),
            Cell::from(truncate_string(&block.text, text_width)),
        ])
    });

    let widths = [
        Constraint::Length(1), // Risk badge
        Constraint::Length(3), // Marker index
        Constraint::Fill(1),   // Clause text
    ];

    let table = Table::new(rows, widths)
        .block(bordered_block(" Contract Document ", BORDER_DOCUMENT))
        .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)).bold())
        .highlight_symbol("» ");

    frame.render_stateful_widget(table, area, &mut app.block_table_state);
}

fn render_summary_panel(frame: &mut Frame, app: &App, area: Rect) {
    let Some(result) = app.session.session().result() else {
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    for (level, count, pct) in [
        (
            RiskLevel::Red,
            result.risk_summary.red,
            result.risk_percentage.red,
        ),
        (
            RiskLevel::Amber,
            result.risk_summary.amber,
            result.risk_percentage.amber,
        ),
        (
            RiskLevel::Green,
            result.risk_summary.green,
            result.risk_percentage.green,
        ),
    ] {
        lines.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(risk_color(level))),
            Span::styled(
                format!("{:<12}", level.display_name()),
                Style::default().fg(risk_color(level)).bold(),
            ),
            Span::raw(format!("{:>3}  ({:.0}%)", count, pct)),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("Overall: ", Style::default().fg(LABEL_COLOR)),
        Span::styled(
            format!(" {} RISK ", result.overall_risk.as_str()),
            Style::default()
                .fg(Color::Black)
                .bg(risk_color(result.overall_risk))
                .bold(),
        ),
    ]));

    if !result.recommendations.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Recommendations:",
            Style::default().fg(LABEL_COLOR).bold(),
        ));
        for rec in &result.recommendations {
            lines.push(Line::raw(format!("  • {}", rec)));
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered_block(" Risk Summary ", BORDER_INFO));
    frame.render_widget(paragraph, area);
}

// ========== Clause Detail Overlay ==========

fn render_clause_detail(frame: &mut Frame, app: &App, clause: &ClassifiedClause) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = bordered_block(" Clause Detail ", BORDER_DETAIL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Layout: risk line, confidence gauge, scrolling body
    let chunks = Layout::vertical([
        Constraint::Length(1), // Risk badge
        Constraint::Length(1), // Confidence gauge
        Constraint::Min(3),    // Body
    ])
    .split(inner);

    let classification = &clause.classification;
    let risk_line = Line::from(vec![
        Span::styled(
            format!(" {} ", classification.risk_level.as_str()),
            Style::default()
                .fg(Color::Black)
                .bg(risk_color(classification.risk_level))
                .bold(),
        ),
        Span::raw(" "),
        Span::styled(
            classification.risk_level.display_name(),
            Style::default().fg(risk_color(classification.risk_level)),
        ),
    ]);
    frame.render_widget(Paragraph::new(risk_line), chunks[0]);

    let confidence = classification.confidence.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .ratio(confidence)
        .label(format!("Confidence {:.0}%", confidence * 100.0))
        .gauge_style(Style::default().fg(risk_color(classification.risk_level)));
    frame.render_widget(gauge, chunks[1]);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Clause Text:",
        Style::default().fg(LABEL_COLOR).bold(),
    ));
    lines.push(Line::raw(clause.text.clone()));
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Explanation:",
        Style::default().fg(LABEL_COLOR).bold(),
    ));
    lines.push(Line::raw(classification.explanation.clone()));

    if !classification.recommendations.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Recommendations:",
            Style::default().fg(LABEL_COLOR).bold(),
        ));
        for rec in &classification.recommendations {
            lines.push(Line::raw(format!("  • {}", rec)));
        }
    }

    // Side-by-side classifier comparison, when the backend ran both
    if classification.rule_based.is_some() || classification.rag_based.is_some() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Classifier Comparison:",
            Style::default().fg(LABEL_COLOR).bold(),
        ));
        lines.push(Line::raw(format!(
            "  Rule-based: {}",
            classifier_summary(classification.rule_based.as_ref())
        )));
        lines.push(Line::raw(format!(
            "  RAG:        {}",
            classifier_summary(classification.rag_based.as_ref())
        )));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll as u16, 0));
    frame.render_widget(body, chunks[2]);
}

/// One-line summary of an opaque classifier record.
fn classifier_summary(record: Option<&serde_json::Value>) -> String {
    let Some(record) = record else {
        return "n/a".to_string();
    };
    let risk = record
        .get("risk_level")
        .and_then(|v| v.as_str())
        .unwrap_or("n/a");
    match record.get("confidence").and_then(|v| v.as_f64()) {
        Some(confidence) => format!("{} ({:.0}%)", risk, confidence * 100.0),
        None => risk.to_string(),
    }
}

// ========== Overlays and Chrome ==========

fn render_busy_overlay(frame: &mut Frame, label: &str) {
    let area = centered_rect(44, 20, frame.area());
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(format!("\n{}", label))
        .alignment(Alignment::Center)
        .block(bordered_block(" Working ", BORDER_INFO));
    frame.render_widget(paragraph, area);
}

fn render_toasts(frame: &mut Frame, notifications: &[Notification]) {
    if notifications.is_empty() {
        return;
    }

    let area = frame.area();
    let width = area.width.min(50);
    let x = area.width.saturating_sub(width);

    for (i, notification) in notifications.iter().rev().enumerate() {
        let y = 1 + i as u16;
        if y >= area.height.saturating_sub(1) {
            break;
        }
        let toast_area = Rect::new(x, y, width, 1);
        frame.render_widget(Clear, toast_area);

        let color = severity_color(notification.severity);
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", severity_symbol(notification.severity)),
                Style::default().fg(Color::Black).bg(color),
            ),
            Span::styled(
                format!(
                    " {}",
                    truncate_string(&notification.message, (width as usize).saturating_sub(4))
                ),
                Style::default().fg(color),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), toast_area);
    }
}

fn render_header(frame: &mut Frame, title: &str, area: Rect) {
    let paragraph = Paragraph::new(title.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bold())
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(DIM)),
        );
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, hints: &str, area: Rect) {
    let paragraph = Paragraph::new(hints.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(DIM));
    frame.render_widget(paragraph, area);
}

fn bordered_block(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
        .title_style(Style::default().fg(color).bold())
}

// ========== Helpers ==========

fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Red => RISK_RED,
        RiskLevel::Amber => RISK_AMBER,
        RiskLevel::Green => RISK_GREEN,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => RISK_GREEN,
        Severity::Error => RISK_RED,
        Severity::Warning => RISK_AMBER,
        Severity::Info => BORDER_INFO,
    }
}

fn severity_symbol(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "✓",
        Severity::Error => "✗",
        Severity::Warning => "!",
        Severity::Info => "i",
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// Centered sub-rectangle sized as a percentage of `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    let horizontal = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1]);

    horizontal[1]
}

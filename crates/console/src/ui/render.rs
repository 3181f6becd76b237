use hipoteca_client::view::transcript_view;
use hipoteca_client::FormField;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Clear, Paragraph};

use super::app::{AnalysisStatus, AppState, Focus};
use super::format::{analysis_lines, transcript_lines};
use super::text::{truncate_with_ellipsis, wrap_text_lines};
use super::theme::{Theme, ValueStyle};

const MAX_INPUT_LINES: usize = 4;

pub(crate) fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let theme = Theme::dark();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
        .split(chunks[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(body[1]);

    draw_header(frame, app, &theme, chunks[0]);
    draw_form(frame, app, &theme, body[0]);
    draw_results(frame, app, &theme, right[0]);
    draw_chat(frame, app, &theme, right[1]);
    draw_footer(frame, app, &theme, chunks[2]);
}

fn draw_header(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let session_id = app.chat.session().session_id();
    let short_session = session_id.get(..8).unwrap_or(session_id);
    let health = app.health.as_deref().unwrap_or("comprobando…");
    let header_line = Line::from(vec![
        Span::styled("Servidor: ", theme.key_style()),
        Span::styled(app.base_url.clone(), theme.value_style(ValueStyle::Important)),
        Span::styled("  Sesión: ", theme.key_style()),
        Span::styled(short_session.to_string(), theme.value_style(ValueStyle::Normal)),
        Span::styled("  Estado: ", theme.key_style()),
        Span::styled(health.to_string(), theme.value_style(ValueStyle::Normal)),
    ]);
    let header = Paragraph::new(header_line).block(theme.block("Hipoteca", false));
    frame.render_widget(header, area);
}

fn draw_form(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let focused = app.focus == Focus::Form;
    let block = theme.block("Datos de la hipoteca", focused);
    let inner = block.inner(area);
    let label_width = (inner.width as usize / 2).max(8);

    let selected = app.selected_field();
    let mut lines = Vec::new();
    for field in app.form.visible_fields() {
        let marker = if field.is_required() { "*" } else { " " };
        let label = truncate_with_ellipsis(&format!("{marker}{}", field.label()), label_width);
        let value = if field == FormField::Tipo {
            format!("< {} >", app.form.tipo.as_str())
        } else {
            app.form.value(field).to_string()
        };
        let is_selected = focused && field == selected;
        let value = if is_selected && field != FormField::Tipo {
            format!("{value}▏")
        } else {
            value
        };
        let value_style = if is_selected {
            theme.highlight_style()
        } else {
            theme.value_style(ValueStyle::Normal)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{label:<label_width$} "), theme.key_style()),
            Span::styled(value, value_style),
        ]));
    }

    lines.push(Line::default());
    lines.push(match &app.analysis_status {
        AnalysisStatus::Idle => Line::styled("Enter = analizar", theme.help_style()),
        AnalysisStatus::Running => Line::styled("Analizando…", theme.accent_style()),
        AnalysisStatus::Done => Line::styled("Análisis completado", theme.value_style(ValueStyle::Dim)),
        AnalysisStatus::Failed(message) => Line::styled(message.clone(), theme.error_style()),
    });

    let widget = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(ratatui::widgets::Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);
}

fn draw_results(frame: &mut ratatui::Frame, app: &mut AppState, theme: &Theme, area: Rect) {
    let focused = app.focus == Focus::Results;
    let block = theme.block("Resultados", focused);
    let inner = block.inner(area);
    let lines = match &app.analysis {
        Some(view) => analysis_lines(theme, view, inner.width),
        None => vec![Line::styled(
            "Rellena el formulario y pulsa Enter para analizar.",
            theme.value_style(ValueStyle::Dim),
        )],
    };
    app.set_result_metrics(lines.len(), inner.height);
    let widget = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.results_scroll as u16, 0));
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);
}

fn draw_chat(frame: &mut ratatui::Frame, app: &mut AppState, theme: &Theme, area: Rect) {
    let focused = app.focus == Focus::Chat;
    let input_width = area.width.saturating_sub(2).max(1) as usize;
    let input_lines = wrap_text_lines(&app.chat_input, input_width);
    let input_height = input_lines.len().clamp(1, MAX_INPUT_LINES) as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(input_height)])
        .split(area);

    let block = theme.block("Asistente", focused);
    let inner = block.inner(chunks[0]);
    let entries = transcript_view(&app.chat, &app.base_url);
    let lines = transcript_lines(theme, &entries, inner.width);
    app.set_chat_metrics(lines.len(), inner.height);
    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.chat_scroll() as u16, 0));
    frame.render_widget(Clear, chunks[0]);
    frame.render_widget(transcript, chunks[0]);

    let visible_input = input_lines
        .iter()
        .skip(input_lines.len().saturating_sub(MAX_INPUT_LINES))
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    let input_text = if focused {
        format!("{visible_input}▏")
    } else {
        visible_input
    };
    let input = Paragraph::new(input_text)
        .style(theme.value_style(ValueStyle::Normal))
        .block(theme.block("Pregunta", focused));
    frame.render_widget(input, chunks[1]);
}

fn draw_footer(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let help = match app.focus {
        Focus::Form => "↑/↓=campo  ←/→=tipo  Enter=analizar  Tab=foco  F5=estado  Esc=salir  ",
        Focus::Results => "j/k=desplazar  gg/G=inicio/fin  PgUp/PgDn=página  Tab=foco  Esc=salir  ",
        Focus::Chat => "Enter=enviar  Shift+Enter=nueva línea  PgUp/PgDn=historial  Tab=foco  Esc=salir  ",
    };
    let mut footer_spans = vec![Span::styled(help, theme.help_style())];
    if app.confirm_quit {
        footer_spans.push(Span::styled(
            "Pulsa Esc o Q otra vez para salir  ",
            theme.warn_style(),
        ));
    }
    if app.focus == Focus::Results {
        footer_spans.push(Span::styled(
            format!(
                "línea {}/{}",
                app.results_scroll.saturating_add(1),
                app.results_total_lines
            ),
            theme.accent_style(),
        ));
    }
    let footer = Paragraph::new(Line::from(footer_spans)).block(theme.block("Controles", false));
    frame.render_widget(footer, area);
}

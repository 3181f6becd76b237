use hipoteca_client::view::{AmortizationLine, AnalysisView, Card, TranscriptEntry};
use ratatui::text::{Line, Span};

use super::text::{pad_left, sanitize_text_for_tui, wrap_text_lines};
use super::theme::{Theme, ValueStyle};

pub(super) fn analysis_lines(theme: &Theme, view: &AnalysisView, width: u16) -> Vec<Line<'static>> {
    let width = width.max(1) as usize;
    let mut lines = Vec::new();

    for card in &view.cards {
        lines.push(card_line(theme, card));
    }

    if !view.warnings.is_empty() {
        lines.push(Line::default());
        lines.push(heading(theme, "Avisos"));
        for warning in &view.warnings {
            let text = format!("• {}", sanitize_text_for_tui(warning));
            for segment in wrap_text_lines(&text, width) {
                lines.push(Line::styled(segment, theme.warn_style()));
            }
        }
    }

    lines.push(Line::default());
    lines.push(heading(theme, "Stress test"));
    lines.push(Line::from(vec![
        Span::styled("Cuota base: ", theme.key_style()),
        Span::styled(
            view.stress.base_payment.clone(),
            theme.value_style(ValueStyle::Important),
        ),
    ]));
    for scenario in &view.stress.scenarios {
        lines.push(Line::styled(
            scenario.clone(),
            theme.value_style(ValueStyle::Normal),
        ));
    }

    if !view.savings.is_empty() {
        lines.push(Line::default());
        lines.push(heading(theme, "Amortización extra"));
        for saving in &view.savings {
            lines.push(Line::styled(saving.clone(), theme.value_style(ValueStyle::Normal)));
        }
    }

    if let Some(refinance) = &view.refinance {
        lines.push(Line::default());
        lines.push(heading(theme, "Subrogación"));
        for line in &refinance.lines {
            lines.push(Line::styled(line.clone(), theme.value_style(ValueStyle::Normal)));
        }
    }

    lines.push(Line::default());
    lines.push(heading(theme, "Resumen de amortización"));
    if view.amortization.is_empty() {
        lines.push(Line::styled("sin datos", theme.value_style(ValueStyle::Dim)));
    } else {
        lines.extend(amortization_table(theme, &view.amortization));
    }
    lines
}

fn card_line(theme: &Theme, card: &Card) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", card.title), theme.key_style()),
        Span::styled(card.value.clone(), theme.badge_style(card.badge)),
    ])
}

fn heading(theme: &Theme, title: &str) -> Line<'static> {
    Line::styled(title.to_string(), theme.accent_style())
}

/// Right-aligned columns sized to their widest cell.
pub(super) fn amortization_table(theme: &Theme, rows: &[AmortizationLine]) -> Vec<Line<'static>> {
    let widths = AmortizationLine::column_widths(rows);
    let render = |cells: [&str; 6]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| pad_left(cell, *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(Line::styled(
        render(AmortizationLine::HEADERS),
        theme.key_style(),
    ));
    for row in rows {
        lines.push(Line::styled(
            render(row.cells()),
            theme.value_style(ValueStyle::Normal),
        ));
    }
    lines
}

pub(super) fn transcript_lines(
    theme: &Theme,
    entries: &[TranscriptEntry],
    width: u16,
) -> Vec<Line<'static>> {
    let width = width.max(1) as usize;
    let body_width = width.saturating_sub(2).max(1);
    let mut lines = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::styled(
            format!("{}:", entry.sender),
            theme.sender_style(entry.is_user, entry.sender),
        ));
        if entry.typing {
            lines.push(Line::styled(
                "  escribiendo…".to_string(),
                theme.value_style(ValueStyle::Dim),
            ));
            continue;
        }
        let text = sanitize_text_for_tui(&entry.text);
        for segment in wrap_text_lines(&text, body_width) {
            lines.push(Line::styled(
                format!("  {segment}"),
                theme.value_style(ValueStyle::Normal),
            ));
        }
        for link in &entry.links {
            lines.push(Line::from(vec![
                Span::styled(format!("  [{}] ", link.label), theme.key_style()),
                Span::styled(link.href.clone(), theme.accent_style()),
            ]));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::text::display_width;
    use hipoteca_client::view::CitationLink;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn table_columns_align_right() {
        let row = AmortizationLine {
            month: "12".to_string(),
            payment: "869,94 €".to_string(),
            interest: "430,12 €".to_string(),
            principal: "439,82 €".to_string(),
            balance: "144.615,20 €".to_string(),
            cumulative_interest: "5.254,48 €".to_string(),
        };
        let lines = amortization_table(&Theme::dark(), &[row]);
        assert_eq!(lines.len(), 2);
        let header = plain(&lines[0]);
        let body = plain(&lines[1]);
        assert_eq!(display_width(&header), display_width(&body));
        assert!(body.starts_with(" 12"));
    }

    #[test]
    fn transcript_renders_links_and_typing() {
        let entries = vec![
            TranscriptEntry {
                sender: "Bot",
                is_user: false,
                text: "Según el BOE".to_string(),
                links: vec![CitationLink {
                    label: "BOE".to_string(),
                    href: "http://localhost:8000/docs/1.pdf".to_string(),
                }],
                typing: false,
            },
            TranscriptEntry {
                sender: "Bot",
                is_user: false,
                text: String::new(),
                links: Vec::new(),
                typing: true,
            },
        ];
        let lines = transcript_lines(&Theme::dark(), &entries, 60)
            .iter()
            .map(plain)
            .collect::<Vec<_>>();
        assert!(lines.contains(&"  [BOE] http://localhost:8000/docs/1.pdf".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("  escribiendo…"));
    }
}

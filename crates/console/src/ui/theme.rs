use hipoteca_client::view::{Badge, Severity};
use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy)]
pub(crate) enum ValueStyle {
    Normal,
    Important,
    Dim,
}

pub(crate) struct Theme {
    border: Color,
    focus_border: Color,
    title: Color,
    text: Color,
    dim: Color,
    accent: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    warn: Color,
    ok: Color,
    error: Color,
    user: Color,
    system: Color,
}

impl Theme {
    pub(crate) fn dark() -> Self {
        Self {
            border: Color::DarkGray,
            focus_border: Color::Cyan,
            title: Color::Blue,
            text: Color::White,
            dim: Color::Gray,
            accent: Color::Cyan,
            highlight_fg: Color::White,
            highlight_bg: Color::DarkGray,
            warn: Color::Yellow,
            ok: Color::Green,
            error: Color::Red,
            user: Color::LightBlue,
            system: Color::Magenta,
        }
    }

    pub(crate) fn block<'a>(&self, title: &'a str, focused: bool) -> ratatui::widgets::Block<'a> {
        let border = if focused { self.focus_border } else { self.border };
        ratatui::widgets::Block::default()
            .title(ratatui::text::Span::styled(
                title,
                Style::default().fg(self.title).add_modifier(Modifier::BOLD),
            ))
            .borders(ratatui::widgets::Borders::ALL)
            .border_style(Style::default().fg(border))
    }

    pub(crate) fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn help_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn warn_style(&self) -> Style {
        Style::default().fg(self.warn).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn key_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn value_style(&self, level: ValueStyle) -> Style {
        match level {
            ValueStyle::Normal => Style::default().fg(self.text),
            ValueStyle::Important => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD),
            ValueStyle::Dim => Style::default().fg(self.dim),
        }
    }

    pub(crate) fn badge_style(&self, badge: Badge) -> Style {
        match badge {
            Badge::Plain => self.value_style(ValueStyle::Important),
            Badge::Hint => self.value_style(ValueStyle::Dim),
            Badge::Severity(severity) => self.severity_style(severity),
        }
    }

    pub(crate) fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Normal => Style::default().fg(self.ok).add_modifier(Modifier::BOLD),
            Severity::Warning => self.warn_style(),
            Severity::Critical => self.error_style(),
            Severity::Unknown => self.value_style(ValueStyle::Dim),
        }
    }

    pub(crate) fn sender_style(&self, is_user: bool, sender: &str) -> Style {
        if is_user {
            Style::default().fg(self.user).add_modifier(Modifier::BOLD)
        } else if sender == hipoteca_client::Sender::System.label() {
            Style::default().fg(self.system).add_modifier(Modifier::ITALIC)
        } else {
            self.accent_style()
        }
    }
}

//! Pure render descriptions of an analysis and a chat transcript.
//!
//! Nothing here touches a terminal; the console applies these structures
//! with ratatui and the report printer writes them as plain text.

use protocol::{AnalysisResult, ExtraAmortization, RefinanceComparison, StressTest};

use crate::chat::{ChatController, ChatMessage, Sender};
use crate::format::{format_euros, format_number, format_percent, PLACEHOLDER};
use crate::http::document_url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "ok",
            Severity::Warning => "warn",
            Severity::Critical => "danger",
            Severity::Unknown => "hint",
        }
    }
}

pub fn dti_severity(dti: Option<f64>) -> Severity {
    match dti {
        Some(value) if value >= 40.0 => Severity::Critical,
        Some(value) if value >= 35.0 => Severity::Warning,
        Some(value) if value.is_finite() => Severity::Normal,
        _ => Severity::Unknown,
    }
}

pub fn ltv_severity(ltv: Option<f64>) -> Severity {
    match ltv {
        Some(value) if value > 80.0 => Severity::Critical,
        Some(value) if value > 70.0 => Severity::Warning,
        Some(value) if value.is_finite() => Severity::Normal,
        _ => Severity::Unknown,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Badge {
    Plain,
    Hint,
    Severity(Severity),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub title: String,
    pub value: String,
    pub badge: Badge,
}

impl Card {
    fn new(title: &str, value: String, badge: Badge) -> Self {
        Self {
            title: title.to_string(),
            value,
            badge,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmortizationLine {
    pub month: String,
    pub payment: String,
    pub interest: String,
    pub principal: String,
    pub balance: String,
    pub cumulative_interest: String,
}

impl AmortizationLine {
    pub const HEADERS: [&'static str; 6] = [
        "Mes",
        "Cuota",
        "Interés mes",
        "Amortizado mes",
        "Saldo",
        "Interés acumulado",
    ];

    pub fn cells(&self) -> [&str; 6] {
        [
            &self.month,
            &self.payment,
            &self.interest,
            &self.principal,
            &self.balance,
            &self.cumulative_interest,
        ]
    }

    /// Character width of each column, headers included.
    pub fn column_widths(rows: &[AmortizationLine]) -> [usize; 6] {
        let mut widths = Self::HEADERS.map(|header| header.chars().count());
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row.cells()) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StressView {
    pub base_payment: String,
    pub scenarios: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefinanceView {
    pub lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisView {
    pub cards: Vec<Card>,
    pub amortization: Vec<AmortizationLine>,
    pub stress: StressView,
    pub savings: Vec<String>,
    /// `None` hides the refinancing panel.
    pub refinance: Option<RefinanceView>,
    pub warnings: Vec<String>,
}

pub fn analysis_view(result: &AnalysisResult) -> AnalysisView {
    AnalysisView {
        cards: metric_cards(result),
        amortization: amortization_lines(result),
        stress: stress_view(result.stress_test.as_ref()),
        savings: savings_lines(result.amortizacion_extra.as_ref()),
        refinance: result.comparativa_subrogacion.as_ref().map(refinance_view),
        warnings: result.avisos.clone(),
    }
}

fn metric_cards(result: &AnalysisResult) -> Vec<Card> {
    let metrics = &result.metricas;
    let tipo = if result.entrada.tipo.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        result.entrada.tipo.clone()
    };
    vec![
        Card::new("Tipo", tipo, Badge::Hint),
        Card::new("Cuota efectiva", format_euros(metrics.cuota_efectiva), Badge::Plain),
        Card::new(
            "Intereses restantes (aprox.)",
            format_euros(metrics.intereses_restantes_aprox),
            Badge::Plain,
        ),
        ratio_card("DTI", metrics.dti, dti_severity(metrics.dti)),
        ratio_card("LTV", metrics.ltv, ltv_severity(metrics.ltv)),
    ]
}

fn ratio_card(title: &str, value: Option<f64>, severity: Severity) -> Card {
    match value {
        Some(value) if severity != Severity::Unknown => {
            Card::new(title, format_percent(value), Badge::Severity(severity))
        }
        _ => Card::new(title, PLACEHOLDER.to_string(), Badge::Hint),
    }
}

fn amortization_lines(result: &AnalysisResult) -> Vec<AmortizationLine> {
    result
        .resumen_amortizacion
        .iter()
        .map(|row| AmortizationLine {
            month: row.mes.to_string(),
            payment: format_euros(Some(row.cuota)),
            interest: format_euros(Some(row.interes_mes)),
            principal: format_euros(Some(row.amortizado_mes)),
            balance: format_euros(Some(row.saldo)),
            cumulative_interest: format_euros(Some(row.interes_acum)),
        })
        .collect()
}

fn stress_view(stress: Option<&StressTest>) -> StressView {
    let Some(stress) = stress else {
        return StressView {
            base_payment: PLACEHOLDER.to_string(),
            scenarios: Vec::new(),
        };
    };
    StressView {
        base_payment: format_euros(stress.cuota_base),
        scenarios: stress
            .escenarios
            .iter()
            .map(|scenario| {
                format!(
                    "+{} pp → cuota {} € (Δ {} €)",
                    scenario.delta_tipo_pp,
                    format_number(scenario.cuota),
                    format_number(scenario.diferencia)
                )
            })
            .collect(),
    }
}

fn savings_lines(extra: Option<&ExtraAmortization>) -> Vec<String> {
    let Some(extra) = extra else {
        return Vec::new();
    };
    [
        ("1.000", extra.ahorro_1k),
        ("5.000", extra.ahorro_5k),
        ("10.000", extra.ahorro_10k),
    ]
    .into_iter()
    .map(|(amount, saving)| {
        format!(
            "Amortizar {amount} € ahora → ahorro intereses: {}",
            format_euros(saving)
        )
    })
    .collect()
}

fn refinance_view(comparison: &RefinanceComparison) -> RefinanceView {
    RefinanceView {
        lines: vec![
            format!("TIN alternativo: {}", format_percent(comparison.tin_alternativo)),
            format!(
                "Cuota alternativa: {} (Δ {})",
                format_euros(Some(comparison.cuota_alternativa)),
                format_euros(Some(comparison.diferencia_cuota))
            ),
            format!(
                "Intereses alternativos: {}",
                format_euros(Some(comparison.intereses_alternativos))
            ),
            format!(
                "Ahorro de intereses total (aprox.): {}",
                format_euros(Some(comparison.ahorro_intereses))
            ),
        ],
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CitationLink {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: &'static str,
    pub is_user: bool,
    pub text: String,
    pub links: Vec<CitationLink>,
    pub typing: bool,
}

pub fn message_entry(message: &ChatMessage, base_url: &str) -> TranscriptEntry {
    TranscriptEntry {
        sender: message.sender.label(),
        is_user: message.sender == Sender::User,
        text: message.text.clone(),
        links: message
            .documents
            .iter()
            .map(|doc| CitationLink {
                label: doc.origen.clone(),
                href: document_url(base_url, &doc.url),
            })
            .collect(),
        typing: false,
    }
}

/// Transcript entries in order, plus one trailing typing placeholder while
/// an answer is awaited.
pub fn transcript_view(chat: &ChatController, base_url: &str) -> Vec<TranscriptEntry> {
    let mut entries = chat
        .transcript()
        .messages()
        .iter()
        .map(|message| message_entry(message, base_url))
        .collect::<Vec<_>>();
    if chat.is_typing() {
        entries.push(TranscriptEntry {
            sender: Sender::Bot.label(),
            is_user: false,
            text: String::new(),
            links: Vec::new(),
            typing: true,
        });
    }
    entries
}

//! Plain-text output for the one-shot subcommands.

use crate::cli::{AnalyzeArgs, SearchArgs};
use hipoteca_client::view::{
    analysis_view, transcript_view, AmortizationLine, AnalysisView, Badge, TranscriptEntry,
};
use hipoteca_client::{AnalysisForm, ApiClient, ChatController, FormField, MortgageApi};
use protocol::{HealthStatus, RateRegime, SearchHit, SearchQuery};
use std::fmt::Write as _;

pub(crate) fn form_from_args(args: &AnalyzeArgs) -> anyhow::Result<AnalysisForm> {
    let mut form = AnalysisForm::default();
    form.tipo = args.tipo.parse::<RateRegime>().map_err(anyhow::Error::msg)?;
    form.set(FormField::CapitalPendiente, args.capital.as_str());
    form.set(FormField::AnosRestantes, args.anos.as_str());
    let optional = [
        (FormField::Tin, &args.tin),
        (FormField::Euribor, &args.euribor),
        (FormField::Diferencial, &args.diferencial),
        (FormField::CuotaActual, &args.cuota_actual),
        (FormField::IngresosMensuales, &args.ingresos),
        (FormField::OtrasDeudasMensuales, &args.otras_deudas),
        (FormField::ValorVivienda, &args.valor_vivienda),
        (FormField::OfertaAlternativaTin, &args.oferta_tin),
    ];
    for (field, value) in optional {
        if let Some(value) = value {
            form.set(field, value.as_str());
        }
    }
    Ok(form)
}

pub(crate) async fn run_analyze(
    api: &ApiClient,
    chat: &mut ChatController,
    args: &AnalyzeArgs,
) -> anyhow::Result<()> {
    let request = form_from_args(args)?.to_request();
    let result = match api.analyze(&request).await {
        Ok(result) => result,
        Err(err) => anyhow::bail!(err.analysis_message(api.base_url())),
    };
    println!("{}", render_analysis(&analysis_view(&result)));
    chat.record_analysis(result);

    if args.questions.is_empty() {
        return Ok(());
    }
    for question in &args.questions {
        let outcome = chat.send(api, question).await;
        tracing::info!(?outcome, "question answered");
    }
    println!("{}", render_transcript(&transcript_view(chat, api.base_url())));
    Ok(())
}

pub(crate) async fn run_search(api: &ApiClient, args: &SearchArgs) -> anyhow::Result<()> {
    let query = SearchQuery {
        query: args.query.clone(),
        top_k: args.top_k,
        banco: args.banco.clone(),
        min_score: args.min_score,
    };
    let hits = api
        .search(&query)
        .await
        .map_err(|err| anyhow::anyhow!(err.analysis_message(api.base_url())))?;
    println!("{}", render_hits(&hits, api));
    Ok(())
}

pub(crate) async fn run_health(api: &ApiClient) -> anyhow::Result<()> {
    let health = api
        .health()
        .await
        .map_err(|err| anyhow::anyhow!(err.analysis_message(api.base_url())))?;
    println!("{}", render_health(&health));
    Ok(())
}

pub(crate) fn render_analysis(view: &AnalysisView) -> String {
    let mut out = String::new();
    for card in &view.cards {
        match card.badge {
            Badge::Severity(severity) => {
                let _ = writeln!(out, "{}: {} ({})", card.title, card.value, severity.as_str());
            }
            Badge::Plain | Badge::Hint => {
                let _ = writeln!(out, "{}: {}", card.title, card.value);
            }
        }
    }

    if !view.warnings.is_empty() {
        out.push_str("\nAvisos\n");
        for warning in &view.warnings {
            let _ = writeln!(out, "  • {warning}");
        }
    }

    let _ = writeln!(out, "\nStress test\n  Cuota base: {}", view.stress.base_payment);
    for scenario in &view.stress.scenarios {
        let _ = writeln!(out, "  {scenario}");
    }

    if !view.savings.is_empty() {
        out.push_str("\nAmortización extra\n");
        for saving in &view.savings {
            let _ = writeln!(out, "  {saving}");
        }
    }

    if let Some(refinance) = &view.refinance {
        out.push_str("\nSubrogación\n");
        for line in &refinance.lines {
            let _ = writeln!(out, "  {line}");
        }
    }

    out.push_str("\nResumen de amortización\n");
    if view.amortization.is_empty() {
        out.push_str("  sin datos\n");
    } else {
        let widths = AmortizationLine::column_widths(&view.amortization);
        write_row(&mut out, AmortizationLine::HEADERS, &widths);
        for row in &view.amortization {
            write_row(&mut out, row.cells(), &widths);
        }
    }
    out
}

fn write_row(out: &mut String, cells: [&str; 6], widths: &[usize; 6]) {
    out.push(' ');
    for (cell, &width) in cells.iter().zip(widths) {
        let _ = write!(out, " {cell:>width$}");
    }
    out.push('\n');
}

pub(crate) fn render_transcript(entries: &[TranscriptEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}: {}", entry.sender, entry.text);
        for link in &entry.links {
            let _ = writeln!(out, "  [{}] {}", link.label, link.href);
        }
    }
    out
}

pub(crate) fn render_hits(hits: &[SearchHit], api: &ApiClient) -> String {
    if hits.is_empty() {
        return "Sin resultados.".to_string();
    }
    let mut out = String::new();
    for (idx, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{:.3}] {} · {} ({})",
            idx + 1,
            hit.score,
            hit.banco,
            hit.producto,
            hit.origen
        );
        if !hit.ruta_pdf.is_empty() {
            let _ = writeln!(out, "   {}", api.document_url(&hit.ruta_pdf));
        }
        let snippet = hit.texto.split_whitespace().collect::<Vec<_>>().join(" ");
        let _ = writeln!(out, "   {}", truncate_chars(&snippet, 200));
    }
    out
}

pub(crate) fn render_health(health: &HealthStatus) -> String {
    match &health.uptime {
        Some(uptime) => format!("{} (uptime {uptime})", health.status),
        None => health.status.clone(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out = text.chars().take(max).collect::<String>();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{AnalysisResult, Metrics, RefinanceComparison};

    #[test]
    fn args_feed_the_form() {
        let args = AnalyzeArgs {
            capital: "150000,00".to_string(),
            anos: "20".to_string(),
            tipo: "variable".to_string(),
            euribor: Some("3,1".to_string()),
            diferencial: Some("0.9".to_string()),
            otras_deudas: Some("0".to_string()),
            ..AnalyzeArgs::default()
        };
        let request = form_from_args(&args).expect("form").to_request();
        assert_eq!(request.tipo, RateRegime::Variable);
        assert_eq!(request.capital_pendiente, 150000.0);
        assert_eq!(request.euribor, Some(3.1));
        assert_eq!(request.otras_deudas_mensuales, None);
    }

    #[test]
    fn unknown_regime_is_rejected() {
        let args = AnalyzeArgs {
            tipo: "mixto".to_string(),
            ..AnalyzeArgs::default()
        };
        assert!(form_from_args(&args).is_err());
    }

    #[test]
    fn analysis_report_lists_sections() {
        let result = AnalysisResult {
            metricas: Metrics {
                cuota_efectiva: Some(869.94),
                dti: Some(41.0),
                ..Metrics::default()
            },
            avisos: vec!["DTI elevado".to_string()],
            ..AnalysisResult::default()
        };
        let report = render_analysis(&analysis_view(&result));
        assert!(report.contains("Cuota efectiva: 869,94 €\n"));
        assert!(report.contains("DTI: 41% (danger)\n"));
        assert!(report.contains("LTV: —\n"));
        assert!(report.contains("  • DTI elevado\n"));
        assert!(!report.contains("Subrogación"));
        assert!(report.contains("  sin datos\n"));
    }

    #[test]
    fn refinance_section_when_present() {
        let result = AnalysisResult {
            comparativa_subrogacion: Some(RefinanceComparison {
                tin_alternativo: 2.75,
                cuota_alternativa: 813.1,
                diferencia_cuota: -56.84,
                intereses_alternativos: 45144.0,
                ahorro_intereses: 13641.6,
            }),
            ..AnalysisResult::default()
        };
        let report = render_analysis(&analysis_view(&result));
        assert!(report.contains("Subrogación\n  TIN alternativo: 2.75%\n"));
    }

    #[test]
    fn hits_link_to_documents() {
        let api = ApiClient::new("http://localhost:8000/").expect("client");
        let hits = vec![SearchHit {
            id: "1".to_string(),
            score: 0.8123,
            texto: "Comisión por\namortización anticipada".to_string(),
            banco: "BBVA".to_string(),
            producto: "Hipoteca Fija".to_string(),
            origen: "ficha.pdf".to_string(),
            ruta_pdf: "/docs/ficha.pdf".to_string(),
        }];
        let rendered = render_hits(&hits, &api);
        assert!(rendered.starts_with("1. [0.812] BBVA · Hipoteca Fija (ficha.pdf)\n"));
        assert!(rendered.contains("   http://localhost:8000/docs/ficha.pdf\n"));
        assert!(rendered.contains("   Comisión por amortización anticipada\n"));
        assert_eq!(render_hits(&[], &api), "Sin resultados.");
    }

    #[test]
    fn health_line() {
        let health = HealthStatus {
            status: "ok".to_string(),
            uptime: Some("0:05:12".to_string()),
        };
        assert_eq!(render_health(&health), "ok (uptime 0:05:12)");
    }
}

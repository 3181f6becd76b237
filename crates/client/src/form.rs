use protocol::{AnalysisRequest, RateRegime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    CapitalPendiente,
    AnosRestantes,
    Tipo,
    Tin,
    Euribor,
    Diferencial,
    CuotaActual,
    IngresosMensuales,
    OtrasDeudasMensuales,
    ValorVivienda,
    OfertaAlternativaTin,
}

impl FormField {
    pub const ALL: [FormField; 11] = [
        FormField::CapitalPendiente,
        FormField::AnosRestantes,
        FormField::Tipo,
        FormField::Tin,
        FormField::Euribor,
        FormField::Diferencial,
        FormField::CuotaActual,
        FormField::IngresosMensuales,
        FormField::OtrasDeudasMensuales,
        FormField::ValorVivienda,
        FormField::OfertaAlternativaTin,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormField::CapitalPendiente => "capital_pendiente",
            FormField::AnosRestantes => "anos_restantes",
            FormField::Tipo => "tipo",
            FormField::Tin => "tin",
            FormField::Euribor => "euribor",
            FormField::Diferencial => "diferencial",
            FormField::CuotaActual => "cuota_actual",
            FormField::IngresosMensuales => "ingresos_mensuales",
            FormField::OtrasDeudasMensuales => "otras_deudas_mensuales",
            FormField::ValorVivienda => "valor_vivienda",
            FormField::OfertaAlternativaTin => "oferta_alternativa_tin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::CapitalPendiente => "Capital pendiente (€)",
            FormField::AnosRestantes => "Años restantes",
            FormField::Tipo => "Tipo",
            FormField::Tin => "TIN (%)",
            FormField::Euribor => "Euríbor (%)",
            FormField::Diferencial => "Diferencial (%)",
            FormField::CuotaActual => "Cuota actual (€)",
            FormField::IngresosMensuales => "Ingresos mensuales (€)",
            FormField::OtrasDeudasMensuales => "Otras deudas mensuales (€)",
            FormField::ValorVivienda => "Valor vivienda (€)",
            FormField::OfertaAlternativaTin => "TIN oferta alternativa (%)",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, FormField::CapitalPendiente | FormField::AnosRestantes)
    }
}

/// Raw form contents as the user typed them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisForm {
    pub capital_pendiente: String,
    pub anos_restantes: String,
    pub tipo: RateRegime,
    pub tin: String,
    pub euribor: String,
    pub diferencial: String,
    pub cuota_actual: String,
    pub ingresos_mensuales: String,
    pub otras_deudas_mensuales: String,
    pub valor_vivienda: String,
    pub oferta_alternativa_tin: String,
}

impl AnalysisForm {
    /// Text of a field. `Tipo` reports the regime name.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Tipo => self.tipo.as_str(),
            other => self.text(other),
        }
    }

    /// Editable text of a field; `None` for the regime selector.
    pub fn value_mut(&mut self, field: FormField) -> Option<&mut String> {
        let value = match field {
            FormField::CapitalPendiente => &mut self.capital_pendiente,
            FormField::AnosRestantes => &mut self.anos_restantes,
            FormField::Tipo => return None,
            FormField::Tin => &mut self.tin,
            FormField::Euribor => &mut self.euribor,
            FormField::Diferencial => &mut self.diferencial,
            FormField::CuotaActual => &mut self.cuota_actual,
            FormField::IngresosMensuales => &mut self.ingresos_mensuales,
            FormField::OtrasDeudasMensuales => &mut self.otras_deudas_mensuales,
            FormField::ValorVivienda => &mut self.valor_vivienda,
            FormField::OfertaAlternativaTin => &mut self.oferta_alternativa_tin,
        };
        Some(value)
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match self.value_mut(field) {
            Some(slot) => *slot = value,
            None => {
                if let Ok(regime) = value.parse() {
                    self.tipo = regime;
                }
            }
        }
    }

    pub fn toggle_regime(&mut self) {
        self.tipo = self.tipo.toggled();
    }

    /// Fields shown for the current regime. Hidden rate fields keep their
    /// text and are still submitted.
    pub fn visible_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| match field {
                FormField::Tin => self.tipo == RateRegime::Fijo,
                FormField::Euribor | FormField::Diferencial => self.tipo == RateRegime::Variable,
                _ => true,
            })
            .collect()
    }

    pub fn to_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            capital_pendiente: parse_required(&self.capital_pendiente),
            anos_restantes: parse_whole(&self.anos_restantes),
            tipo: self.tipo,
            tin: parse_optional(&self.tin),
            euribor: parse_optional(&self.euribor),
            diferencial: parse_optional(&self.diferencial),
            cuota_actual: parse_optional(&self.cuota_actual),
            ingresos_mensuales: parse_optional(&self.ingresos_mensuales),
            otras_deudas_mensuales: parse_optional(&self.otras_deudas_mensuales),
            valor_vivienda: parse_optional(&self.valor_vivienda),
            oferta_alternativa_tin: parse_optional(&self.oferta_alternativa_tin),
        }
    }

    fn text(&self, field: FormField) -> &str {
        match field {
            FormField::CapitalPendiente => &self.capital_pendiente,
            FormField::AnosRestantes => &self.anos_restantes,
            FormField::Tipo => self.tipo.as_str(),
            FormField::Tin => &self.tin,
            FormField::Euribor => &self.euribor,
            FormField::Diferencial => &self.diferencial,
            FormField::CuotaActual => &self.cuota_actual,
            FormField::IngresosMensuales => &self.ingresos_mensuales,
            FormField::OtrasDeudasMensuales => &self.otras_deudas_mensuales,
            FormField::ValorVivienda => &self.valor_vivienda,
            FormField::OfertaAlternativaTin => &self.oferta_alternativa_tin,
        }
    }
}

/// Required field: NaN when the text does not hold a number.
pub fn parse_required(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(f64::NAN)
}

/// Required integer field, truncated toward zero.
pub fn parse_whole(raw: &str) -> f64 {
    parse_required(raw).trunc()
}

/// Optional field: empty, unparsable and zero values all become `None`.
pub fn parse_optional(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|value| *value != 0.0)
}

/// Reads the leading number of `raw`, accepting a decimal comma and `.`
/// thousands separators (`150.000,50`, `150.000`). Without a comma, dots
/// count as grouping only when every group after the first has three
/// digits, so `3.5` stays a decimal. Trailing text such as `%` or `€` is
/// ignored.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        strip_grouping_dots(trimmed)
    };

    let bytes = normalized.as_bytes();
    let mut end = 0usize;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start || digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    normalized[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Drops the dots from a leading `1.234.567`-shaped run.
fn strip_grouping_dots(text: &str) -> String {
    let start = usize::from(text.starts_with(['+', '-']));
    let run_end = text[start..]
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .map_or(text.len(), |idx| start + idx);
    let run = &text[start..run_end];

    let mut groups = run.split('.');
    let head = groups.next().unwrap_or_default();
    let tail = groups.collect::<Vec<_>>();
    let grouped = !tail.is_empty()
        && (1..=3).contains(&head.len())
        && tail.iter().all(|group| group.len() == 3);
    if !grouped {
        return text.to_string();
    }
    format!("{}{}{}", &text[..start], run.replace('.', ""), &text[run_end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_form() -> AnalysisForm {
        let mut form = AnalysisForm::default();
        form.set(FormField::CapitalPendiente, "150000");
        form.set(FormField::AnosRestantes, "20");
        form.set(FormField::Tin, "3.5");
        form
    }

    #[test]
    fn builds_request_from_scenario() {
        let request = scenario_form().to_request();
        assert_eq!(request.capital_pendiente, 150000.0);
        assert_eq!(request.anos_restantes, 20.0);
        assert_eq!(request.tipo, RateRegime::Fijo);
        assert_eq!(request.tin, Some(3.5));
        assert_eq!(request.valor_vivienda, None);
        assert_eq!(request.otras_deudas_mensuales, None);
    }

    #[test]
    fn required_fields_stay_numeric_even_when_invalid() {
        let mut form = scenario_form();
        form.set(FormField::CapitalPendiente, "");
        form.set(FormField::AnosRestantes, "veinte");
        let request = form.to_request();
        assert!(request.capital_pendiente.is_nan());
        assert!(request.anos_restantes.is_nan());
    }

    #[test]
    fn optional_fields_never_carry_nan() {
        let mut form = scenario_form();
        form.set(FormField::IngresosMensuales, "abc");
        form.set(FormField::ValorVivienda, "   ");
        form.set(FormField::CuotaActual, "0");
        form.set(FormField::OfertaAlternativaTin, "inf");
        let request = form.to_request();
        assert_eq!(request.ingresos_mensuales, None);
        assert_eq!(request.valor_vivienda, None);
        assert_eq!(request.cuota_actual, None);
        assert_eq!(request.oferta_alternativa_tin, None);
    }

    #[test]
    fn lenient_number_parsing() {
        assert_eq!(parse_number("3,25"), Some(3.25));
        assert_eq!(parse_number("150.000,50"), Some(150000.5));
        assert_eq!(parse_number("150.000"), Some(150000.0));
        assert_eq!(parse_number("1.234.567"), Some(1234567.0));
        assert_eq!(parse_number("-250.000 €"), Some(-250000.0));
        assert_eq!(parse_number("3.25"), Some(3.25));
        assert_eq!(parse_number("1.2345"), Some(1.2345));
        assert_eq!(parse_number("1234.500"), Some(1234.5));
        assert_eq!(parse_number(" 3.5% "), Some(3.5));
        assert_eq!(parse_number("1200 €"), Some(1200.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("2e3"), Some(2000.0));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_whole("20.9"), 20.0);
    }

    #[test]
    fn regime_controls_visible_rate_fields() {
        let mut form = scenario_form();
        assert!(form.visible_fields().contains(&FormField::Tin));
        assert!(!form.visible_fields().contains(&FormField::Euribor));

        form.set(FormField::Euribor, "3,1");
        form.set(FormField::Diferencial, "0.9");
        form.toggle_regime();
        let visible = form.visible_fields();
        assert!(!visible.contains(&FormField::Tin));
        assert!(visible.contains(&FormField::Diferencial));

        let request = form.to_request();
        assert_eq!(request.tipo, RateRegime::Variable);
        assert_eq!(request.tin, Some(3.5));
        assert_eq!(request.euribor, Some(3.1));
    }

    #[test]
    fn tipo_is_set_by_name() {
        let mut form = AnalysisForm::default();
        form.set(FormField::Tipo, "variable");
        assert_eq!(form.value(FormField::Tipo), "variable");
        form.set(FormField::Tipo, "desconocido");
        assert_eq!(form.tipo, RateRegime::Variable);
    }
}

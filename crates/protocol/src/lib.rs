use serde::{Deserialize, Serialize};

pub mod chat;
pub mod search;

mod number;

pub use chat::{AskRequest, AskResponse, CitedDocument, ResetSessionRequest};
pub use search::{HealthStatus, SearchHit, SearchQuery};

pub const ANALYSIS_PATH: &str = "/analisis";
pub const ASK_PATH: &str = "/preguntar";
pub const RESET_SESSION_PATH: &str = "/reiniciar_sesion";
pub const HEALTH_PATH: &str = "/health";
pub const SEARCH_PATH: &str = "/buscar";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateRegime {
    #[default]
    Fijo,
    Variable,
}

impl RateRegime {
    pub fn as_str(self) -> &'static str {
        match self {
            RateRegime::Fijo => "fijo",
            RateRegime::Variable => "variable",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RateRegime::Fijo => RateRegime::Variable,
            RateRegime::Variable => RateRegime::Fijo,
        }
    }
}

impl std::str::FromStr for RateRegime {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fijo" | "fixed" => Ok(RateRegime::Fijo),
            "variable" => Ok(RateRegime::Variable),
            other => Err(format!("unknown rate regime: {other}")),
        }
    }
}

/// Body of `POST /analisis`.
///
/// The two required fields are always present as numbers. When the form
/// value did not parse they hold NaN, which serializes to `null` and lets the
/// backend reject the request. Optional fields are always emitted, `null`
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    #[serde(deserialize_with = "number::nullable_f64")]
    pub capital_pendiente: f64,
    #[serde(
        serialize_with = "number::whole",
        deserialize_with = "number::nullable_f64"
    )]
    pub anos_restantes: f64,
    pub tipo: RateRegime,
    pub tin: Option<f64>,
    pub euribor: Option<f64>,
    pub diferencial: Option<f64>,
    pub cuota_actual: Option<f64>,
    pub ingresos_mensuales: Option<f64>,
    pub otras_deudas_mensuales: Option<f64>,
    pub valor_vivienda: Option<f64>,
    pub oferta_alternativa_tin: Option<f64>,
}

/// Successful payload of `POST /analisis`, minus the `ok` flag.
///
/// Every block defaults when absent so one missing section never prevents
/// the others from rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    #[serde(default)]
    pub entrada: AnalysisInputEcho,
    #[serde(default)]
    pub metricas: Metrics,
    #[serde(default)]
    pub resumen_amortizacion: Vec<AmortizationRow>,
    #[serde(default)]
    pub stress_test: Option<StressTest>,
    #[serde(default)]
    pub amortizacion_extra: Option<ExtraAmortization>,
    #[serde(default)]
    pub comparativa_subrogacion: Option<RefinanceComparison>,
    #[serde(default)]
    pub avisos: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisInputEcho {
    #[serde(default)]
    pub capital_pendiente: Option<f64>,
    #[serde(default)]
    pub anos_restantes: Option<f64>,
    #[serde(default)]
    pub tipo: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    #[serde(default)]
    pub cuota_efectiva: Option<f64>,
    #[serde(default)]
    pub cuota_estimada: Option<f64>,
    #[serde(default)]
    pub intereses_restantes_aprox: Option<f64>,
    #[serde(default)]
    pub dti: Option<f64>,
    #[serde(default)]
    pub ltv: Option<f64>,
}

/// One sampled month of the amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmortizationRow {
    pub mes: u32,
    pub cuota: f64,
    pub interes_mes: f64,
    pub amortizado_mes: f64,
    pub saldo: f64,
    pub interes_acum: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StressTest {
    #[serde(default)]
    pub cuota_base: Option<f64>,
    #[serde(default)]
    pub escenarios: Vec<StressScenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressScenario {
    pub delta_tipo_pp: f64,
    #[serde(default)]
    pub tipo_resultante: Option<f64>,
    pub cuota: f64,
    pub diferencia: f64,
}

/// Interest saved by prepaying 1k, 5k and 10k now.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtraAmortization {
    #[serde(default)]
    pub ahorro_1k: Option<f64>,
    #[serde(default)]
    pub ahorro_5k: Option<f64>,
    #[serde(default)]
    pub ahorro_10k: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefinanceComparison {
    pub tin_alternativo: f64,
    pub cuota_alternativa: f64,
    pub diferencia_cuota: f64,
    pub intereses_alternativos: f64,
    pub ahorro_intereses: f64,
}

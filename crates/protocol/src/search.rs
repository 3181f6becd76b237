use serde::{Deserialize, Serialize};

/// Query string of `GET /buscar`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub top_k: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banco: Option<String>,
    pub min_score: f32,
}

impl SearchQuery {
    pub const MAX_TOP_K: u32 = 20;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: 5,
            banco: None,
            min_score: 0.15,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub texto: String,
    #[serde(default)]
    pub banco: String,
    #[serde(default)]
    pub producto: String,
    #[serde(default)]
    pub origen: String,
    #[serde(default)]
    pub ruta_pdf: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub uptime: Option<String>,
}

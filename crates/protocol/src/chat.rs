use serde::{Deserialize, Serialize};

use crate::AnalysisResult;

/// Body of `POST /preguntar`.
///
/// Backends differ in how they recover the conversation context: some key it
/// by `session_id`, others expect the last analysis inline as `contexto`.
/// Fields the caller leaves unset are omitted from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskRequest {
    pub pregunta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexto: Option<AnalysisResult>,
}

impl AskRequest {
    pub fn new(pregunta: impl Into<String>) -> Self {
        Self {
            pregunta: pregunta.into(),
            session_id: None,
            temperature: None,
            max_tokens: None,
            contexto: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub respuesta: Option<String>,
    #[serde(default)]
    pub documentos_usados: Option<Vec<CitedDocument>>,
}

impl AskResponse {
    pub fn answered(respuesta: impl Into<String>, documentos: Vec<CitedDocument>) -> Self {
        Self {
            ok: Some(true),
            error: None,
            respuesta: Some(respuesta.into()),
            documentos_usados: Some(documentos),
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: Some(false),
            error: Some(error.into()),
            respuesta: None,
            documentos_usados: None,
        }
    }
}

/// A source document the answer was grounded on.
///
/// Retrieval hits coming straight from the search index carry the link as
/// `ruta_pdf`; both spellings are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitedDocument {
    #[serde(default)]
    pub origen: String,
    #[serde(default, alias = "ruta_pdf")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetSessionRequest {
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_fields_are_omitted() {
        let value = serde_json::to_value(AskRequest::new("¿Me conviene amortizar?"))
            .expect("serialize");
        assert_eq!(value, json!({"pregunta": "¿Me conviene amortizar?"}));
    }

    #[test]
    fn accepts_ruta_pdf_as_url() {
        let response: AskResponse = serde_json::from_value(json!({
            "ok": true,
            "respuesta": "Depende del diferencial.",
            "documentos_usados": [
                {"id": "7", "score": 0.4, "origen": "FIPRE ING", "ruta_pdf": "/docs/ing.pdf"},
                {"origen": "BOE", "url": "/docs/1.pdf"}
            ]
        }))
        .expect("deserialize");
        let docs = response.documentos_usados.expect("docs");
        assert_eq!(docs[0].url, "/docs/ing.pdf");
        assert_eq!(docs[1].origen, "BOE");
    }

    #[test]
    fn bare_answer_without_flag() {
        let response: AskResponse =
            serde_json::from_value(json!({"respuesta": "Hola"})).expect("deserialize");
        assert_eq!(response.ok, None);
        assert_eq!(response.respuesta.as_deref(), Some("Hola"));
        assert!(response.documentos_usados.is_none());
    }
}

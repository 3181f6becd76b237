use thiserror::Error;

pub const ANALYSIS_REJECTED_FALLBACK: &str = "Error en el análisis";
pub const ASK_REJECTED_FALLBACK: &str = "Error en la pregunta";
pub const CHAT_CONNECTIVITY_MESSAGE: &str = "Error al conectarse con el servidor";
pub const PRECONDITION_MESSAGE: &str = "Primero realiza un análisis antes de preguntar.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The backend answered but refused the request; the text is shown as-is.
    #[error("{0}")]
    Rejected(String),
    #[error("connectivity failure: {0}")]
    Connectivity(String),
    #[error("no analysis available to ask about")]
    Precondition,
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    pub fn connectivity(err: impl std::fmt::Display) -> Self {
        ClientError::Connectivity(err.to_string())
    }

    /// Text suitable for the analysis status line.
    pub fn analysis_message(&self, base_url: &str) -> String {
        match self {
            ClientError::Rejected(message) => message.clone(),
            ClientError::Connectivity(_) => {
                format!("No se pudo conectar con el servidor. ¿Está accesible en {base_url}?")
            }
            ClientError::Precondition => PRECONDITION_MESSAGE.to_string(),
            ClientError::InvalidBaseUrl(url) => format!("URL de servidor no válida: {url}"),
        }
    }

    /// Text appended to the chat transcript when a turn fails.
    pub fn chat_message(&self) -> String {
        match self {
            ClientError::Rejected(message) => message.clone(),
            ClientError::Precondition => PRECONDITION_MESSAGE.to_string(),
            ClientError::Connectivity(_) | ClientError::InvalidBaseUrl(_) => {
                CHAT_CONNECTIVITY_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_text_is_verbatim() {
        let err = ClientError::Rejected("Para 'fijo' necesitas el TIN (%).".to_string());
        assert_eq!(
            err.analysis_message("http://localhost:8000"),
            "Para 'fijo' necesitas el TIN (%)."
        );
        assert_eq!(err.chat_message(), "Para 'fijo' necesitas el TIN (%).");
    }

    #[test]
    fn connectivity_uses_fixed_text() {
        let err = ClientError::connectivity("connection refused");
        assert_eq!(err.chat_message(), CHAT_CONNECTIVITY_MESSAGE);
        assert!(err
            .analysis_message("http://10.0.0.2:8000")
            .contains("http://10.0.0.2:8000"));
        assert!(!err.analysis_message("x").contains("refused"));
    }
}

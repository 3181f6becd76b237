pub mod chat;
pub mod error;
pub mod form;
pub mod format;
pub mod http;
pub mod session;
pub mod view;

pub use chat::{
    ChatContextMode, ChatController, ChatMessage, ChatOptions, ClientSession, SendOutcome,
    Sender, Transcript, TurnOutcome, TurnState, TurnToken,
};
pub use error::ClientError;
pub use form::{AnalysisForm, FormField};
pub use http::{ApiClient, AskAnswer, MortgageApi};
pub use session::SessionStore;
pub use view::{analysis_view, transcript_view, AnalysisView, TranscriptEntry};

/// Used when neither flags, environment nor config name a backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

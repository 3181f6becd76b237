use protocol::{AnalysisResult, AskRequest, CitedDocument};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, PRECONDITION_MESSAGE};
use crate::http::{AskAnswer, MortgageApi};

pub const ANALYSIS_READY_MESSAGE: &str =
    "Análisis completado. Ahora puedes hacer preguntas al asistente.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    System,
    Bot,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "Usuario",
            Sender::System => "Sistema",
            Sender::Bot => "Bot",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub documents: Vec<CitedDocument>,
}

#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, sender: Sender, text: impl Into<String>, documents: Vec<CitedDocument>) {
        self.messages.push(ChatMessage {
            sender,
            text: text.into(),
            documents,
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// How a question carries its conversational context to the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatContextMode {
    /// `session_id` only; the backend keeps the context.
    Session,
    /// The cached analysis travels inline as `contexto`.
    Inline,
    #[default]
    Both,
}

impl ChatContextMode {
    fn sends_session(self) -> bool {
        matches!(self, ChatContextMode::Session | ChatContextMode::Both)
    }

    fn sends_inline(self) -> bool {
        matches!(self, ChatContextMode::Inline | ChatContextMode::Both)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatOptions {
    pub context: ChatContextMode,
    /// Allow questions before any analysis when the backend tracks the
    /// session itself.
    pub session_fallback: bool,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            context: ChatContextMode::Both,
            session_fallback: false,
            temperature: Some(0.2),
            max_tokens: Some(250),
        }
    }
}

/// Per-client state: the session id and the last successful analysis.
#[derive(Clone, Debug)]
pub struct ClientSession {
    session_id: String,
    last_analysis: Option<AnalysisResult>,
}

impl ClientSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            last_analysis: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn last_analysis(&self) -> Option<&AnalysisResult> {
        self.last_analysis.as_ref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnToken(u64);

impl TurnToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingResponse(TurnToken),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SendOutcome {
    /// Blank input; nothing recorded, nothing sent.
    Ignored,
    /// No analysis to talk about; answered locally.
    Refused,
    Dispatch { token: TurnToken, request: AskRequest },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Ignored,
    Refused,
    Answered,
    Failed,
    /// A newer turn was issued before this answer arrived.
    Stale,
}

/// Chat widget state machine.
///
/// A turn goes `Idle -> AwaitingResponse -> Idle`. Only the most recently
/// issued turn may update the transcript; answers for older tokens are
/// dropped. The typing indicator is shown exactly while a turn is awaited.
#[derive(Debug)]
pub struct ChatController {
    session: ClientSession,
    options: ChatOptions,
    transcript: Transcript,
    state: TurnState,
    next_turn: u64,
}

impl ChatController {
    pub fn new(session: ClientSession, options: ChatOptions) -> Self {
        Self {
            session,
            options,
            transcript: Transcript::default(),
            state: TurnState::Idle,
            next_turn: 1,
        }
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.state, TurnState::AwaitingResponse(_))
    }

    pub fn push_message(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        documents: Vec<CitedDocument>,
    ) {
        self.transcript.push(sender, text, documents);
    }

    /// Caches a successful analysis for later questions.
    pub fn record_analysis(&mut self, result: AnalysisResult) {
        self.session.last_analysis = Some(result);
        self.transcript
            .push(Sender::System, ANALYSIS_READY_MESSAGE, Vec::new());
    }

    pub fn can_ask(&self) -> bool {
        self.session.last_analysis.is_some()
            || (self.options.session_fallback && self.options.context.sends_session())
    }

    pub fn begin_send(&mut self, input: &str) -> SendOutcome {
        let question = input.trim();
        if question.is_empty() {
            return SendOutcome::Ignored;
        }
        self.transcript.push(Sender::User, question, Vec::new());

        if !self.can_ask() {
            self.transcript
                .push(Sender::Bot, PRECONDITION_MESSAGE, Vec::new());
            return SendOutcome::Refused;
        }

        let token = TurnToken(self.next_turn);
        self.next_turn += 1;
        if let TurnState::AwaitingResponse(previous) = self.state {
            tracing::debug!(
                previous = previous.value(),
                turn = token.value(),
                "superseding outstanding chat turn"
            );
        }
        self.state = TurnState::AwaitingResponse(token);

        SendOutcome::Dispatch {
            token,
            request: self.build_request(question),
        }
    }

    pub fn complete(
        &mut self,
        token: TurnToken,
        result: Result<AskAnswer, ClientError>,
    ) -> TurnOutcome {
        if self.state != TurnState::AwaitingResponse(token) {
            tracing::debug!(turn = token.value(), "dropping stale chat answer");
            return TurnOutcome::Stale;
        }
        self.state = TurnState::Idle;
        match result {
            Ok(answer) => {
                self.transcript
                    .push(Sender::Bot, answer.text, answer.documents);
                TurnOutcome::Answered
            }
            Err(err) => {
                tracing::warn!(turn = token.value(), error = %err, "chat turn failed");
                self.transcript
                    .push(Sender::Bot, err.chat_message(), Vec::new());
                TurnOutcome::Failed
            }
        }
    }

    /// Runs one full turn against `api`.
    pub async fn send<A: MortgageApi + ?Sized>(&mut self, api: &A, input: &str) -> TurnOutcome {
        match self.begin_send(input) {
            SendOutcome::Ignored => TurnOutcome::Ignored,
            SendOutcome::Refused => TurnOutcome::Refused,
            SendOutcome::Dispatch { token, request } => {
                let result = api.ask(&request).await;
                self.complete(token, result)
            }
        }
    }

    fn build_request(&self, question: &str) -> AskRequest {
        let mut request = AskRequest::new(question);
        if self.options.context.sends_session() {
            request.session_id = Some(self.session.session_id.clone());
        }
        if self.options.context.sends_inline() {
            request.contexto = self.session.last_analysis.clone();
        }
        request.temperature = self.options.temperature;
        request.max_tokens = self.options.max_tokens;
        request
    }
}

use hipoteca_client::{ApiClient, AskAnswer, ClientError, MortgageApi, TurnToken};
use protocol::{AnalysisRequest, AnalysisResult, AskRequest, HealthStatus};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Tags one submitted analysis; only the newest one is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AnalysisToken(pub(crate) u64);

/// Results reported back to the UI loop.
#[derive(Debug)]
pub(crate) enum UiEvent {
    Health(Result<HealthStatus, ClientError>),
    AnalysisFinished {
        token: AnalysisToken,
        result: Result<AnalysisResult, ClientError>,
    },
    AnswerReceived {
        token: TurnToken,
        result: Result<AskAnswer, ClientError>,
    },
}

/// Requests issued by key handling.
#[derive(Debug)]
pub(crate) enum UiCommand {
    Analyze {
        token: AnalysisToken,
        request: AnalysisRequest,
    },
    Ask {
        token: TurnToken,
        request: AskRequest,
    },
    CheckHealth,
}

/// Runs every command on its own task so a slow backend never blocks the
/// UI or other requests.
pub(crate) fn spawn_dispatcher(
    api: Arc<ApiClient>,
    mut cmd_rx: mpsc::Receiver<UiCommand>,
    ui_tx: mpsc::Sender<UiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = cmd_rx.recv().await {
            let api = Arc::clone(&api);
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                let event = run_command(&api, command).await;
                if ui_tx.send(event).await.is_err() {
                    tracing::debug!("ui closed before response arrived");
                }
            });
        }
    })
}

async fn run_command(api: &ApiClient, command: UiCommand) -> UiEvent {
    match command {
        UiCommand::Analyze { token, request } => UiEvent::AnalysisFinished {
            token,
            result: api.analyze(&request).await,
        },
        UiCommand::Ask { token, request } => UiEvent::AnswerReceived {
            token,
            result: api.ask(&request).await,
        },
        UiCommand::CheckHealth => UiEvent::Health(api.health().await),
    }
}

pub(crate) fn spawn_session_reset(api: Arc<ApiClient>, session_id: String) {
    tokio::spawn(async move {
        reset_session(api.as_ref(), &session_id).await;
    });
}

/// Failures are logged and otherwise ignored.
pub(crate) async fn reset_session<A: MortgageApi + ?Sized>(api: &A, session_id: &str) {
    match api.reset_session(session_id).await {
        Ok(()) => tracing::info!(session_id, "session reset"),
        Err(err) => tracing::warn!(session_id, error = %err, "session reset failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hipoteca_client::AnalysisForm;

    #[tokio::test]
    async fn unreachable_backend_reports_connectivity() {
        let api = Arc::new(ApiClient::new("http://127.0.0.1:1").expect("client"));
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (ui_tx, mut ui_rx) = mpsc::channel(4);
        let _dispatcher = spawn_dispatcher(api, cmd_rx, ui_tx);

        cmd_tx
            .send(UiCommand::Analyze {
                token: AnalysisToken(7),
                request: AnalysisForm::default().to_request(),
            })
            .await
            .expect("send");
        match ui_rx.recv().await.expect("event") {
            UiEvent::AnalysisFinished {
                token: AnalysisToken(7),
                result: Err(ClientError::Connectivity(_)),
            } => {}
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_reset_is_swallowed() {
        let api = ApiClient::new("http://127.0.0.1:1").expect("client");
        reset_session(&api, "abc").await;
    }
}

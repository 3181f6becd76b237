use crate::runtime::{AnalysisToken, UiEvent};
use hipoteca_client::view::{analysis_view, AnalysisView};
use hipoteca_client::{AnalysisForm, ChatController, FormField};
use protocol::AnalysisRequest;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Focus {
    #[default]
    Form,
    Results,
    Chat,
}

impl Focus {
    pub(crate) fn next(self) -> Self {
        match self {
            Focus::Form => Focus::Results,
            Focus::Results => Focus::Chat,
            Focus::Chat => Focus::Form,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Focus::Form => Focus::Chat,
            Focus::Results => Focus::Form,
            Focus::Chat => Focus::Results,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum AnalysisStatus {
    #[default]
    Idle,
    Running,
    Done,
    Failed(String),
}

pub(crate) struct AppState {
    pub(crate) base_url: String,
    pub(crate) health: Option<String>,
    pub(crate) focus: Focus,
    pub(crate) form: AnalysisForm,
    pub(crate) selected_field: usize,
    pub(crate) analysis: Option<AnalysisView>,
    pub(crate) analysis_status: AnalysisStatus,
    pending_analysis: Option<AnalysisToken>,
    next_analysis: u64,
    pub(crate) chat: ChatController,
    pub(crate) chat_input: String,
    pub(crate) chat_offset: usize,
    pub(crate) chat_max_offset: usize,
    pub(crate) results_scroll: usize,
    pub(crate) results_max_scroll: usize,
    pub(crate) results_total_lines: usize,
    pub(crate) results_view_height: u16,
    pub(crate) pending_g: bool,
    pub(crate) confirm_quit: bool,
}

impl AppState {
    pub(crate) fn new(base_url: impl Into<String>, chat: ChatController) -> Self {
        Self {
            base_url: base_url.into(),
            health: None,
            focus: Focus::default(),
            form: AnalysisForm::default(),
            selected_field: 0,
            analysis: None,
            analysis_status: AnalysisStatus::default(),
            pending_analysis: None,
            next_analysis: 0,
            chat,
            chat_input: String::new(),
            chat_offset: 0,
            chat_max_offset: 0,
            results_scroll: 0,
            results_max_scroll: 0,
            results_total_lines: 0,
            results_view_height: 0,
            pending_g: false,
            confirm_quit: false,
        }
    }

    pub(crate) fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Health(Ok(health)) => {
                self.health = Some(match health.uptime {
                    Some(uptime) => format!("{} ({uptime})", health.status),
                    None => health.status,
                });
            }
            UiEvent::Health(Err(err)) => {
                tracing::warn!(error = %err, "health check failed");
                self.health = Some("sin conexión".to_string());
            }
            UiEvent::AnalysisFinished { token, result } => {
                if self.pending_analysis != Some(token) {
                    tracing::debug!(analysis = token.0, "dropping superseded analysis");
                    return;
                }
                self.pending_analysis = None;
                match result {
                    Ok(result) => {
                        self.analysis = Some(analysis_view(&result));
                        self.analysis_status = AnalysisStatus::Done;
                        self.chat.record_analysis(result);
                        self.results_scroll = 0;
                        self.pending_g = false;
                        self.chat_offset = 0;
                    }
                    Err(err) => {
                        tracing::warn!(analysis = token.0, error = %err, "analysis failed");
                        self.analysis_status =
                            AnalysisStatus::Failed(err.analysis_message(&self.base_url));
                    }
                }
            }
            UiEvent::AnswerReceived { token, result } => {
                self.chat.complete(token, result);
                self.chat_offset = 0;
            }
        }
    }

    pub(crate) fn selected_field(&self) -> FormField {
        let visible = self.form.visible_fields();
        visible[self.selected_field.min(visible.len() - 1)]
    }

    pub(crate) fn select_next_field(&mut self) {
        let count = self.form.visible_fields().len();
        self.selected_field = (self.selected_field + 1) % count;
    }

    pub(crate) fn select_prev_field(&mut self) {
        let count = self.form.visible_fields().len();
        self.selected_field = if self.selected_field == 0 {
            count - 1
        } else {
            self.selected_field - 1
        };
    }

    pub(crate) fn toggle_regime(&mut self) {
        let selected = self.selected_field();
        self.form.toggle_regime();
        let visible = self.form.visible_fields();
        self.selected_field = visible
            .iter()
            .position(|field| *field == selected)
            .unwrap_or_else(|| self.selected_field.min(visible.len() - 1));
    }

    /// Request for the current form. A newer submit supersedes any
    /// analysis still in flight; its late result is dropped.
    pub(crate) fn begin_analysis(&mut self) -> (AnalysisToken, AnalysisRequest) {
        if let Some(previous) = self.pending_analysis {
            tracing::debug!(analysis = previous.0, "superseding outstanding analysis");
        }
        self.next_analysis += 1;
        let token = AnalysisToken(self.next_analysis);
        self.pending_analysis = Some(token);
        self.analysis_status = AnalysisStatus::Running;
        (token, self.form.to_request())
    }

    pub(crate) fn set_result_metrics(&mut self, total_lines: usize, view_height: u16) {
        let total_lines = total_lines.max(1);
        self.results_total_lines = total_lines;
        self.results_view_height = view_height;
        self.results_max_scroll = total_lines.saturating_sub(view_height as usize);
        if self.results_scroll > self.results_max_scroll {
            self.results_scroll = self.results_max_scroll;
        }
    }

    /// Transcript is pinned to the bottom; `chat_offset` counts lines
    /// scrolled back from there.
    pub(crate) fn set_chat_metrics(&mut self, total_lines: usize, view_height: u16) {
        self.chat_max_offset = total_lines.saturating_sub(view_height as usize);
        if self.chat_offset > self.chat_max_offset {
            self.chat_offset = self.chat_max_offset;
        }
    }

    pub(crate) fn chat_scroll(&self) -> usize {
        self.chat_max_offset - self.chat_offset.min(self.chat_max_offset)
    }

    pub(crate) fn scroll_down(&mut self, lines: usize) {
        self.results_scroll = (self.results_scroll + lines).min(self.results_max_scroll);
        self.pending_g = false;
    }

    pub(crate) fn scroll_up(&mut self, lines: usize) {
        self.results_scroll = self.results_scroll.saturating_sub(lines);
        self.pending_g = false;
    }

    pub(crate) fn scroll_to_top(&mut self) {
        self.results_scroll = 0;
        self.pending_g = false;
    }

    pub(crate) fn scroll_to_bottom(&mut self) {
        self.results_scroll = self.results_max_scroll;
        self.pending_g = false;
    }

    pub(crate) fn page_size(&self) -> usize {
        let height = self.results_view_height.max(1) as usize;
        height.saturating_sub(1).max(1)
    }

    pub(crate) fn chat_back(&mut self, lines: usize) {
        self.chat_offset = (self.chat_offset + lines).min(self.chat_max_offset);
    }

    pub(crate) fn chat_forward(&mut self, lines: usize) {
        self.chat_offset = self.chat_offset.saturating_sub(lines);
    }
}

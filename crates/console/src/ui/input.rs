use crate::runtime::{UiCommand, UiEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hipoteca_client::{ClientError, FormField, SendOutcome};
use tokio::sync::mpsc;

use super::app::{AppState, Focus};

/// Returns `true` when the user asked to quit.
pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut AppState,
    cmd_tx: &mpsc::Sender<UiCommand>,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    if app.confirm_quit {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            _ => app.confirm_quit = false,
        }
    }

    match key.code {
        KeyCode::Esc => {
            app.confirm_quit = true;
            return false;
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return false;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return false;
        }
        KeyCode::F(5) => {
            send_command(cmd_tx, UiCommand::CheckHealth);
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Form => handle_form_key(key, app, cmd_tx),
        Focus::Results => handle_results_key(key, app),
        Focus::Chat => handle_chat_key(key, app, cmd_tx),
    }
    false
}

fn handle_form_key(key: KeyEvent, app: &mut AppState, cmd_tx: &mpsc::Sender<UiCommand>) {
    let field = app.selected_field();
    match key.code {
        KeyCode::Down => app.select_next_field(),
        KeyCode::Up => app.select_prev_field(),
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if field == FormField::Tipo => {
            app.toggle_regime();
        }
        KeyCode::Enter => submit_analysis(app, cmd_tx),
        KeyCode::Backspace => {
            if let Some(value) = app.form.value_mut(field) {
                value.pop();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(value) = app.form.value_mut(field) {
                value.clear();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(value) = app.form.value_mut(field) {
                value.push(ch);
            }
        }
        _ => {}
    }
}

fn handle_chat_key(key: KeyEvent, app: &mut AppState, cmd_tx: &mpsc::Sender<UiCommand>) {
    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.chat_input.push('\n');
        }
        KeyCode::Enter => submit_question(app, cmd_tx),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::PageUp => app.chat_back(5),
        KeyCode::PageDown => app.chat_forward(5),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat_input.clear();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat_input.push(ch);
        }
        _ => {}
    }
}

fn handle_results_key(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(app.page_size()),
        KeyCode::PageUp => app.scroll_up(app.page_size()),
        KeyCode::Char('g') => {
            if app.pending_g {
                app.scroll_to_top();
            } else {
                app.pending_g = true;
            }
        }
        KeyCode::Char('G') => app.scroll_to_bottom(),
        _ => app.pending_g = false,
    }
}

fn submit_analysis(app: &mut AppState, cmd_tx: &mpsc::Sender<UiCommand>) {
    let (token, request) = app.begin_analysis();
    if !send_command(cmd_tx, UiCommand::Analyze { token, request }) {
        app.handle_event(UiEvent::AnalysisFinished {
            token,
            result: Err(ClientError::connectivity("dispatcher closed")),
        });
    }
}

fn submit_question(app: &mut AppState, cmd_tx: &mpsc::Sender<UiCommand>) {
    match app.chat.begin_send(&app.chat_input) {
        SendOutcome::Ignored => {}
        SendOutcome::Refused => app.chat_input.clear(),
        SendOutcome::Dispatch { token, request } => {
            app.chat_input.clear();
            app.chat_offset = 0;
            if !send_command(cmd_tx, UiCommand::Ask { token, request }) {
                app.chat
                    .complete(token, Err(ClientError::connectivity("dispatcher closed")));
            }
        }
    }
}

fn send_command(cmd_tx: &mpsc::Sender<UiCommand>, command: UiCommand) -> bool {
    match cmd_tx.try_send(command) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "failed to queue command");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::app::AnalysisStatus;
    use hipoteca_client::{ChatController, ChatOptions, ClientSession};
    use protocol::{AnalysisResult, RateRegime};

    fn app() -> AppState {
        AppState::new(
            "http://localhost:8000",
            ChatController::new(ClientSession::new("s"), ChatOptions::default()),
        )
    }

    fn analyzed(app: &mut AppState) {
        let (token, _) = app.begin_analysis();
        app.handle_event(UiEvent::AnalysisFinished {
            token,
            result: Ok(AnalysisResult::default()),
        });
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut AppState, tx: &mpsc::Sender<UiCommand>, text: &str) {
        for ch in text.chars() {
            handle_key_event(press(KeyCode::Char(ch)), app, tx);
        }
    }

    #[test]
    fn form_enter_submits_typed_values() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = app();
        type_text(&mut app, &tx, "150000");
        handle_key_event(press(KeyCode::Down), &mut app, &tx);
        type_text(&mut app, &tx, "20");
        handle_key_event(press(KeyCode::Down), &mut app, &tx);
        handle_key_event(press(KeyCode::Down), &mut app, &tx);
        type_text(&mut app, &tx, "3,5");
        handle_key_event(press(KeyCode::Enter), &mut app, &tx);

        let Ok(UiCommand::Analyze { request, .. }) = rx.try_recv() else {
            panic!("expected analyze command");
        };
        assert_eq!(request.capital_pendiente, 150000.0);
        assert_eq!(request.anos_restantes, 20.0);
        assert_eq!(request.tin, Some(3.5));
        assert_eq!(app.analysis_status, AnalysisStatus::Running);
    }

    #[test]
    fn enter_resubmits_while_analysis_is_pending() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = app();
        type_text(&mut app, &tx, "150.000");
        handle_key_event(press(KeyCode::Enter), &mut app, &tx);
        handle_key_event(press(KeyCode::Enter), &mut app, &tx);

        let Ok(UiCommand::Analyze { token: first, .. }) = rx.try_recv() else {
            panic!("expected first analyze command");
        };
        let Ok(UiCommand::Analyze { token: second, request }) = rx.try_recv() else {
            panic!("expected second analyze command");
        };
        assert_ne!(first, second);
        assert_eq!(request.capital_pendiente, 150000.0);
    }

    #[test]
    fn arrows_toggle_regime_on_tipo() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = app();
        handle_key_event(press(KeyCode::Down), &mut app, &tx);
        handle_key_event(press(KeyCode::Down), &mut app, &tx);
        assert_eq!(app.selected_field(), FormField::Tipo);
        handle_key_event(press(KeyCode::Right), &mut app, &tx);
        assert_eq!(app.form.tipo, RateRegime::Variable);
        handle_key_event(press(KeyCode::Char('x')), &mut app, &tx);
        assert_eq!(app.form.tipo, RateRegime::Variable);
    }

    #[test]
    fn shift_enter_inserts_newline_without_sending() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = app();
        app.focus = Focus::Chat;
        analyzed(&mut app);
        type_text(&mut app, &tx, "hola");
        handle_key_event(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT),
            &mut app,
            &tx,
        );
        assert_eq!(app.chat_input, "hola\n");
        assert!(rx.try_recv().is_err());
        assert!(!app.chat.is_typing());
    }

    #[test]
    fn enter_sends_question_and_clears_input() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = app();
        app.focus = Focus::Chat;
        analyzed(&mut app);
        type_text(&mut app, &tx, "¿Cuánto ahorro?");
        handle_key_event(press(KeyCode::Enter), &mut app, &tx);

        let Ok(UiCommand::Ask { request, .. }) = rx.try_recv() else {
            panic!("expected ask command");
        };
        assert_eq!(request.pregunta, "¿Cuánto ahorro?");
        assert!(app.chat_input.is_empty());
        assert!(app.chat.is_typing());
    }

    #[test]
    fn question_without_analysis_stays_local() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = app();
        app.focus = Focus::Chat;
        type_text(&mut app, &tx, "hola");
        handle_key_event(press(KeyCode::Enter), &mut app, &tx);
        assert!(rx.try_recv().is_err());
        assert_eq!(app.chat.transcript().len(), 2);
    }

    #[test]
    fn closed_dispatcher_fails_the_turn() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let mut app = app();
        app.focus = Focus::Chat;
        analyzed(&mut app);
        type_text(&mut app, &tx, "hola");
        handle_key_event(press(KeyCode::Enter), &mut app, &tx);
        assert!(!app.chat.is_typing());
        let last = app.chat.transcript().last().expect("message");
        assert_eq!(last.text, hipoteca_client::error::CHAT_CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn escape_twice_quits() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = app();
        assert!(!handle_key_event(press(KeyCode::Esc), &mut app, &tx));
        assert!(app.confirm_quit);
        assert!(handle_key_event(press(KeyCode::Esc), &mut app, &tx));
    }

    #[test]
    fn tab_cycles_focus() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = app();
        handle_key_event(press(KeyCode::Tab), &mut app, &tx);
        assert_eq!(app.focus, Focus::Results);
        handle_key_event(press(KeyCode::Tab), &mut app, &tx);
        assert_eq!(app.focus, Focus::Chat);
        handle_key_event(press(KeyCode::BackTab), &mut app, &tx);
        assert_eq!(app.focus, Focus::Results);
    }
}

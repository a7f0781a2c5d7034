use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use routerchat_core::{CompletionError, Model, OpenRouterClient, Session, SessionError};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A one-off line shown under the chat history. Never part of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,
    pub client: OpenRouterClient,

    // Input box
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Chat history pane
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height, updated during render
    pub chat_width: u16,  // inner width, updated during render
    pub chat_area: Option<Rect>,
    pub notice: Option<Notice>,

    // In-flight completion call
    pub query_task: Option<JoinHandle<Result<String, CompletionError>>>,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Popups
    pub show_model_picker: bool,
    pub model_picker_state: ListState,
    pub show_reset_confirm: bool,
}

impl App {
    pub fn new(session: Session, client: OpenRouterClient) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session,
            client,

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            notice: None,

            query_task: None,
            animation_frame: 0,

            show_model_picker: false,
            model_picker_state: ListState::default(),
            show_reset_confirm: false,
        };
        app.scroll_chat_to_bottom();
        app
    }

    pub fn is_loading(&self) -> bool {
        self.query_task.is_some()
    }

    /// Sends the input box as a new user turn on a background task.
    pub fn submit_input(&mut self) {
        if self.is_loading() {
            return;
        }

        match self.session.begin_turn(&self.input) {
            Ok(turn) => {
                self.input.clear();
                self.input_cursor = 0;
                self.notice = None;

                let client = self.client.clone();
                self.query_task = Some(tokio::spawn(async move {
                    client.complete(&turn.messages, turn.model.provider_id()).await
                }));
                self.scroll_chat_to_bottom();
            }
            Err(SessionError::EmptyInput) => {}
            Err(err) => self.notice = Some(Notice::error(err.to_string())),
        }
    }

    /// Collects the completion result once the background task is done.
    pub async fn poll_query_task(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.query_task.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(err) => Err(CompletionError::Interrupted(err.to_string())),
        };

        if let Err(err) = self.session.finish_turn(result) {
            self.notice = Some(Notice::error(err.to_string()));
        }
        self.scroll_chat_to_bottom();
    }

    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll chat to bottom so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.session.visible_messages() {
            total_lines = total_lines.saturating_add(1); // "You:" / "Bot:"
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                total_lines = total_lines.saturating_add((char_count / wrap_width + 1) as u16);
            }
            total_lines = total_lines.saturating_add(1); // blank line after message
        }
        if self.is_loading() {
            total_lines = total_lines.saturating_add(2);
        }
        if let Some(notice) = &self.notice {
            let char_count = notice.text.chars().count();
            total_lines = total_lines.saturating_add((char_count / wrap_width + 1) as u16);
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    // Model picker
    pub fn open_model_picker(&mut self) {
        let current = self.session.model();
        let index = Model::all().iter().position(|m| *m == current);
        self.model_picker_state.select(index.or(Some(0)));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = Model::all().len();
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        if let Some(model) = self
            .model_picker_state
            .selected()
            .and_then(|i| Model::all().get(i).copied())
        {
            self.session.select_model(model);
        }
        self.show_model_picker = false;
    }

    /// Clears the chat history after the user confirmed.
    pub fn reset_history(&mut self) {
        self.show_reset_confirm = false;
        match self.session.reset() {
            Ok(()) => {
                self.chat_scroll = 0;
                self.notice = Some(Notice::info("Chat history cleared."));
            }
            Err(err) => self.notice = Some(Notice::error(err.to_string())),
        }
    }
}

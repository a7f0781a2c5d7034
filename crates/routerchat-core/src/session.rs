//! The chat session: one transcript, one selected model, one turn at a time.
//!
//! A turn is split into [`Session::begin_turn`] and [`Session::finish_turn`]
//! so a UI can run the completion call on a background task and keep
//! redrawing in between. [`Session::submit`] runs both halves inline.

use crate::ai::OpenRouterClient;
use crate::error::{CompletionError, SessionError, StoreError};
use crate::models::Model;
use crate::state::{default_transcript, Message, Role, Transcript};
use crate::store::TranscriptStore;
use crate::text::normalize_input;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    Submitting,
}

/// Everything a background task needs to make the completion call.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub model: Model,
    pub messages: Vec<Message>,
}

pub struct Session {
    transcript: Transcript,
    model: Model,
    store: TranscriptStore,
    phase: TurnPhase,
}

impl Session {
    /// Loads the transcript from `store`. A malformed file is an error.
    pub fn open(store: TranscriptStore, model: Model) -> Result<Self, StoreError> {
        let transcript = store.load()?;
        Ok(Self::with_transcript(store, transcript, model))
    }

    pub fn with_transcript(store: TranscriptStore, transcript: Transcript, model: Model) -> Self {
        Self {
            transcript,
            model,
            store,
            phase: TurnPhase::Idle,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Messages shown to the user: everything after the leading system
    /// message.
    pub fn visible_messages(&self) -> &[Message] {
        match self.transcript.first() {
            Some(first) if first.role == Role::System => &self.transcript[1..],
            _ => &self.transcript,
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == TurnPhase::Submitting
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    /// Changes the model used by later turns. A turn already in flight keeps
    /// the model it started with.
    pub fn select_model(&mut self, model: Model) {
        if model != self.model {
            tracing::info!(model = model.provider_id(), "selected model");
        }
        self.model = model;
    }

    /// Appends the user's message and moves to `Submitting`.
    pub fn begin_turn(&mut self, input: &str) -> Result<PendingTurn, SessionError> {
        if self.is_submitting() {
            return Err(SessionError::Busy);
        }
        let content = normalize_input(input).ok_or(SessionError::EmptyInput)?;

        self.transcript.push(Message::user(content));
        self.phase = TurnPhase::Submitting;

        Ok(PendingTurn {
            model: self.model,
            messages: self.transcript.clone(),
        })
    }

    /// Records the outcome of the completion call and returns to `Idle`.
    ///
    /// On success the reply is appended and the transcript saved. On failure
    /// nothing is appended and nothing is written; the user's message stays
    /// in memory only.
    pub fn finish_turn(
        &mut self,
        result: Result<String, CompletionError>,
    ) -> Result<(), SessionError> {
        if !self.is_submitting() {
            return Err(SessionError::NotSubmitting);
        }
        self.phase = TurnPhase::Idle;

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    kind = err.kind(),
                    status = ?err.status(),
                    body_len = ?err.body_len(),
                    "turn failed"
                );
                return Err(err.into());
            }
        };

        self.transcript.push(Message::assistant(reply));
        self.store.save(&self.transcript)?;
        tracing::info!(messages = self.transcript.len(), "turn completed");
        Ok(())
    }

    /// Runs a whole turn inline against `client`.
    pub async fn submit(
        &mut self,
        client: &OpenRouterClient,
        input: &str,
    ) -> Result<(), SessionError> {
        let turn = self.begin_turn(input)?;
        let result = client.complete(&turn.messages, turn.model.provider_id()).await;
        self.finish_turn(result)
    }

    /// Replaces the transcript with the default one and saves it.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.is_submitting() {
            return Err(SessionError::Busy);
        }
        self.transcript = default_transcript();
        self.store.save(&self.transcript)?;
        tracing::info!("chat history reset");
        Ok(())
    }
}

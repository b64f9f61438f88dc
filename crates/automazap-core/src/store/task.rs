//! Handles for the store's delayed work (synthetic replies, simulated
//! integration pairing).
//!
//! Every delayed step runs as a spawned task holding a child cancellation
//! token. The registry keeps the tokens keyed by task id so a bot deletion
//! can cancel everything still pending for that bot.

use automazap_types::bot::BotId;
use automazap_types::error::StoreError;
use automazap_types::message::Message;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cancellation tokens of in-flight tasks keyed by task id.
#[derive(Debug, Default)]
pub(crate) struct TaskRegistry {
    tokens: DashMap<Uuid, (BotId, CancellationToken)>,
}

impl TaskRegistry {
    pub(crate) fn insert(&self, task_id: Uuid, bot_id: BotId, token: CancellationToken) {
        self.tokens.insert(task_id, (bot_id, token));
    }

    pub(crate) fn remove(&self, task_id: &Uuid) {
        self.tokens.remove(task_id);
    }

    /// Cancel every pending task owned by `bot_id`. Returns how many were cancelled.
    pub(crate) fn cancel_for_bot(&self, bot_id: &BotId) -> usize {
        let mut cancelled = 0;
        for entry in self.tokens.iter() {
            let (owner, token) = entry.value();
            if owner == bot_id {
                token.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// A delayed store operation in flight.
///
/// Dropping the handle detaches the task (it still completes). Call
/// [`cancel`](Self::cancel) to drop the work instead.
#[derive(Debug)]
pub struct PendingTask<T> {
    task_id: Uuid,
    token: CancellationToken,
    handle: JoinHandle<Result<T, StoreError>>,
}

impl<T> PendingTask<T> {
    pub(crate) fn new(
        task_id: Uuid,
        token: CancellationToken,
        handle: JoinHandle<Result<T, StoreError>>,
    ) -> Self {
        Self {
            task_id,
            token,
            handle,
        }
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Cancel the task. Has no effect if it already applied its update.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to apply its update.
    ///
    /// Returns `Err(StoreError::Cancelled)` if it was cancelled first.
    pub async fn wait(self) -> Result<T, StoreError> {
        self.handle
            .await
            .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

/// The result of `send_message`: the user message already applied to the
/// store plus the pending synthetic reply.
#[derive(Debug)]
pub struct PendingReply {
    user_message: Message,
    task: PendingTask<Message>,
}

impl PendingReply {
    pub(crate) fn new(user_message: Message, task: PendingTask<Message>) -> Self {
        Self { user_message, task }
    }

    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    pub fn task_id(&self) -> Uuid {
        self.task.task_id()
    }

    pub fn cancel(&self) {
        self.task.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the bot's reply message.
    pub async fn wait(self) -> Result<Message, StoreError> {
        self.task.wait().await
    }
}

use thiserror::Error;

use crate::bot::BotId;

/// Errors from the bot/session store.
///
/// Lookups never produce these; they return `Option`. `BotNotFound` is
/// returned right away by operations that start delayed work
/// (`send_message`, `connect_integration`) on an unknown bot. `Cancelled`
/// and `TaskFailed` come from the delayed step itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bot {0} not found")]
    BotNotFound(BotId),

    #[error("pending task was cancelled")]
    Cancelled,

    #[error("background task failed: {0}")]
    TaskFailed(String),
}

/// Errors from key/value session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from the mock account service. Display strings are the messages
/// shown to the user.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Email já está em uso")]
    EmailInUse,

    #[error("Usuário não autenticado")]
    NotAuthenticated,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Você precisa estar logado para assinar um plano")]
    NotAuthenticated,

    #[error("Plano não encontrado")]
    PlanNotFound(String),

    #[error("Você não possui uma assinatura ativa para cancelar")]
    NoActiveSubscription,

    #[error(transparent)]
    Account(#[from] AccountError),
}

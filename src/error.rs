use thiserror::Error;

use crate::client::ClientError;
use crate::services::LifecycleError;
use crate::services::opsworks::LayerError;
use crate::waiter::WaitError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

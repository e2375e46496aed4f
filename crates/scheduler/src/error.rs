use helpix_matching::{TaskId, UserId};
use helpix_state::StoreError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum SchedulerError {
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("upstream failure: {source}")]
    Upstream {
        #[source]
        source: BoxError,
        retryable: bool,
    },
    #[error("job queue closed")]
    QueueClosed,
}

impl SchedulerError {
    /// An upstream failure worth retrying.
    pub fn transient(source: impl Into<BoxError>) -> Self {
        Self::Upstream {
            source: source.into(),
            retryable: true,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { retryable: true, .. })
    }
}

impl From<StoreError> for SchedulerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind: "user", id } => Self::UserNotFound(UserId(id)),
            StoreError::NotFound { kind: "task", id } => Self::TaskNotFound(TaskId(id)),
            other => Self::Upstream {
                retryable: other.is_transient(),
                source: Box::new(other),
            },
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

use thiserror::Error;

/// Error taxonomy for one request through the agent pipeline.
///
/// Each variant maps to a distinct failure stage: history store I/O,
/// the completion provider round trip, the TTS round trip, or
/// configuration problems caught at startup or on first use.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("history store unavailable: {0}")]
    StorageUnavailable(String),

    #[error("completion provider failed: {0}")]
    CompletionFailed(String),

    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("unknown script '{0}'")]
    ScriptNotFound(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<redis::RedisError> for AgentError {
    fn from(err: redis::RedisError) -> Self {
        AgentError::StorageUnavailable(err.to_string())
    }
}

//! The text-generation collaborator contract.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Failures of the generation collaborator itself.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Could not reach the generator or read its response.
    #[error("generator transport error: {0}")]
    Transport(String),
    /// The generator answered with a non-success status.
    #[error("generator returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The generator answered without any text.
    #[error("generator returned no text")]
    Empty,
    /// No API key was configured for a remote generator.
    #[error("generator API key is not configured")]
    MissingApiKey,
    /// The generator is deliberately disabled.
    #[error("generator is offline")]
    Offline,
}

/// Anything that turns a prompt into raw text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator that always fails, forcing every call onto its fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl Generator for OfflineGenerator {
    async fn generate_content(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Offline)
    }
}

/// Replays a fixed sequence of replies and records the prompts it received.
/// Once the script runs out every call fails with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, GenerationError>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Convenience for a script of successful replies.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| Ok(t.into())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate_content(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_always_fails() {
        let g = OfflineGenerator;
        assert!(matches!(
            g.generate_content("hi").await,
            Err(GenerationError::Offline)
        ));
    }

    #[tokio::test]
    async fn scripted_replays_in_order_then_fails() {
        let g = ScriptedGenerator::new(vec![
            Ok("one".to_string()),
            Err(GenerationError::Empty),
        ]);
        assert_eq!(g.generate_content("p1").await.unwrap(), "one");
        assert!(matches!(
            g.generate_content("p2").await,
            Err(GenerationError::Empty)
        ));
        assert!(matches!(
            g.generate_content("p3").await,
            Err(GenerationError::Transport(_))
        ));
        assert_eq!(g.prompts(), vec!["p1", "p2", "p3"]);
        assert_eq!(g.remaining(), 0);
    }
}

//! Hosted vision model abstraction.
//!
//! The model is treated as an opaque `analyze(image, prompt) -> raw_text`
//! function with unspecified latency and occasionally non-conforming output.
//! Handlers depend on the [`VisionProvider`] trait so tests can script
//! replies without a network.

pub mod gemini;

pub use gemini::GeminiClient;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no provider credential configured (set GEMINI_API_KEY)")]
    MissingCredentials,
    #[error("provider unreachable at {0}")]
    NotReachable(String),
    #[error("provider request timed out after {0}s")]
    Timeout(u64),
    #[error("provider HTTP error: {0}")]
    Http(String),
    #[error("provider returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("provider reply carried no text")]
    EmptyReply,
}

/// A hosted multimodal model that can look at one image.
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send one base64-encoded image plus an instruction, return the raw
    /// reply text. Not idempotent — the model may phrase its reply
    /// differently on every call.
    async fn analyze_image(
        &self,
        mime_type: &str,
        base64_data: &str,
        prompt: &str,
    ) -> Result<String, ProviderError>;
}

/// Scripted provider for handler tests. Counts calls so tests can assert
/// that validation failures short-circuit before any provider work.
pub struct MockProvider {
    reply: Result<String, String>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VisionProvider for MockProvider {
    async fn analyze_image(
        &self,
        _mime_type: &str,
        _base64_data: &str,
        _prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(ProviderError::Http(message.clone())),
        }
    }
}

//! `openai-chat`: a small request/response client for OpenAI-compatible
//! `/chat/completions` endpoints.
//!
//! One POST per call. No streaming and no retries.
//!
//! # Architecture
//!
//! ```text
//! ClientConfig ──► Client ──► POST {base_url}/chat/completions
//!                               │  Authorization: Bearer <api_key>
//!                               ▼
//!                         ChatResponse ──► choices[0].message.content
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use openai_chat::{Client, ClientConfig};
//!
//! let client = Client::new(ClientConfig {
//!     api_key: std::env::var("OPENAI_API_KEY")?,
//!     ..Default::default()
//! })?;
//! let text = client.ask("Summarize my Crossplane providers").await?;
//! println!("{text}");
//! ```

pub mod client;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{Client, ClientConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use error::ChatError;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, Role, Usage};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ChatError>;

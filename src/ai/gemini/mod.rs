pub mod client;
pub mod fallback;
pub mod types;

pub use client::{GeminiHttpClient, RawReply};
pub use fallback::GeminiClient;

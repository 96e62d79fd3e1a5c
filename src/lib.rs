//! Social Spark - turns an uploaded photo into ready-to-post social media copy
//!
//! An image is normalized to PNG/JPEG, described by a Gemini vision model,
//! and the description is then expanded into captions, hashtags and posting
//! insights by a Gemini text model. Each call walks an ordered list of
//! candidate models until one answers.

pub mod ai;
pub mod error;
pub mod image;
pub mod models;
pub mod pipeline;
pub mod probe;
pub mod prompts;
pub mod server;

pub use error::{Error, ErrorKind, Result};

//! Gemini `generateContent` client.

pub mod client;
pub mod error;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{GeminiClient, GenerativeModel, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::GeminiError;
pub use schema::{Schema, SchemaType};
pub use types::{
    Blob, Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, ROLE_MODEL, ROLE_USER,
};

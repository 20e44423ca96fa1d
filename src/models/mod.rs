// Data models for the public API and the serving endpoint

pub mod chat;
pub mod serving;

pub use chat::{ChatRequest, ChatResponse};
pub use serving::{ServingMessage, ServingRequest, ServingResponse};

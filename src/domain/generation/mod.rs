//! Generation domain module - the model server behind the gateway

mod backend;
mod request;

#[cfg(test)]
pub use backend::mock;
pub use backend::{GenerationBackend, GenerationStream};
pub use request::{DialogueInput, DialogueMessage, GenerateRequest};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::fmt::Debug;
use std::pin::Pin;

use super::GenerateRequest;
use crate::domain::DomainError;

/// Raw byte stream produced by a streaming generation
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Backend that turns dialogue into text
///
/// The gateway only forwards requests here after admission succeeded.
#[async_trait]
pub trait GenerationBackend: Send + Sync + Debug {
    /// Run a generation and return the backend's JSON result
    async fn generate(&self, request: &GenerateRequest) -> Result<serde_json::Value, DomainError>;

    /// Run a generation and stream the produced text as it arrives
    async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerationStream, DomainError>;

    /// Reachability check used by readiness
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

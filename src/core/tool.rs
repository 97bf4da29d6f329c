use async_trait::async_trait;
use rmcp::model::JsonObject;

use crate::domain::InvocationResult;

/// Where call-tool requests are dispatched. Implementations fold every
/// failure into the returned result instead of erroring.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    async fn call(&self, name: &str, arguments: JsonObject) -> InvocationResult;
}

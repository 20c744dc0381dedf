// src/ingest/types.rs
use anyhow::Result;

use crate::pipeline::StatementInput;

/// Anything that can hand over freshly published statements as plain text.
#[async_trait::async_trait]
pub trait StatementSource: Send + Sync {
    async fn fetch_statements(&self) -> Result<Vec<StatementInput>>;
    fn name(&self) -> &'static str;
}

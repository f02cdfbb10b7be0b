use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam for probe execution.
///
/// Production code goes through [`super::BasicClient`]; tests substitute
/// implementations that fail or short-circuit without touching the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> Result<Response>;
}

//! SPARQL-protocol ASK client.

use crate::error::ProbeError;
use crate::prober::EndpointProbe;
use async_trait::async_trait;
use fedgroup_plan::{ask_query, EndpointId, TriplePattern};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Debug, Deserialize)]
struct AskResponse {
    boolean: bool,
}

/// Sends `ASK { s p o . }` as a GET `query` parameter to the endpoint URL.
pub struct SparqlAskClient {
    client: Client,
    timeout: Duration,
}

impl SparqlAskClient {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Connection(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn map_transport(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            ProbeError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl EndpointProbe for SparqlAskClient {
    async fn ask(
        &self,
        endpoint: &EndpointId,
        pattern: &TriplePattern,
    ) -> Result<bool, ProbeError> {
        let query = ask_query(pattern);
        let response = self
            .client
            .get(endpoint.as_str())
            .query(&[("query", query.as_str())])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Endpoint(format!("{endpoint} answered {status}")));
        }

        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        parse_ask_response(&body)
    }
}

fn parse_ask_response(body: &str) -> Result<bool, ProbeError> {
    serde_json::from_str::<AskResponse>(body)
        .map(|r| r.boolean)
        .map_err(|e| ProbeError::InvalidResponse(e.to_string()))
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

mod endpoints;
pub mod form;
pub use endpoints::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    /// Historical results pasted in by the user: open rates, send times and
    /// the like, as free text.
    pub campaign_data: String,
    pub email_content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutput {
    pub suggested_improvements: String,
    pub optimal_send_time: String,
}

/// Suggests copy and send-time improvements for a campaign.
#[async_trait]
pub trait CampaignOptimizer: Send + Sync {
    async fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationOutput, Error>;
}

/// Calls a generative flow over http. The flow takes `{"data": request}` and
/// answers `{"result": output}`.
#[derive(Debug, Clone)]
pub struct GenerativeOptimizer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl GenerativeOptimizer {
    pub fn new(url: String, api_key: Option<String>) -> GenerativeOptimizer {
        GenerativeOptimizer {
            client: reqwest::Client::new(),
            url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct FlowRequest<'a> {
    data: &'a OptimizationRequest,
}

#[derive(Deserialize)]
struct FlowResponse {
    result: OptimizationOutput,
}

fn failed(message: impl Into<String>) -> Error {
    Error::OptimizationFailed {
        message: message.into(),
    }
}

#[async_trait]
impl CampaignOptimizer for GenerativeOptimizer {
    #[tracing::instrument(skip(self, request), fields(url = %self.url))]
    async fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationOutput, Error> {
        let mut call = self.client.post(&self.url).json(&FlowRequest { data: request });
        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key);
        }

        let response = call
            .send()
            .await
            .map_err(|err| failed(format!("could not reach the optimizer: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("optimizer responded with {}", status)));
        }

        let body: FlowResponse = response
            .json()
            .await
            .map_err(|err| failed(format!("optimizer returned an unreadable result: {}", err)))?;

        Ok(body.result)
    }
}

/// Used when no flow url is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredOptimizer;

#[async_trait]
impl CampaignOptimizer for UnconfiguredOptimizer {
    async fn optimize(&self, _request: &OptimizationRequest) -> Result<OptimizationOutput, Error> {
        Err(Error::OptimizerUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request() -> OptimizationRequest {
        OptimizationRequest {
            campaign_data: "Open rate 21% on Tuesday mornings".into(),
            email_content: "Our summer sale starts now.".into(),
        }
    }

    #[tokio::test]
    async fn forwards_the_request_and_reads_the_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/campaignOptimization"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({
                "data": {
                    "campaignData": "Open rate 21% on Tuesday mornings",
                    "emailContent": "Our summer sale starts now.",
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "suggestedImprovements": "Lead with the discount.",
                    "optimalSendTime": "Tuesday 9am",
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let optimizer = GenerativeOptimizer::new(
            format!("{}/campaignOptimization", server.uri()),
            Some("secret".into()),
        );
        let output = optimizer.optimize(&request()).await.unwrap();

        assert_eq!(
            output,
            OptimizationOutput {
                suggested_improvements: "Lead with the discount.".into(),
                optimal_send_time: "Tuesday 9am".into(),
            }
        );
    }

    #[tokio::test]
    async fn upstream_errors_become_optimization_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let optimizer = GenerativeOptimizer::new(server.uri(), None);
        let error = optimizer.optimize(&request()).await.unwrap_err();

        assert!(matches!(error, Error::OptimizationFailed { .. }), "{:?}", error);
    }

    #[tokio::test]
    async fn unexpected_bodies_become_optimization_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "?" })))
            .mount(&server)
            .await;

        let optimizer = GenerativeOptimizer::new(server.uri(), None);
        let error = optimizer.optimize(&request()).await.unwrap_err();

        assert!(matches!(error, Error::OptimizationFailed { .. }), "{:?}", error);
    }

    #[tokio::test]
    async fn unconfigured_optimizer_is_unavailable() {
        let error = UnconfiguredOptimizer.optimize(&request()).await.unwrap_err();

        assert_eq!(error, Error::OptimizerUnavailable);
    }
}

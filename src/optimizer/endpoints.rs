use actix_web::post;
use actix_web::web::{Data, Json};
use serde_json::Value;

use crate::error::Error;
use crate::validation;

use super::{CampaignOptimizer, OptimizationOutput, OptimizationRequest};

#[post("/optimizer/campaigns")]
#[tracing::instrument(skip(optimizer, body))]
pub async fn optimize_campaign(
    optimizer: Data<Box<dyn CampaignOptimizer>>,
    body: Json<Value>,
) -> Result<Json<OptimizationOutput>, Error> {
    let request: OptimizationRequest = validation::validate(&body)?;

    let output = optimizer.optimize(&request).await?;

    Ok(Json(output))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::App;
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::optimizer::UnconfiguredOptimizer;

    struct CannedOptimizer;

    #[async_trait]
    impl CampaignOptimizer for CannedOptimizer {
        async fn optimize(
            &self,
            request: &OptimizationRequest,
        ) -> Result<OptimizationOutput, Error> {
            Ok(OptimizationOutput {
                suggested_improvements: format!("Shorten: {}", request.email_content),
                optimal_send_time: "Thursday 10am".into(),
            })
        }
    }

    fn body() -> Value {
        json!({
            "campaignData": "Open rate 21% on Tuesday mornings",
            "emailContent": "Our summer sale starts now.",
        })
    }

    #[actix_web::test]
    async fn returns_the_suggestions() {
        let optimizer: Box<dyn CampaignOptimizer> = Box::new(CannedOptimizer);
        let app = init_service(
            App::new()
                .app_data(Data::new(optimizer))
                .service(optimize_campaign),
        )
        .await;

        let request = TestRequest::post()
            .uri("/optimizer/campaigns")
            .set_json(&body())
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let output: Value = read_body_json(response).await;
        assert_eq!(
            output,
            json!({
                "suggestedImprovements": "Shorten: Our summer sale starts now.",
                "optimalSendTime": "Thursday 10am",
            })
        );
    }

    #[actix_web::test]
    async fn validates_before_calling_out() {
        let optimizer: Box<dyn CampaignOptimizer> = Box::new(UnconfiguredOptimizer);
        let app = init_service(
            App::new()
                .app_data(Data::new(optimizer))
                .service(optimize_campaign),
        )
        .await;

        let request = TestRequest::post()
            .uri("/optimizer/campaigns")
            .set_json(&json!({ "campaignData": "short" }))
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = TestRequest::post()
            .uri("/optimizer/campaigns")
            .set_json(&body())
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

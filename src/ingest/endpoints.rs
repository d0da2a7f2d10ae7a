use actix_web::post;
use actix_web::web::{BytesMut, Data, Json, Payload};
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;

use crate::validation::Schema;

use super::customer::CustomerIngestionPayload;
use super::order::OrderIngestionPayload;
use super::{IngestConfig, IngestError};

#[derive(Clone, Debug, Serialize)]
pub struct Acknowledgement<T> {
    pub message: String,
    pub data: T,
}

async fn read_body(mut payload: Payload, limit: usize) -> Result<BytesMut, IngestError> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(IngestError::BrokenPayload)?;
        if body.len() + chunk.len() > limit {
            return Err(IngestError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

async fn receive<T: Schema>(payload: Payload, config: &IngestConfig) -> Result<T, IngestError> {
    let body = read_body(payload, config.payload_limit).await?;
    let value: Value = serde_json::from_slice(&body).map_err(IngestError::InvalidJson)?;

    T::parse(&value).map_err(IngestError::InvalidPayload)
}

#[post("/ingest/customers")]
#[tracing::instrument(skip(config, payload))]
pub async fn ingest_customers(
    config: Data<IngestConfig>,
    payload: Payload,
) -> Result<Json<Acknowledgement<CustomerIngestionPayload>>, IngestError> {
    let customer: CustomerIngestionPayload = receive(payload, &config).await?;

    tracing::info!(customer_id = %customer.id, "received customer data");

    Ok(Json(Acknowledgement {
        message: format!("Customer data received for customer ID {}.", customer.id),
        data: customer,
    }))
}

#[post("/ingest/orders")]
#[tracing::instrument(skip(config, payload))]
pub async fn ingest_orders(
    config: Data<IngestConfig>,
    payload: Payload,
) -> Result<Json<Acknowledgement<OrderIngestionPayload>>, IngestError> {
    let order: OrderIngestionPayload = receive(payload, &config).await?;

    tracing::info!(
        order_id = %order.id,
        customer_id = %order.customer_id,
        items = order.items.len(),
        "received order data"
    );

    Ok(Json(Acknowledgement {
        message: format!("Order data received for order ID {}.", order.id),
        data: order,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::App;
    use serde_json::json;

    use super::*;

    macro_rules! ingest_app {
        ($limit:expr) => {
            init_service(
                App::new()
                    .app_data(Data::new(IngestConfig {
                        payload_limit: $limit,
                    }))
                    .service(ingest_customers)
                    .service(ingest_orders),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn acknowledges_customers_with_their_extras() {
        let app = ingest_app!(4096);
        let customer = json!({
            "id": "c1",
            "name": "Jane",
            "email": "jane@x.com",
            "custom_field": "custom_value",
        });

        let request = TestRequest::post()
            .uri("/ingest/customers")
            .set_json(&customer)
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = read_body_json(response).await;
        assert_eq!(
            body,
            json!({
                "message": "Customer data received for customer ID c1.",
                "data": customer,
            })
        );
    }

    #[actix_web::test]
    async fn rejects_customers_without_an_id() {
        let app = ingest_app!(4096);

        let request = TestRequest::post()
            .uri("/ingest/customers")
            .set_json(&json!({ "name": "Jane", "email": "jane@x.com" }))
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(response).await;
        assert_eq!(
            body,
            json!({
                "message": "Invalid request payload.",
                "errors": [{ "path": ["id"], "message": "Required" }],
            })
        );
    }

    #[actix_web::test]
    async fn rejects_orders_without_items() {
        let app = ingest_app!(4096);
        let order = json!({
            "id": "o1",
            "customerId": "c1",
            "orderDate": "2024-07-21T12:00:00Z",
            "items": [],
            "totalAmount": 0,
            "currency": "USD",
        });

        let request = TestRequest::post()
            .uri("/ingest/orders")
            .set_json(&order)
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(response).await;
        assert_eq!(
            body,
            json!({
                "message": "Invalid request payload.",
                "errors": [{
                    "path": ["items"],
                    "message": "Array must contain at least 1 element(s)",
                }],
            })
        );
    }

    #[actix_web::test]
    async fn malformed_json_is_reported_without_errors() {
        let app = ingest_app!(4096);

        let request = TestRequest::post()
            .uri("/ingest/customers")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"id\": ")
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(response).await;
        assert_eq!(body, json!({ "message": "Invalid JSON payload." }));
    }

    #[actix_web::test]
    async fn oversized_bodies_are_refused() {
        let app = ingest_app!(16);

        let request = TestRequest::post()
            .uri("/ingest/customers")
            .set_json(&json!({ "id": "c1", "name": "Jane", "email": "jane@x.com" }))
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

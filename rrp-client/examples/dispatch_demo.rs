//! Dispatch Example
//!
//! This example sends one request to a request/response WebApi endpoint,
//! acknowledges the omittable validations it answered with and sends it
//! again.
//!
//! To run this example:
//! ```
//! RRP_URL=https://shop.example.com/api/rrp cargo run --example dispatch_demo
//! ```

use async_trait::async_trait;
use rrp_client::{
    config::ClientConfig, DispatcherBuilder, Interceptor, RemoteRequest, Request, RequestBody, Verb,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelOrder {
    order_number: u32,
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelOrderResponse {
    executed: bool,
    failed: bool,
    refunded_amount: Option<f64>,
}

impl RequestBody for CancelOrder {
    const TYPE_NAME: &'static str = "Shop.Orders.CancelOrderRequest, Shop";
    type Response = CancelOrderResponse;
}

/// Logs every request leaving the client
struct RequestLog;

#[async_trait]
impl Interceptor for RequestLog {
    async fn on_request(&self, request: &mut dyn RemoteRequest, verb: Verb) {
        tracing::info!(id = request.id(), type_name = request.type_name(), %verb, "sending request");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let dispatcher = DispatcherBuilder::from_config(&config)
        .interceptor(RequestLog)
        .build()?;

    let mut completions = dispatcher.subscribe();
    tokio::spawn(async move {
        while let Some(completed) = completions.recv().await {
            let failed = completed.response().map_or(true, |r| r.failed);
            tracing::info!(id = %completed.id, verb = %completed.verb, failed, "request completed");
        }
    });

    let request = Request::new(CancelOrder {
        order_number: 1042,
        reason: "Customer changed their mind".to_string(),
    });

    // Evaluate first, then execute with the acknowledged validations
    let mut request = dispatcher.evaluate(request).await?;
    if let Some(response) = request.response().cloned() {
        for message in response.all_messages() {
            println!("[{}] {}: {}", message.event_level, message.source_id, message.user_friendly_caption);
        }
        let acknowledged = request.acknowledge_validations(&response);
        println!("Acknowledged {} validation message(s)", acknowledged);
    }

    let request = dispatcher.try_execute(request).await?;
    match request.typed_response()? {
        Some(response) => println!(
            "executed: {}, failed: {}, refunded: {:?}",
            response.executed, response.failed, response.refunded_amount
        ),
        None => println!("No response received"),
    }

    Ok(())
}

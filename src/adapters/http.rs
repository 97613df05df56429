use crate::utils::error::{AppError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

/// Builds the reqwest client shared by all calls of one adapter.
/// Without a configured timeout the reqwest defaults apply.
pub fn build_client(user_agent: &str, timeout_seconds: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(user_agent);
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build().map_err(|e| AppError::ConfigError {
        message: format!("failed to build HTTP client: {}", e),
    })
}

/// Reads the body of a response, turning non-success statuses into
/// `HttpStatusError`. `server_message` gets a chance to pull a readable
/// reason out of the error body.
pub async fn read_success_body(
    service: &'static str,
    response: Response,
    server_message: fn(&str) -> Option<String>,
) -> Result<String> {
    let status = response.status();
    tracing::debug!("{} response status: {}", service, status);

    let body = response
        .text()
        .await
        .map_err(|source| AppError::NetworkError {
            service,
            source: source.without_url(),
        })?;

    if !status.is_success() {
        return Err(AppError::HttpStatusError {
            service,
            status: status.as_u16(),
            server_message: server_message(&body),
        });
    }

    Ok(body)
}

pub fn parse_json(service: &'static str, body: &str) -> Result<serde_json::Value> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!("{} returned a non-JSON body: {}", service, body);
        AppError::MalformedResponse {
            service,
            message: format!("body is not valid JSON: {}", e),
        }
    })
}

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Logs every request with the outcome its handler attached via [`to_response`].
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    match response.extensions().get::<Outcome>() {
        Some(Ok(())) => info!(
            %request_id,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        ),
        Some(Err(Failure::Rejected(reason))) => warn!(
            %request_id,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            reason = %reason,
            "Rejected request"
        ),
        Some(Err(Failure::Consistency(reason))) => error!(
            %request_id,
            consistency = true,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            reason = %reason,
            "Ledger consistency failure"
        ),
        Some(Err(Failure::Internal(reason))) => error!(
            %request_id,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            reason = %reason,
            "Failed to process request"
        ),
        None => info!(
            %request_id,
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request without outcome"
        ),
    }

    response
}

#[derive(Clone, Debug)]
pub enum Failure {
    /// The caller sent something the ledger refused.
    Rejected(String),
    /// A derived value disagreed with its source of truth.
    Consistency(String),
    Internal(String),
}

pub type Outcome = Result<(), Failure>;

pub fn to_response<T: IntoResponse>(
    response: T,  //The response that we are sending + StatusCode
    ext: Outcome, //What the logging middleware should report
) -> Response {
    let mut response = response.into_response();

    response.extensions_mut().insert(ext);

    response
}

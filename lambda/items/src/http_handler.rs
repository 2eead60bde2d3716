use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use lambda_http::http::StatusCode;
use lambda_http::{tracing, Body, Error, Request, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::HandlerError;
use crate::store::{ItemStore, Record};

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: &'static str,
    error: String,
}

/// Milliseconds since the epoch, as text.
fn generate_id() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

/// Fields a body contributes when spread onto a record.
///
/// Only an absent body skips parsing. Arrays and strings spread by index;
/// scalars and `null` contribute nothing.
fn parse_record(body: &Body) -> Result<Record, HandlerError> {
    if let Body::Empty = body {
        return Ok(Record::new());
    }
    let fields = match serde_json::from_slice::<Value>(body.as_ref())? {
        Value::Object(fields) => fields,
        Value::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::String(c.to_string())))
            .collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) => Record::new(),
    };
    Ok(fields)
}

async fn create_item<S: ItemStore>(
    store: &S,
    table: &str,
    body: &Body,
) -> Result<(StatusCode, String), HandlerError> {
    // Caller fields go on top, so a caller-supplied `id` replaces ours.
    let mut record = Record::new();
    record.insert("id".to_string(), Value::String(generate_id()));
    record.extend(parse_record(body)?);

    store.put(table, &record).await?;
    tracing::debug!(id = ?record.get("id"), "item stored");

    Ok((StatusCode::CREATED, serde_json::to_string(&record)?))
}

async fn list_items<S: ItemStore>(
    store: &S,
    table: &str,
) -> Result<(StatusCode, String), HandlerError> {
    let page = store.scan(table).await?;
    if page.truncated {
        tracing::warn!(
            table,
            returned = page.items.len(),
            "scan stopped before the end of the table; listing is incomplete"
        );
    }

    Ok((StatusCode::OK, serde_json::to_string(&page.items)?))
}

fn respond(status: StatusCode, body: String) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")
        .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
        .body(Body::Text(body))?)
}

pub(crate) async fn function_handler<S: ItemStore>(
    store: &S,
    table: &str,
    event: Request,
) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    tracing::info!(method, path = event.uri().path(), "received event");

    let outcome = match method {
        "POST" => create_item(store, table, event.body()).await,
        "GET" => list_items(store, table).await,
        _ => {
            let body = serde_json::to_string(&MessageResponse {
                message: "Method Not Allowed",
            })?;
            return respond(StatusCode::METHOD_NOT_ALLOWED, body);
        }
    };

    match outcome {
        Ok((status, body)) => respond(status, body),
        Err(e) => {
            tracing::error!(error = ?e, "request failed");
            let body = serde_json::to_string(&ErrorResponse {
                message: "Internal Server Error",
                error: e.to_string(),
            })?;
            respond(StatusCode::INTERNAL_SERVER_ERROR, body)
        }
    }
}

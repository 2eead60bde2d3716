//! Table access for the items function.
//!
//! The handler only needs two calls, an unconditional put and a full scan, so
//! that is all [`ItemStore`] exposes. Production wires in [`DynamoStore`];
//! tests use [`mock::MemoryStore`].

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::Client;
use std::{error::Error, fmt::Debug, future::Future, pin::Pin};

use crate::convert::{from_item, to_item};
use crate::error::StoreError;

/// A stored document: field name to JSON value, always carrying `id`.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// One scan response.
#[derive(Debug, Default)]
pub struct ScanPage {
    pub items: Vec<Record>,
    /// The table had more items than one scan returns. Nothing follows the
    /// continuation key, so the listing is incomplete.
    pub truncated: bool,
}

pub trait ItemStore: Send + Sync {
    /// Writes `record` as-is. An existing item with the same `id` is replaced.
    fn put<'a>(&'a self, table: &'a str, record: &'a Record) -> StoreFuture<'a, ()>;

    /// Reads the table with a single unfiltered scan.
    fn scan<'a>(&'a self, table: &'a str) -> StoreFuture<'a, ScanPage>;
}

/// [`ItemStore`] over one long-lived DynamoDB client.
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ItemStore for DynamoStore {
    fn put<'a>(&'a self, table: &'a str, record: &'a Record) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.client
                .put_item()
                .table_name(table)
                .set_item(Some(to_item(record)))
                .send()
                .await
                .map_err(|e| StoreError::Put(failure_text(&e)))?;
            Ok(())
        })
    }

    fn scan<'a>(&'a self, table: &'a str) -> StoreFuture<'a, ScanPage> {
        Box::pin(async move {
            let output = self
                .client
                .scan()
                .table_name(table)
                .send()
                .await
                .map_err(|e| StoreError::Scan(failure_text(&e)))?;

            let items = output
                .items()
                .iter()
                .map(from_item)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ScanPage {
                items,
                truncated: output.last_evaluated_key().is_some(),
            })
        })
    }
}

/// The service's own message when DynamoDB sent one, else the whole chain.
fn failure_text<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + Error + 'static,
    R: Debug,
{
    service_message(err.as_service_error()).unwrap_or_else(|| DisplayErrorContext(err).to_string())
}

fn service_message<E: ProvideErrorMetadata>(err: Option<&E>) -> Option<String> {
    err.and_then(|e| e.message())
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

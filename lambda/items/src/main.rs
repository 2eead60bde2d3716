use lambda_http::{run, service_fn, tracing, Error};
mod convert;
mod error;
mod http_handler;
mod store;
use http_handler::function_handler;
use store::DynamoStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoStore::new(aws_sdk_dynamodb::Client::new(&config));
    let table = std::env::var("TABLE_NAME").map_err(|_| Error::from("TABLE_NAME not set"))?;

    run(service_fn(|event| function_handler(&store, &table, event))).await
}

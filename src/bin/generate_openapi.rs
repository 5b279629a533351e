//! Print the OpenAPI document for the snapshot endpoint.
//!
//! Usage: cargo run --bin generate_openapi > openapi.json

use utoipa::OpenApi;

use reef_monitor::routes::ApiDoc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}

use std::{fs, path::PathBuf};

use megano_api::openapi::ApiDoc;
use utoipa::OpenApi;

/// Writes the OpenAPI document to `openapi/megano-api.json`
fn main() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;

    let output_dir = PathBuf::from("openapi");
    fs::create_dir_all(&output_dir)?;

    let output_path = output_dir.join("megano-api.json");
    fs::write(&output_path, json)?;

    println!("OpenAPI document written to {}", output_path.display());
    Ok(())
}

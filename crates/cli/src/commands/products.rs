//! Product maintenance commands.

use std::path::PathBuf;
use std::sync::Arc;

use shopfront_storefront::db::PgProductRepository;
use shopfront_storefront::functions::ProductImageSync;
use shopfront_storefront::functions::product_images::load_mapping;

use super::{CliError, connect};

/// Apply the product image map.
///
/// The map is read from `map`, else `PRODUCT_IMAGE_MAP_PATH`, else the
/// built-in map. Per-product failures are logged and do not fail the command.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the map cannot be
/// loaded.
pub async fn sync_images(map: Option<PathBuf>) -> Result<(), CliError> {
    let pool = connect().await?;

    let map = map.or_else(|| std::env::var_os("PRODUCT_IMAGE_MAP_PATH").map(PathBuf::from));
    match &map {
        Some(path) => tracing::info!("Using image map {}", path.display()),
        None => tracing::info!("Using built-in image map"),
    }

    let mapping = load_mapping(map.as_deref()).await?;
    let report = ProductImageSync::new(Arc::new(PgProductRepository::new(pool)))
        .run(&mapping)
        .await;

    for error in &report.errors {
        tracing::warn!("{error}");
    }
    tracing::info!("{}", report.message());
    Ok(())
}

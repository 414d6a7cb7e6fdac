//! Document commands.
//!
//! # Usage
//!
//! ```bash
//! # One invoice per customer on trip 12
//! fuelops documents generate invoice 12
//!
//! # PDF rendered by the backend for order line 381
//! fuelops documents download delivery-note 381 -o out/
//! ```

use std::path::PathBuf;

use fuelops_admin::{AppContext, AppError};
use fuelops_admin::documents::{DocumentGenerator, DocumentKind, ServerDocument, save_server_document};
use fuelops_core::{OrderId, TripId};

use crate::error::CliError;
use crate::output;

pub async fn generate(
    ctx: &AppContext,
    kind: DocumentKind,
    trip_id: TripId,
    output_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let trip = ctx.api().get_trip(trip_id).await?;

    let generator = match output_dir {
        Some(dir) => {
            let mut config = ctx.config().documents.clone();
            config.output_dir = dir;
            DocumentGenerator::from_config(&config).map_err(AppError::from)?
        }
        None => ctx.document_generator()?,
    };

    let documents = generator
        .generate(kind, &trip)
        .await
        .map_err(AppError::from)?;
    for document in &documents {
        output::line(format!(
            "{}  {}",
            document.path.display(),
            output::or_dash(document.customer.as_deref())
        ));
    }
    output::line(format!("{} {kind} file(s) for trip {}", documents.len(), trip.trip_num));
    Ok(())
}

pub async fn download(
    ctx: &AppContext,
    document: ServerDocument,
    order_id: OrderId,
    output_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let dir = output_dir.unwrap_or_else(|| ctx.config().documents.output_dir.clone());
    let path = save_server_document(ctx.api(), document, order_id, &dir).await?;
    output::line(path.display());
    Ok(())
}

//! Spreadsheet import commands.
//!
//! # Usage
//!
//! ```bash
//! fuelops import trucks trucks.xlsx --dry-run
//! fuelops import orders orders.csv --batch-size 50
//! fuelops import-history --page 2
//! ```
//!
//! Ctrl-C during an import stops before the next batch; the batch in
//! flight is allowed to finish.

use std::path::Path;

use fuelops_admin::AppContext;
use fuelops_admin::api::Page;
use fuelops_admin::import::{CancelToken, ImportError, ImportPipeline, preview};
use fuelops_core::ImportKind;

use crate::error::CliError;
use crate::output;

async fn read_file(path: &Path) -> Result<(String, Vec<u8>), CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok((file_name, bytes))
}

/// Show the first rows and validate them without sending anything.
pub async fn dry_run(ctx: &AppContext, kind: ImportKind, path: &Path) -> Result<(), CliError> {
    let (file_name, bytes) = read_file(path).await?;

    let shown = preview(kind, &file_name, &bytes)?;
    output::line(format!(
        "{file_name}: {} {kind} records",
        shown.total_records
    ));
    let headers: Vec<&str> = shown.columns.iter().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = shown
        .rows
        .iter()
        .map(|record| shown.columns.iter().map(|c| record.get(c).to_string()).collect())
        .collect();
    output::table(&headers, &rows);

    let lookup = ctx.load_lookup().await?;
    let pipeline = ImportPipeline::new(ctx.api(), &lookup, ctx.config().import.batch_size);
    match pipeline.prepare(kind, &file_name, &bytes) {
        Ok(prepared) => {
            output::heading(format!("{} rows are valid and ready to import.", prepared.len()));
            Ok(())
        }
        Err(ImportError::Rejected(errors)) => {
            output::heading(format!("{} rows need fixing:", errors.len()));
            output::row_errors(&errors);
            Err(ImportError::Rejected(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Validate and submit a file in batches.
pub async fn run(
    ctx: &AppContext,
    kind: ImportKind,
    path: &Path,
    batch_size: Option<usize>,
) -> Result<(), CliError> {
    let (file_name, bytes) = read_file(path).await?;
    let batch_size = batch_size.unwrap_or(ctx.config().import.batch_size);
    let lookup = ctx.load_lookup().await?;

    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Cancelling after the current batch");
                cancel.cancel();
            }
        })
    };

    let pipeline = ImportPipeline::new(ctx.api(), &lookup, batch_size)
        .with_cancel_token(cancel)
        .on_progress(|p| {
            output::line(format!(
                "Batch {}/{}: {} of {} rows ({}%)",
                p.batch, p.batches, p.rows_submitted, p.total_rows, p.percent
            ));
        });

    let result = pipeline.run(kind, &file_name, &bytes).await;
    watcher.abort();

    match result {
        Ok(report) => {
            output::import_report(&report);
            Ok(())
        }
        Err(ImportError::Rejected(errors)) => {
            output::line(format!("Nothing was imported; {} rows need fixing:", errors.len()));
            output::row_errors(&errors);
            Err(ImportError::Rejected(errors).into())
        }
        Err(ImportError::BatchFailed {
            kind,
            batch,
            source,
            partial,
        }) => {
            output::import_report(&partial);
            Err(ImportError::BatchFailed {
                kind,
                batch,
                source,
                partial,
            }
            .into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn history(ctx: &AppContext, page: u32, limit: u32) -> Result<(), CliError> {
    let page = Page { page, limit };
    let history = fuelops_admin::reports::import_history(ctx.api(), page).await?;
    if history.items.is_empty() {
        output::line("No imports yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = history
        .items
        .iter()
        .map(|entry| {
            vec![
                entry.id.map(|id| id.to_string()).unwrap_or_default(),
                output::or_dash(entry.date.as_deref()),
                entry.kind.map(|k| k.to_string()).unwrap_or_default(),
                output::or_dash(entry.status.as_deref()),
                entry.records_imported.to_string(),
                entry.errors.len().to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "Date", "Type", "Status", "Imported", "Errors"], &rows);
    output::line(format!(
        "Page {} of {} ({} imports)",
        page.page,
        history.total_pages(usize::try_from(limit).unwrap_or(usize::MAX)),
        history.total_items()
    ));
    Ok(())
}

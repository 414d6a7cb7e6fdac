//! Spreadsheet import endpoints.

use fuelops_core::ImportKind;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use super::{ApiClient, ApiError, ImportHistoryPage, ImportResponse, Page};

impl ApiClient {
    /// Upload a CSV file of master data records.
    ///
    /// The file travels as the multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns error if the upload is rejected as a whole.
    #[instrument(skip(self, contents), fields(kind = %kind, bytes = contents.len()))]
    pub async fn import_file(
        &self,
        kind: ImportKind,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<ImportResponse, ApiError> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response: ImportResponse = self
            .post_multipart(&format!("/import/{}", kind.as_str()), form)
            .await?;
        debug!(
            imported = response.records_imported,
            errors = response.errors.len(),
            "Import file processed"
        );
        Ok(response)
    }

    /// One page of past imports.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn import_history(&self, page: Page) -> Result<ImportHistoryPage, ApiError> {
        self.get_with_query("/import/history", &page).await
    }
}

//! View state for the record list and its dialogs.

use crate::api_client::RecordsApi;
use crate::error::{ClientError, Result};
use crate::views::{FormDialog, Submission, TableView};
use sheetdb_core::{Record, RowIndex};

/// Shown when a create or update request fails.
pub const SUBMIT_FAILED: &str = "Submission failed. Check console for details.";

/// Shown when a delete request fails.
pub const DELETE_FAILED: &str = "Delete failed. Check console for details.";

/// Blocking, user-facing alerts and the loading indicator.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);

    /// Called with `true` when a list fetch starts and `false` when it ends.
    fn loading(&self, _active: bool) {}
}

/// Holds the list, loading flag and dialog state, and drives the API.
///
/// The list is never patched locally. Every successful mutation is followed
/// by a full re-fetch, so the held records always mirror the store's order.
pub struct Controller<A: RecordsApi, N: Notifier> {
    api: A,
    notifier: N,
    records: Vec<Record>,
    loading: bool,
    form: Option<FormDialog>,
    delete_dialog_open: bool,
    pending_delete: Option<RowIndex>,
}

impl<A: RecordsApi, N: Notifier> Controller<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            records: Vec::new(),
            loading: false,
            form: None,
            delete_dialog_open: false,
            pending_delete: None,
        }
    }

    /// Creates the controller and performs the initial fetch.
    pub async fn mount(api: A, notifier: N) -> Result<Self> {
        let mut controller = Self::new(api, notifier);
        controller.refresh().await?;
        Ok(controller)
    }

    /// Replaces the held list with the server's current rows.
    ///
    /// The notifier sees the loading flag rise and fall around the fetch.
    /// On failure the previous list is kept.
    pub async fn refresh(&mut self) -> Result<()> {
        self.set_loading(true);
        let result = self.api.list().await;
        self.set_loading(false);

        match result {
            Ok(records) => {
                tracing::debug!("Fetched {} records", records.len());
                self.records = records;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching data: {}", e);
                Err(e)
            }
        }
    }

    fn set_loading(&mut self, active: bool) {
        self.loading = active;
        self.notifier.loading(active);
    }

    pub fn open_create(&mut self) {
        self.form = Some(FormDialog::create());
    }

    /// Opens the form pre-filled with the record currently at `index`.
    pub fn open_edit(&mut self, index: RowIndex) -> Result<()> {
        let record = self
            .records
            .get(index)
            .ok_or(ClientError::InvalidState("no record at that index"))?;
        self.form = Some(FormDialog::edit(record, index));
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn form(&self) -> Option<&FormDialog> {
        self.form.as_ref()
    }

    /// Field access for the open form.
    pub fn form_mut(&mut self) -> Option<&mut FormDialog> {
        self.form.as_mut()
    }

    /// Sends the open form to the matching endpoint.
    ///
    /// A blank field or malformed email fails locally with
    /// [`ClientError::Form`] and nothing is sent. A rejected request is
    /// logged, alerted, and leaves the form open. On success the form closes
    /// and the list is re-fetched. Returns the server's confirmation message,
    /// even when that re-fetch fails, since the write itself went through.
    pub async fn submit_form(&mut self) -> Result<String> {
        let form = self
            .form
            .as_ref()
            .ok_or(ClientError::InvalidState("form is not open"))?;
        let submission = form.submission()?;

        let result = match &submission {
            Submission::Create(request) => self.api.create(request).await,
            Submission::Update(request) => self.api.update(request).await,
        };

        match result {
            Ok(message) => {
                tracing::info!("{}", message);
                self.form = None;
                if let Err(e) = self.refresh().await {
                    tracing::warn!("Re-fetch after successful submit failed: {}", e);
                }
                Ok(message)
            }
            Err(e) => {
                tracing::error!("Error submitting form: {}", e);
                self.notifier.alert(SUBMIT_FAILED);
                Err(e)
            }
        }
    }

    /// Arms `index` for deletion and opens the confirmation dialog.
    pub fn request_delete(&mut self, index: RowIndex) {
        self.pending_delete = Some(index);
        self.delete_dialog_open = true;
    }

    /// Deletes the armed row, then re-fetches whether or not it succeeded.
    ///
    /// With nothing armed this only closes the dialog.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        self.delete_dialog_open = false;
        let Some(index) = self.pending_delete.take() else {
            return Ok(());
        };

        match self.api.delete(index).await {
            Ok(message) => {
                tracing::info!("{}", message);
                if let Err(e) = self.refresh().await {
                    tracing::warn!("Re-fetch after delete failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error deleting row {}: {}", index, e);
                self.notifier.alert(DELETE_FAILED);
                if let Err(refresh_err) = self.refresh().await {
                    tracing::warn!("Re-fetch after failed delete also failed: {}", refresh_err);
                }
                Err(e)
            }
        }
    }

    /// Closes the confirmation dialog without sending anything.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.delete_dialog_open = false;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn table(&self) -> TableView<'_> {
        TableView::new(&self.records)
    }

    /// True only while a fetch is in flight. Callers holding the controller
    /// observe transitions through [`Notifier::loading`].
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_form_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn is_delete_dialog_open(&self) -> bool {
        self.delete_dialog_open
    }

    pub fn pending_delete(&self) -> Option<RowIndex> {
        self.pending_delete
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

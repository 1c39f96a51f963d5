//! Controller behaviour against a scripted API.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use sheetdb_client::controller::{DELETE_FAILED, SUBMIT_FAILED};
use sheetdb_client::{
    ClientError, Controller, CreateRequest, Notifier, RecordsApi, Result, UpdateRequest,
};
use sheetdb_core::{Record, RowIndex};

/// In-process stand-in for the server that records every call.
#[derive(Default)]
struct FakeApi {
    rows: Mutex<Vec<Record>>,
    calls: Mutex<Vec<String>>,
    reject_mutations: Mutex<bool>,
    list_fails: Mutex<bool>,
}

impl FakeApi {
    fn with(rows: Vec<Record>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn rejecting(self) -> Self {
        *self.reject_mutations.lock() = true;
        self
    }

    fn rejection(&self) -> Option<ClientError> {
        if *self.reject_mutations.lock() {
            Some(ClientError::Status {
                status: 502,
                body: json!({"error": "Upstream service error"}),
            })
        } else {
            None
        }
    }
}

#[async_trait]
impl RecordsApi for FakeApi {
    async fn list(&self) -> Result<Vec<Record>> {
        self.calls.lock().push("list".to_string());
        if *self.list_fails.lock() {
            return Err(ClientError::NetworkError("connection reset".to_string()));
        }
        Ok(self.rows.lock().clone())
    }

    async fn create(&self, request: &CreateRequest) -> Result<String> {
        self.calls.lock().push(format!("create {}", request.email));
        if let Some(e) = self.rejection() {
            return Err(e);
        }
        self.rows.lock().push(Record::new(
            request.first_name.clone(),
            request.last_name.clone(),
            request.email.clone(),
        ));
        Ok("Row added successfully".to_string())
    }

    async fn update(&self, request: &UpdateRequest) -> Result<String> {
        self.calls.lock().push(format!("update {}", request.index));
        if let Some(e) = self.rejection() {
            return Err(e);
        }
        let [first, last, email] = request.row.clone();
        self.rows.lock()[request.index] = Record::new(first, last, email);
        Ok("Row updated successfully".to_string())
    }

    async fn delete(&self, index: RowIndex) -> Result<String> {
        self.calls.lock().push(format!("delete {}", index));
        if let Some(e) = self.rejection() {
            return Err(e);
        }
        self.rows.lock().remove(index);
        Ok("Row deleted successfully".to_string())
    }
}

#[derive(Default)]
struct Alerts {
    alerts: Mutex<Vec<String>>,
    loading: Mutex<Vec<bool>>,
}

impl Notifier for Alerts {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }

    fn loading(&self, active: bool) {
        self.loading.lock().push(active);
    }
}

impl Alerts {
    fn seen(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    fn loading_changes(&self) -> Vec<bool> {
        self.loading.lock().clone()
    }
}

fn two_rows() -> Vec<Record> {
    vec![
        Record::new("A", "B", "a@x.com"),
        Record::new("C", "D", "c@x.com"),
    ]
}

#[tokio::test]
async fn test_mount_fetches_list() {
    let controller = Controller::mount(FakeApi::with(two_rows()), Alerts::default())
        .await
        .unwrap();
    assert_eq!(controller.records(), two_rows().as_slice());
    assert!(!controller.is_loading());
    assert_eq!(controller.notifier().loading_changes(), vec![true, false]);
    assert_eq!(controller.api().calls(), vec!["list"]);
}

#[tokio::test]
async fn test_create_refetches() {
    let mut controller = Controller::mount(FakeApi::default(), Alerts::default())
        .await
        .unwrap();

    controller.open_create();
    let form = controller.form_mut().unwrap();
    form.first_name = "J".to_string();
    form.last_name = "D".to_string();
    form.email = "j@d.com".to_string();

    let message = controller.submit_form().await.unwrap();
    assert_eq!(message, "Row added successfully");
    assert!(!controller.is_form_open());
    assert_eq!(controller.records(), &[Record::new("J", "D", "j@d.com")]);
    assert_eq!(controller.api().calls(), vec!["list", "create j@d.com", "list"]);
}

#[tokio::test]
async fn test_blank_field_sends_nothing() {
    let mut controller = Controller::mount(FakeApi::default(), Alerts::default())
        .await
        .unwrap();

    controller.open_create();
    let form = controller.form_mut().unwrap();
    form.first_name = "J".to_string();
    form.email = "j@d.com".to_string();

    let err = controller.submit_form().await.unwrap_err();
    assert!(matches!(err, ClientError::Form(_)));
    assert!(controller.is_form_open());
    assert_eq!(controller.api().calls(), vec!["list"]);
    assert!(controller.notifier().seen().is_empty());
}

#[tokio::test]
async fn test_edit_prefills_and_updates_in_place() {
    let mut controller = Controller::mount(FakeApi::with(two_rows()), Alerts::default())
        .await
        .unwrap();

    controller.open_edit(1).unwrap();
    let form = controller.form_mut().unwrap();
    assert_eq!(form.email, "c@x.com");
    form.first_name = "X".to_string();
    form.last_name = "Y".to_string();
    form.email = "x@y.com".to_string();

    controller.submit_form().await.unwrap();
    assert_eq!(
        controller.records(),
        &[
            Record::new("A", "B", "a@x.com"),
            Record::new("X", "Y", "x@y.com"),
        ]
    );
    assert_eq!(controller.api().calls(), vec!["list", "update 1", "list"]);

    assert!(matches!(
        controller.open_edit(5),
        Err(ClientError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_rejected_submit_alerts_and_keeps_form() {
    let api = FakeApi::with(two_rows()).rejecting();
    let mut controller = Controller::mount(api, Alerts::default()).await.unwrap();

    controller.open_edit(0).unwrap();
    let err = controller.submit_form().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 502, .. }));
    assert!(controller.is_form_open());
    assert_eq!(controller.notifier().seen(), vec![SUBMIT_FAILED]);
    assert_eq!(controller.api().calls(), vec!["list", "update 0"]);
}

#[tokio::test]
async fn test_submit_without_form() {
    let mut controller = Controller::new(FakeApi::default(), Alerts::default());
    assert!(matches!(
        controller.submit_form().await,
        Err(ClientError::InvalidState(_))
    ));
    assert!(controller.api().calls().is_empty());
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let mut controller = Controller::mount(FakeApi::with(two_rows()), Alerts::default())
        .await
        .unwrap();

    controller.request_delete(0);
    assert!(controller.is_delete_dialog_open());
    assert_eq!(controller.pending_delete(), Some(0));

    controller.cancel_delete();
    assert!(!controller.is_delete_dialog_open());
    assert_eq!(controller.pending_delete(), None);
    assert_eq!(controller.api().calls(), vec!["list"]);

    controller.request_delete(0);
    controller.confirm_delete().await.unwrap();
    assert!(!controller.is_delete_dialog_open());
    assert_eq!(controller.pending_delete(), None);
    assert_eq!(controller.records(), &[Record::new("C", "D", "c@x.com")]);
    assert_eq!(controller.api().calls(), vec!["list", "delete 0", "list"]);
}

#[tokio::test]
async fn test_confirm_with_nothing_armed() {
    let mut controller = Controller::mount(FakeApi::with(two_rows()), Alerts::default())
        .await
        .unwrap();
    controller.confirm_delete().await.unwrap();
    assert_eq!(controller.api().calls(), vec!["list"]);
}

#[tokio::test]
async fn test_failed_delete_alerts_and_refetches() {
    let api = FakeApi::with(two_rows()).rejecting();
    let mut controller = Controller::mount(api, Alerts::default()).await.unwrap();

    controller.request_delete(1);
    assert!(controller.confirm_delete().await.is_err());
    assert_eq!(controller.pending_delete(), None);
    assert_eq!(controller.notifier().seen(), vec![DELETE_FAILED]);
    assert_eq!(controller.records().len(), 2);
    assert_eq!(controller.api().calls(), vec!["list", "delete 1", "list"]);
}

#[tokio::test]
async fn test_loading_brackets_every_fetch() {
    let mut controller = Controller::mount(FakeApi::with(two_rows()), Alerts::default())
        .await
        .unwrap();
    controller.request_delete(0);
    controller.confirm_delete().await.unwrap();

    assert_eq!(
        controller.notifier().loading_changes(),
        vec![true, false, true, false]
    );
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_failed_list_clears_loading() {
    let api = FakeApi::default();
    *api.list_fails.lock() = true;
    let result = Controller::mount(api, Alerts::default()).await;
    assert!(matches!(result, Err(ClientError::NetworkError(_))));

    let mut controller = Controller::new(FakeApi::default(), Alerts::default());
    *controller.api().list_fails.lock() = true;
    assert!(controller.refresh().await.is_err());
    assert!(!controller.is_loading());
    assert_eq!(controller.notifier().loading_changes(), vec![true, false]);
}

#[tokio::test]
async fn test_write_succeeds_even_if_refetch_fails() {
    let mut controller = Controller::mount(FakeApi::with(two_rows()), Alerts::default())
        .await
        .unwrap();
    *controller.api().list_fails.lock() = true;

    controller.open_edit(0).unwrap();
    controller.form_mut().unwrap().email = "new@x.com".to_string();
    let message = controller.submit_form().await.unwrap();
    assert_eq!(message, "Row updated successfully");
    assert!(!controller.is_form_open());
    assert!(controller.notifier().seen().is_empty());

    controller.request_delete(1);
    controller.confirm_delete().await.unwrap();
    assert!(controller.notifier().seen().is_empty());

    assert_eq!(
        controller.api().calls(),
        vec!["list", "update 0", "list", "delete 1", "list"]
    );
    assert_eq!(controller.records(), two_rows().as_slice());
}

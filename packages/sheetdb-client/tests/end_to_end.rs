//! Client and controller against a real server over an in-memory sheet.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::TcpListener;

use sheetdb_api::router::Router;
use sheetdb_api::server::Server;
use sheetdb_client::{ApiClient, ClientError, Controller, CreateRequest, Notifier, RecordsApi};
use sheetdb_core::config::ServerConfig;
use sheetdb_core::memory::MemorySheet;
use sheetdb_core::range::SheetLayout;
use sheetdb_core::{Record, RecordStore};

#[derive(Default)]
struct Alerts(Mutex<Vec<String>>);

impl Notifier for Alerts {
    fn alert(&self, message: &str) {
        self.0.lock().push(message.to_string());
    }
}

async fn spawn_server(records: &[Record]) -> String {
    let layout = SheetLayout::default();
    let sheet = Arc::new(MemorySheet::with_records(&layout, records));
    let store = Arc::new(RecordStore::new(sheet, layout));
    let router = Router::new(store, Arc::new(ServerConfig::default()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(addr, router);
    tokio::spawn(async move {
        let _ = server.serve_listener(listener).await;
    });
    format!("http://{}", addr)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_crud_cycle() {
    let url = spawn_server(&[]).await;
    let mut controller = Controller::mount(ApiClient::new(&url), Alerts::default())
        .await
        .unwrap();
    assert!(controller.records().is_empty());

    controller.open_create();
    let form = controller.form_mut().unwrap();
    form.first_name = "J".to_string();
    form.last_name = "D".to_string();
    form.email = "j@d.com".to_string();
    assert_eq!(
        controller.submit_form().await.unwrap(),
        "Row added successfully"
    );
    assert_eq!(controller.records(), &[Record::new("J", "D", "j@d.com")]);

    controller.open_edit(0).unwrap();
    controller.form_mut().unwrap().email = "jd@d.com".to_string();
    assert_eq!(
        controller.submit_form().await.unwrap(),
        "Row updated successfully"
    );
    assert_eq!(controller.records(), &[Record::new("J", "D", "jd@d.com")]);

    controller.request_delete(0);
    controller.confirm_delete().await.unwrap();
    assert!(controller.records().is_empty());
    assert!(controller.notifier().0.lock().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_error_bodies_reach_the_client() {
    let url = spawn_server(&[Record::new("A", "B", "a@x.com")]).await;
    let client = ApiClient::new(&url);

    let err = client
        .create(&CreateRequest {
            first_name: String::new(),
            last_name: "D".to_string(),
            email: "j@d.com".to_string(),
        })
        .await
        .unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body["error"], "Missing fields");
        }
        other => panic!("Expected Status, got {:?}", other),
    }

    let err = client.delete(9).await.unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body["error"], "Upstream service error");
        }
        other => panic!("Expected Status, got {:?}", other),
    }

    assert_eq!(
        client.list().await.unwrap(),
        vec![Record::new("A", "B", "a@x.com")]
    );
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{}", addr));
    assert!(matches!(
        client.list().await,
        Err(ClientError::NetworkError(_))
    ));
}

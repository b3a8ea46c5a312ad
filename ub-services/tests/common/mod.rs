//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use ub_api::ApiClient;
use ub_core::config::{AppConfig, StorageConfig};
use ub_core::error::{UbError, UbResult};
use ub_live::MemoryCollection;
use ub_models::Database;
use ub_services::event_bus::EventBus;
use ub_services::identity::{AuthenticatedUser, IdentityProvider};
use ub_services::AppContext;

// ---- HTTP stub server ----

/// One request as the stub server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Raw (percent-encoded) path.
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    /// Path with percent-encoding removed.
    pub fn decoded_path(&self) -> String {
        urlencoding::decode(&self.path)
            .expect("path is not valid UTF-8")
            .into_owned()
    }

    pub fn is(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

type Responder = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

/// In-process HTTP server answering every request through a closure and
/// recording what it received. Stops when dropped.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("failed to bind stub server");
        let addr = listener.local_addr().expect("stub server has no address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let recorded = recorded.clone();
                let responder = responder.clone();
                tokio::spawn(async move {
                    let svc = service_fn(move |req| {
                        let recorded = recorded.clone();
                        let responder = responder.clone();
                        async move { handle(req, recorded, responder).await }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(hyper_util::rt::TokioIo::new(stream), svc)
                        .await;
                });
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    req: Request<Incoming>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Arc<Responder>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let content_type = req
        .headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(_) => Vec::new(),
    };

    let request = RecordedRequest {
        method,
        path,
        query,
        content_type,
        body,
    };
    let (status, body) = responder(&request);
    recorded.lock().unwrap().push(request);

    let response = Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap();
    Ok(response)
}

/// Address nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ---- Identity provider ----

/// Identity provider with a fixed set of accounts. Records every call.
#[derive(Default)]
pub struct ScriptedIdentityProvider {
    accounts: Mutex<HashMap<String, (String, String)>>,
    current: Mutex<Option<AuthenticatedUser>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str, uid: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), uid.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.accounts.lock().unwrap().contains_key(email)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> UbResult<AuthenticatedUser> {
        self.record(format!("sign_in:{email}"));
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored, uid)) if stored == password => {
                let user = AuthenticatedUser {
                    uid: uid.clone(),
                    email: email.to_string(),
                };
                *self.current.lock().unwrap() = Some(user.clone());
                Ok(user)
            }
            Some(_) => Err(UbError::AuthFailed("INVALID_PASSWORD".into())),
            None => Err(UbError::AuthFailed("EMAIL_NOT_FOUND".into())),
        }
    }

    async fn create_account(&self, email: &str, password: &str) -> UbResult<AuthenticatedUser> {
        self.record(format!("create_account:{email}"));
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(UbError::AuthFailed("EMAIL_EXISTS".into()));
        }
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
        let user = AuthenticatedUser {
            uid,
            email: email.to_string(),
        };
        *self.current.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> UbResult<()> {
        self.record(format!("send_password_reset:{email}"));
        if self.has_account(email) {
            Ok(())
        } else {
            Err(UbError::AuthFailed("EMAIL_NOT_FOUND".into()))
        }
    }

    async fn sign_out(&self) -> UbResult<()> {
        self.record("sign_out".into());
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthenticatedUser> {
        self.current.lock().unwrap().clone()
    }
}

// ---- Infrastructure ----

/// Create a temporary on-disk database with schema and migrations applied.
/// Returns the Database and the TempDir (must be held alive for the duration of the test).
pub fn create_test_db() -> (Database, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let db = open_test_db(dir.path());
    (db, dir)
}

/// Open (or reopen) the test database inside `dir`.
pub fn open_test_db(dir: &Path) -> Database {
    let path = dir.join("test.db");
    Database::init(&path, &StorageConfig::default()).expect("failed to init test database")
}

/// Create an EventBus with a small buffer suitable for tests.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(64)
}

/// Configuration pointing at the given backend.
pub fn create_test_config(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.base_url = base_url.to_string();
    config.server.api_timeout_ms = Some(5_000);
    config.live.poll_interval_ms = 50;
    config
}

pub fn create_test_api(base_url: &str) -> ApiClient {
    ApiClient::new(&create_test_config(base_url).server).expect("failed to build api client")
}

/// A full context against `base_url` with an in-memory message collection.
pub struct TestContext {
    pub ctx: AppContext,
    pub collection: MemoryCollection,
    pub identity: Arc<ScriptedIdentityProvider>,
    pub dir: TempDir,
}

pub fn create_test_context(base_url: &str, identity: ScriptedIdentityProvider) -> TestContext {
    let (database, dir) = create_test_db();
    let config = create_test_config(base_url);
    let api = ApiClient::new(&config.server).expect("failed to build api client");
    let collection = MemoryCollection::new();
    let identity = Arc::new(identity);
    let upload_dir = dir.path().join("uploads");

    let mut ctx = AppContext::new(
        config,
        database,
        api,
        identity.clone(),
        Arc::new(collection.clone()),
        upload_dir,
    );
    ctx.init().expect("failed to init context");

    TestContext {
        ctx,
        collection,
        identity,
        dir,
    }
}

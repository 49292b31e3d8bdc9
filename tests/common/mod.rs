// Common test utilities shared by the integration tests
// Every TestApp runs against its own in-memory store and a recording media host

#![allow(dead_code)]

use arcadia_api::{
    app::AppState,
    app_config::AppConfig,
    build_router,
    db::{DocumentStore, Fields, MemoryDocumentStore},
    services::{JwtConfig, JwtService, MediaError, MediaHost, UploadedAsset},
    utils::hash_password,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;
use uuid::Uuid;

/// What the fake media host saw for one upload
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
    /// Whether the staged file existed when the upload was attempted
    pub staged_file_existed: bool,
}

/// Media host double recording uploads and destroys
#[derive(Default)]
pub struct RecordingMediaHost {
    pub uploads: Mutex<Vec<RecordedUpload>>,
    pub destroyed: Mutex<Vec<String>>,
    pub fail_uploads: bool,
}

impl RecordingMediaHost {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for RecordingMediaHost {
    async fn upload(
        &self,
        path: &Path,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadedAsset, MediaError> {
        let index = {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(RecordedUpload {
                path: path.to_path_buf(),
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                staged_file_existed: path.exists(),
            });
            uploads.len()
        };

        if self.fail_uploads {
            return Err(MediaError::Rejected {
                status: 500,
                message: "upload refused".to_string(),
            });
        }

        let public_id = format!("arcadia/asset_{}", index);
        Ok(UploadedAsset {
            secure_url: format!(
                "https://res.cloudinary.com/arcadia-test/image/upload/v1/{}.jpg",
                public_id
            ),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryDocumentStore>,
    pub media: Arc<RecordingMediaHost>,
    pub jwt_service: Arc<JwtService>,
    pub upload_dir: PathBuf,
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_media(RecordingMediaHost::default()).await
}

pub async fn setup_test_app_with_media(media: RecordingMediaHost) -> TestApp {
    let mut config = AppConfig::for_test();
    let upload_dir = std::env::temp_dir().join(format!("arcadia-test-{}", Uuid::new_v4().simple()));
    config.media.upload_dir = upload_dir.to_string_lossy().into_owned();

    let store = Arc::new(MemoryDocumentStore::new());
    let media = Arc::new(media);
    let jwt_service = Arc::new(JwtService::new(JwtConfig::from_app_config(&config.jwt)));

    let state = AppState::new(
        Arc::new(config),
        store.clone(),
        jwt_service.clone(),
        media.clone(),
    );

    TestApp {
        app: build_router(state.clone()),
        state,
        store,
        media,
        jwt_service,
        upload_dir,
    }
}

impl TestApp {
    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "GET", uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "POST", uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "PUT", uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "DELETE", uri)
    }

    /// Token for an arbitrary identity; handlers only trust the signature
    pub fn token_for(&self, id: &str, role: i64) -> String {
        self.jwt_service.generate_token(id, role).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token_for("admin-id", 0)
    }

    pub fn vet_token(&self) -> String {
        self.token_for("vet-id", 1)
    }

    /// Store a user document directly, returning its id
    pub async fn seed_user(&self, username: &str, password: &str, role: i64) -> String {
        let mut fields = Fields::new();
        fields.insert("username".into(), json!(username));
        fields.insert("nom".into(), json!("Durand"));
        fields.insert("prenom".into(), json!("Camille"));
        fields.insert("role_id".into(), json!(role));
        fields.insert("hashed_password".into(), json!(hash_password(password).unwrap()));
        self.store.insert("users", fields).await.unwrap().id
    }

    /// Store any document directly, returning its id
    pub async fn seed(&self, collection: &str, value: Value) -> String {
        let Value::Object(fields) = value else {
            panic!("seed expects a JSON object");
        };
        self.store.insert(collection, fields).await.unwrap().id
    }

    pub async fn stored(&self, collection: &str, id: &str) -> Option<Value> {
        self.store
            .get(collection, id)
            .await
            .unwrap()
            .map(|doc| doc.to_json())
    }

    /// Files left behind in the staging directory
    pub fn staged_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: &'static str,
    uri: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &'static str, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: Body::empty(),
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.headers
            .push(("content-type".into(), "application/json".into()));
        self.body = Body::from(serde_json::to_vec(body).unwrap());
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.headers
            .push(("authorization".into(), format!("Bearer {}", token)));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Single-file multipart body
    pub fn multipart_file(
        mut self,
        field: &str,
        file_name: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Self {
        let boundary = "arcadia-test-boundary";
        let disposition = match file_name {
            Some(name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                field, name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"", field),
        };

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!("{}\r\n", disposition).as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        self.headers.push((
            "content-type".into(),
            format!("multipart/form-data; boundary={}", boundary),
        ));
        self.body = Body::from(body);
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder.body(self.body).unwrap();

        let response = self.app.app.clone().oneshot(request).await.unwrap();
        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Parse JSON response
    pub async fn json(self) -> Value {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Get response body as text
    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}

/// Assert that no JSON value anywhere in `value` has a `hashed_password` key
pub fn assert_no_password_hash(value: &Value) {
    match value {
        Value::Object(map) => {
            assert!(
                !map.contains_key("hashed_password"),
                "response leaked hashed_password: {}",
                value
            );
            map.values().for_each(assert_no_password_hash);
        },
        Value::Array(items) => items.iter().for_each(assert_no_password_hash),
        _ => {},
    }
}

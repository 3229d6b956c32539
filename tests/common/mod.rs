//! In-process HTTP server for driving the blocking clients.
//!
//! Every request is recorded (query pairs, raw body, multipart parts) and
//! answered with the canned response registered for its method and path.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use axum::body::to_bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub file_name: Option<String>,
    pub content: Vec<u8>,
}

impl Part {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.content).expect("part is JSON")
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub parts: Vec<Part>,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|part| part.name.as_str()).collect()
    }

    pub fn part(&self, name: &str) -> &Part {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .unwrap_or_else(|| panic!("no part named {name}"))
    }

    pub fn parts_named(&self, name: &str) -> Vec<&Part> {
        self.parts.iter().filter(|part| part.name == name).collect()
    }

    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.query
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|value| value.starts_with("multipart/form-data"))
    }
}

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
}

#[derive(Default)]
struct Shared {
    routes: HashMap<(Method, String), Canned>,
    requests: Vec<Recorded>,
}

type SharedState = Arc<Mutex<Shared>>;

pub struct TestServer {
    addr: SocketAddr,
    shared: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn start() -> Self {
        let shared = SharedState::default();
        let state = shared.clone();
        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind test server");
                addr_tx
                    .send(listener.local_addr().expect("local address"))
                    .expect("report address");

                let app = Router::new().fallback(handle).with_state(state);
                axum::serve(listener, app.into_make_service())
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve");
            });
        });

        let addr = addr_rx.recv().expect("test server address");
        Self {
            addr,
            shared,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer `method path` with a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.respond_raw(method, path, status, "application/json", body.to_string().into_bytes());
    }

    pub fn respond_raw(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        content_type: &'static str,
        body: Vec<u8>,
    ) {
        self.shared.lock().unwrap().routes.insert(
            (method, path.to_string()),
            Canned {
                status,
                content_type,
                body,
            },
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request was received")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}", addr)
}

async fn handle(State(shared): State<SharedState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request
        .uri()
        .query()
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut body = Vec::new();
    let mut parts = Vec::new();
    let multipart = content_type
        .as_deref()
        .is_some_and(|value| value.starts_with("multipart/form-data"));
    if multipart {
        let mut form = Multipart::from_request(request, &())
            .await
            .expect("multipart body");
        while let Some(field) = form.next_field().await.expect("multipart field") {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content = field.bytes().await.expect("part content").to_vec();
            parts.push(Part {
                name,
                file_name,
                content,
            });
        }
    } else {
        body = to_bytes(request.into_body(), usize::MAX)
            .await
            .expect("request body")
            .to_vec();
    }

    let canned = {
        let mut shared = shared.lock().unwrap();
        shared.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            query,
            content_type,
            body,
            parts,
        });
        shared.routes.get(&(method.clone(), path.clone())).cloned()
    };

    match canned {
        Some(canned) => (
            canned.status,
            [(header::CONTENT_TYPE, canned.content_type)],
            canned.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("no canned response for {} {}", method, path),
        )
            .into_response(),
    }
}

//! Blocking HTTP transport shared by the protocol clients.
//!
//! Each client holds a [`Transport`] and builds paths relative to its host.
//! Every call issues exactly one request and waits for the full response.

use std::path::{Path, PathBuf};

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{check_envelope, Error, IntoLocalError, Result};

/// API version segment used when none is given.
pub const DEFAULT_API_VERSION: &str = "v1";

#[derive(Debug)]
enum FormValue {
    Text(String),
    File {
        path: PathBuf,
        file_name: Option<String>,
    },
    Json(Value),
}

/// Named parts of a form body, in insertion order.
///
/// Absent values are dropped when the field is added, so the request never
/// carries empty-but-present fields.
#[derive(Debug, Default)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain string part.
    pub fn text<S: Into<String>>(mut self, name: &str, value: Option<S>) -> Self {
        if let Some(value) = value {
            self.fields
                .push((name.to_string(), FormValue::Text(value.into())));
        }
        self
    }

    /// Add a part whose content is read from a local file.
    pub fn file(mut self, name: &str, path: Option<&Path>) -> Self {
        if let Some(path) = path {
            self.fields.push((
                name.to_string(),
                FormValue::File {
                    path: path.to_path_buf(),
                    file_name: None,
                },
            ));
        }
        self
    }

    /// Add a file part under a logical filename instead of the local one.
    pub fn file_as(mut self, name: &str, file_name: &str, path: &Path) -> Self {
        self.fields.push((
            name.to_string(),
            FormValue::File {
                path: path.to_path_buf(),
                file_name: Some(file_name.to_string()),
            },
        ));
        self
    }

    /// Add a JSON document as a file-like part.
    pub fn json(mut self, name: &str, value: Value) -> Self {
        self.fields.push((name.to_string(), FormValue::Json(value)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Open every file part and assemble the multipart body.
    ///
    /// Files are opened here, before anything is sent. If one cannot be
    /// opened, the parts built so far are dropped along with their handles.
    fn into_multipart(self) -> Result<Form> {
        // Attachment names may be relative paths and must arrive verbatim
        let mut form = Form::new().percent_encode_noop();
        for (name, value) in self.fields {
            let part = match value {
                FormValue::Text(text) => Part::text(text),
                FormValue::File { path, file_name } => {
                    let part = Part::file(&path).local_context(&path)?;
                    match file_name {
                        Some(file_name) => part.file_name(file_name),
                        None => part,
                    }
                }
                FormValue::Json(value) => {
                    Part::bytes(value.to_string().into_bytes()).file_name(format!("{}.json", name))
                }
            };
            form = form.part(name, part);
        }
        Ok(form)
    }
}

/// HTTP wrapper bound to one server.
#[derive(Debug, Clone)]
pub struct Transport {
    host: String,
    client: Client,
}

impl Transport {
    pub fn new(host: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidHost {
            host: host.to_string(),
            reason,
        };
        let url = Url::parse(host).map_err(|source| invalid(source.to_string()))?;
        // `localhost:8000` parses with `localhost` as the scheme
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "scheme `{}` is not http or https",
                url.scheme()
            )));
        }

        let client = Client::builder()
            .build()
            .map_err(|source| Error::Transport {
                url: host.to_string(),
                source,
            })?;

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// GET a JSON document. Repeated keys in `query` are sent repeatedly.
    pub fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        let request = self.client.get(&url).query(query);
        self.send_json("GET", &url, request)
    }

    /// GET a body without decoding it.
    pub fn get_raw(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        let request = self.client.get(&url);
        self.exchange("GET", &url, request)
    }

    /// POST a form. A non-empty form is sent as multipart/form-data.
    pub fn post(&self, path: &str, form: FormData) -> Result<Value> {
        let url = self.url(path);
        let request = if form.is_empty() {
            self.client.post(&url)
        } else {
            debug!(url = %url, parts = ?form.names(), "building multipart body");
            self.client.post(&url).multipart(form.into_multipart()?)
        };
        self.send_json("POST", &url, request)
    }

    pub fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value> {
        let url = self.url(path);
        let request = self.client.post(&url).json(body);
        self.send_json("POST", &url, request)
    }

    pub fn patch_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value> {
        let url = self.url(path);
        let request = self.client.patch(&url).json(body);
        self.send_json("PATCH", &url, request)
    }

    fn send_json(&self, method: &str, url: &str, request: RequestBuilder) -> Result<Value> {
        let bytes = self.exchange(method, url, request)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn exchange(&self, method: &str, url: &str, request: RequestBuilder) -> Result<Vec<u8>> {
        debug!(method, url, "sending request");

        let response = request.send().map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        let bytes = response.bytes().map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        debug!(
            method,
            url,
            status = status.as_u16(),
            bytes = bytes.len(),
            "received response"
        );

        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            Err(failure(status, &bytes))
        }
    }
}

/// Convert a non-success response into an error.
///
/// Engine envelopes take precedence so callers see the engine's own message.
fn failure(status: StatusCode, body: &[u8]) -> Error {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => {
            if let Err(err) = check_envelope(&value) {
                return err;
            }
            let message = value
                .get("message")
                .or_else(|| value.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            Error::Http {
                status: status.as_u16(),
                message,
            }
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("empty response body")
                    .to_string()
            } else {
                text
            };
            Error::Http {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Take `name` out of an object body and decode it.
pub(crate) fn field<T: DeserializeOwned>(mut body: Value, name: &'static str) -> Result<T> {
    match body.get_mut(name).map(Value::take) {
        None | Some(Value::Null) => Err(Error::MissingField { field: name }),
        Some(value) => serde_json::from_value(value)
            .map_err(|source| Error::UnexpectedShape { field: name, source }),
    }
}

/// Decode a whole body; `name` identifies it in errors.
pub(crate) fn decode<T: DeserializeOwned>(body: Value, name: &'static str) -> Result<T> {
    serde_json::from_value(body).map_err(|source| Error::UnexpectedShape { field: name, source })
}

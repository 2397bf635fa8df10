use crate::resolver::default::DEFAULT_UA;

use super::error::ResolutionError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use tracing::debug;

/// A single request issued by a parser stage.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Option<Vec<(String, String)>>,
}

impl HttpRequest {
    pub fn new<S: Into<String>>(method: Method, url: S) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            form: None,
        }
    }

    pub fn get<S: Into<String>>(url: S) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post<S: Into<String>>(url: S) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn referer<V: Into<String>>(self, referer: V) -> Self {
        self.header(reqwest::header::REFERER.as_str(), referer)
    }

    /// Attaches an `application/x-www-form-urlencoded` body.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.form = Some(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub headers: FxHashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new<S: Into<String>, B: Into<Bytes>>(status: u16, url: S, body: B) -> Self {
        Self {
            status,
            url: url.into(),
            headers: FxHashMap::default(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text; invalid UTF-8 sequences in markup are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ResolutionError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}

/// The network session strategies issue their requests through.
///
/// Implementations are shared by concurrent resolutions and must not change
/// their configuration while serving a request.
#[async_trait]
pub trait Session: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ResolutionError>;
}

/// [`Session`] backed by a `reqwest` client, with browser-like default
/// headers and a fixed cookie set.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    default_headers: HeaderMap,
    cookies: FxHashMap<String, String>,
}

impl HttpSession {
    pub fn new(client: Client) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );

        Self {
            client,
            default_headers,
            cookies: FxHashMap::default(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, ResolutionError> {
        let (name, value) = parse_header(key, value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Adds cookies from a `name1=value1; name2=value2` string.
    pub fn with_cookies_from_string(mut self, cookie_string: &str) -> Self {
        for cookie in cookie_string.split(';') {
            let cookie = cookie.trim();
            if let Some((name, value)) = cookie.split_once('=') {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
        self
    }

    pub fn cookies(&self) -> &FxHashMap<String, String> {
        &self.cookies
    }

    fn build_cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let cookie_string = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        Some(cookie_string)
    }
}

fn parse_header(key: &str, value: &str) -> Result<(HeaderName, HeaderValue), ResolutionError> {
    let name = HeaderName::from_str(key)
        .map_err(|e| ResolutionError::Configuration(format!("invalid header name {key}: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| ResolutionError::Configuration(format!("invalid header value for {key}: {e}")))?;
    Ok((name, value))
}

#[async_trait]
impl Session for HttpSession {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ResolutionError> {
        let mut headers = self.default_headers.clone();
        for (key, value) in &request.headers {
            let (name, value) = parse_header(key, value)?;
            headers.insert(name, value);
        }
        if let Some(cookies) = self.build_cookie_header() {
            let (name, value) = parse_header(reqwest::header::COOKIE.as_str(), &cookies)?;
            headers.insert(name, value);
        }

        debug!("{} {}", request.method, request.url);
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(headers);
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            url,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_string_parsing() {
        let session = HttpSession::new(Client::new())
            .with_cookies_from_string("token=xyz789; user_id=12345;  theme = dark");
        assert_eq!(session.cookies().len(), 3);
        assert_eq!(session.cookies().get("theme").map(String::as_str), Some("dark"));
        assert!(session.build_cookie_header().is_some());
    }

    #[test]
    fn test_invalid_default_header() {
        let result = HttpSession::new(Client::new()).with_header("bad header", "x");
        assert!(matches!(result, Err(ResolutionError::Configuration(_))));
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::post("https://host.example/api/source/abc")
            .referer("https://host.example/v/abc")
            .form(&[("r", ""), ("d", "host.example")]);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers[0].0, "referer");
        assert_eq!(request.form.as_ref().map(Vec::len), Some(2));
    }
}

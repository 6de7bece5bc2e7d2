// Test client over a RouteDispatcher

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use switchyard_core::{Error, HttpMethod, HttpRequest, HttpResponse, RouteDispatcher};

/// Sends requests straight to a [`RouteDispatcher`], no sockets involved.
#[derive(Clone)]
pub struct TestClient {
    dispatcher: Arc<RouteDispatcher>,
}

impl TestClient {
    pub fn new(dispatcher: Arc<RouteDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &RouteDispatcher {
        &self.dispatcher
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(HttpMethod::DELETE, path, None).await
    }

    pub async fn patch(&self, path: &str, body: Vec<u8>) -> TestResponse {
        self.request(HttpMethod::PATCH, path, Some(body)).await
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> TestResponse {
        let mut builder = TestRequestBuilder::new(method, path);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        self.send(builder.build()).await
    }

    pub async fn send(&self, request: HttpRequest) -> TestResponse {
        match self.dispatcher.dispatch_http_request(request).await {
            Ok(Some(response)) => TestResponse::Success(response),
            Ok(None) => TestResponse::NotMatched,
            Err(error) => TestResponse::Error(error),
        }
    }
}

/// Builder for test requests
pub struct TestRequestBuilder {
    method: HttpMethod,
    path: String,
    scheme: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    query_params: Vec<(String, String)>,
}

impl TestRequestBuilder {
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            scheme: "http".to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params: Vec::new(),
        }
    }

    pub fn scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Set a JSON body and content type
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self, Error> {
        self.body = serde_json::to_vec(data).map_err(|e| Error::Internal(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> HttpRequest {
        let mut request = HttpRequest::new(self.method.as_str().to_string(), self.path)
            .with_scheme(self.scheme)
            .with_body(self.body);
        request.headers.extend(self.headers);
        request.query_params.extend(self.query_params);
        request
    }
}

/// Outcome of a test request
#[derive(Debug)]
pub enum TestResponse {
    Success(HttpResponse),
    /// No route matched the path.
    NotMatched,
    Error(Error),
}

impl TestResponse {
    pub fn assert_success(&self) -> &HttpResponse {
        match self {
            TestResponse::Success(response) => response,
            other => panic!("Expected success response, got {:?}", other),
        }
    }

    pub fn assert_error(&self) -> &Error {
        match self {
            TestResponse::Error(error) => error,
            other => panic!("Expected error response, got {:?}", other),
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, TestResponse::NotMatched)
    }

    /// Response status, 404 when unmatched, or the error's status.
    pub fn status(&self) -> u16 {
        match self {
            TestResponse::Success(response) => response.status,
            TestResponse::NotMatched => 404,
            TestResponse::Error(error) => error.status_code(),
        }
    }

    pub fn body_string(&self) -> Option<String> {
        match self {
            TestResponse::Success(response) => String::from_utf8(response.body.clone()).ok(),
            _ => None,
        }
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, String> {
        match self {
            TestResponse::Success(response) => serde_json::from_slice(&response.body)
                .map_err(|e| format!("Deserialization error: {}", e)),
            other => Err(format!("{:?}", other)),
        }
    }

    pub fn header(&self, key: &str) -> Option<&String> {
        match self {
            TestResponse::Success(response) => response.headers.get(key),
            _ => None,
        }
    }
}

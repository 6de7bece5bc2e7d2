// Request-to-response dispatch over a route collection

use crate::logging::{debug, warn};
use crate::{Error, HttpRequest, HttpResponse, MatchedRoute, RouteCollection, UriMatcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// What a controller hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerOutput {
    /// A complete response, passed through as-is.
    Response(HttpResponse),
    /// Body text for a default 200 response.
    Text(String),
    /// Any other value. Not representable as a response, so it is dropped.
    Value(serde_json::Value),
    Empty,
}

impl ControllerOutput {
    /// Normalize into a response.
    ///
    /// Text is wrapped in a default response; values and empty output fall
    /// back to an empty default response.
    pub fn into_response(self) -> HttpResponse {
        match self {
            ControllerOutput::Response(response) => response,
            ControllerOutput::Text(text) => HttpResponse::text(text),
            ControllerOutput::Value(value) => {
                warn!(value = %value, "controller returned a non-response value, discarding");
                HttpResponse::default()
            }
            ControllerOutput::Empty => HttpResponse::default(),
        }
    }
}

impl From<HttpResponse> for ControllerOutput {
    fn from(response: HttpResponse) -> Self {
        ControllerOutput::Response(response)
    }
}

impl From<String> for ControllerOutput {
    fn from(text: String) -> Self {
        ControllerOutput::Text(text)
    }
}

impl From<&str> for ControllerOutput {
    fn from(text: &str) -> Self {
        ControllerOutput::Text(text.to_string())
    }
}

impl From<serde_json::Value> for ControllerOutput {
    fn from(value: serde_json::Value) -> Self {
        ControllerOutput::Value(value)
    }
}

impl From<()> for ControllerOutput {
    fn from(_: ()) -> Self {
        ControllerOutput::Empty
    }
}

/// Trait for controllers instantiated per request.
///
/// `method` is the route's controller method (`execute` unless the route
/// names one); `args` are the route captures in match order.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn invoke(
        &self,
        method: &str,
        request: HttpRequest,
        args: Vec<String>,
    ) -> Result<ControllerOutput, Error>;
}

/// A controller registered as a callable rather than a type.
pub type ControllerFn = Arc<
    dyn Fn(
            HttpRequest,
            Vec<String>,
        ) -> Pin<Box<dyn Future<Output = Result<ControllerOutput, Error>> + Send>>
        + Send
        + Sync,
>;

type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

#[derive(Clone)]
enum ControllerEntry {
    Factory(ControllerFactory),
    Callable(ControllerFn),
}

/// Controllers by the name routes refer to them with.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    entries: HashMap<String, ControllerEntry>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller type; `factory` runs once per dispatched request.
    pub fn register<C, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let factory: ControllerFactory = Arc::new(move || Box::new(factory()) as Box<dyn Controller>);
        self.entries
            .insert(name.into(), ControllerEntry::Factory(factory));
        self
    }

    /// Register an async closure that is invoked directly.
    pub fn register_fn<F, Fut, T>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(HttpRequest, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
        T: Into<ControllerOutput>,
    {
        let callable: ControllerFn = Arc::new(move |request, args| {
            let fut = f(request, args);
            Box::pin(async move { fut.await.map(Into::into) })
        });
        self.entries
            .insert(name.into(), ControllerEntry::Callable(callable));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the controller a matched route points at.
    pub async fn invoke(
        &self,
        matched: &MatchedRoute,
        request: HttpRequest,
    ) -> Result<ControllerOutput, Error> {
        let entry = self.entries.get(matched.controller()).ok_or_else(|| {
            Error::NotFound(format!(
                "controller '{}' for route '{}' is not registered",
                matched.controller(),
                matched.key()
            ))
        })?;

        let args = matched
            .captures()
            .values()
            .into_iter()
            .map(str::to_string)
            .collect();

        match entry {
            ControllerEntry::Factory(factory) => {
                factory().invoke(matched.method(), request, args).await
            }
            ControllerEntry::Callable(callable) => callable(request, args).await,
        }
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}

/// Matches requests against a [`RouteCollection`] and runs the controller.
#[derive(Debug, Clone)]
pub struct RouteDispatcher {
    routes: Arc<RouteCollection>,
    controllers: Arc<ControllerRegistry>,
}

impl RouteDispatcher {
    pub fn new(routes: Arc<RouteCollection>, controllers: Arc<ControllerRegistry>) -> Self {
        Self {
            routes,
            controllers,
        }
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    /// Match the request path and run the controller it resolves to.
    ///
    /// Returns `Ok(None)` when no route matches; mapping that to a 404 is up
    /// to the caller. Captures are also exposed as the request's path params.
    pub async fn dispatch_http_request(
        &self,
        mut request: HttpRequest,
    ) -> Result<Option<HttpResponse>, Error> {
        let mut matcher = UriMatcher::from_request(&request);

        let Some(matched) = self.routes.match_uri(&mut matcher) else {
            debug!(method = %request.method, path = %request.path, "no route matched");
            return Ok(None);
        };

        debug!(
            key = matched.key(),
            controller = matched.controller(),
            method = matched.method(),
            "dispatching route"
        );

        request.path_params = matched.captures().to_hash_map();
        let output = self.controllers.invoke(&matched, request).await?;
        Ok(Some(output.into_response()))
    }
}

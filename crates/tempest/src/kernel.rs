// File: src/kernel.rs
// Purpose: Transport-agnostic request dispatch: route, call the action, build a response

use crate::config::Config;
use crate::hooks::escape_html;
use crate::renderer::Engine;
use crate::request::Request;
use crate::response::Response;
use crate::template::Template;
use crate::template_loader::TemplateCache;
use crate::value::Value;
use anyhow::Context;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tempest_router::{HandlerSpec, Route, RouteError, Router};
use thiserror::Error;
use tracing::{debug, error};

/// A controller action
pub type Action = Arc<dyn Fn(&Request, &Services) -> anyhow::Result<Output> + Send + Sync>;

/// What an action hands back to the kernel
#[derive(Debug, Clone)]
pub enum Output {
    /// Body text served as is
    Text(String),
    /// Template served with its current content
    Template(Template),
    /// Fully formed response
    Response(Response),
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::Text(text)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::Text(text.to_string())
    }
}

impl From<Template> for Output {
    fn from(template: Template) -> Self {
        Output::Template(template)
    }
}

impl From<Response> for Output {
    fn from(response: Response) -> Self {
        Output::Response(response)
    }
}

/// Failures that end a request with a 500
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("no controller action registered for '{handler}'")]
    MissingHandler { handler: String },

    #[error("handler '{handler}' failed")]
    Handler {
        handler: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to render template '{name}'")]
    Template {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl KernelError {
    /// Two or more routes tied for the top score
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, KernelError::Route(RouteError::Ambiguous { .. }))
    }
}

/// What every action receives besides the request
#[derive(Debug, Clone)]
pub struct Services {
    pub engine: Engine,
    pub templates: TemplateCache,
}

impl Services {
    pub fn new(engine: Engine, templates: TemplateCache) -> Self {
        Self { engine, templates }
    }

    /// Load a template by logical name
    pub fn view(&self, name: &str) -> anyhow::Result<Template> {
        self.templates.load(name)
    }

    /// Load a template and bind `data` into its context-free tokens
    pub fn render(&self, name: &str, data: &Value) -> anyhow::Result<Template> {
        let mut template = self.view(name)?;
        self.engine.bind(&mut template, data, None);
        Ok(template)
    }
}

/// Named collection of actions
///
/// ```
/// use tempest::{Controller, Output};
///
/// let home = Controller::new("Home").action("index", |_req, _services| Ok(Output::from("hi")));
/// assert!(home.get("index").is_some());
/// ```
#[derive(Clone)]
pub struct Controller {
    name: String,
    actions: HashMap<String, Action>,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: HashMap::new(),
        }
    }

    /// Add an action (builder style)
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Request, &Services) -> anyhow::Result<Output> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, action: &str) -> Option<&Action> {
        self.actions.get(action)
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&String> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("actions", &actions)
            .finish()
    }
}

/// The request -> response entry point
#[derive(Debug, Clone)]
pub struct Kernel {
    routes: Vec<Route>,
    controllers: HashMap<String, Controller>,
    services: Services,
    debug: bool,
}

impl Kernel {
    pub fn new(services: Services) -> Self {
        Self {
            routes: Vec::new(),
            controllers: HashMap::new(),
            services,
            debug: false,
        }
    }

    /// Kernel wired from configuration: route table, template cache, debug flag
    pub fn from_config(config: &Config) -> Result<Self, RouteError> {
        let templates = TemplateCache::new(&config.templates.dir, &config.templates.extension);
        let mut kernel = Self::new(Services::new(Engine::default(), templates))
            .with_debug(config.app.debug);
        kernel.routes(&config.routes)?;
        Ok(kernel)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validate and add `(pattern, handler spec)` pairs to the route table
    pub fn routes<I, P, S>(&mut self, routes: I) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<str>,
        S: AsRef<str>,
    {
        let mut router = Router::new();
        router.register(routes)?;
        self.routes.extend(router.routes().iter().cloned());
        Ok(self)
    }

    /// Register a controller, replacing one with the same name
    pub fn controller(&mut self, controller: Controller) -> &mut Self {
        self.controllers.insert(controller.name.clone(), controller);
        self
    }

    pub fn route_table(&self) -> &[Route] {
        &self.routes
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Handle a request; every failure becomes an error response
    pub fn handle(&self, request: Request) -> Response {
        let format = request.format().to_string();

        let response = match self.dispatch(request) {
            Ok(response) => response,
            Err(err) if err.is_ambiguous() => {
                error!(error = %error_chain(&err), "ambiguous request");
                self.error_page(StatusCode::INTERNAL_SERVER_ERROR, &format, Some(&err))
            }
            Err(err) => {
                error!(error = %error_chain(&err), "request failed");
                self.error_page(StatusCode::INTERNAL_SERVER_ERROR, &format, Some(&err))
            }
        };

        response.with_format(&format)
    }

    /// Route and run a request
    pub fn dispatch(&self, mut request: Request) -> Result<Response, KernelError> {
        let mut router = Router::with_routes(self.routes.iter().cloned());
        let route_match = router.resolve(request.path())?.cloned();

        let Some(route_match) = route_match else {
            return self.fallback(&request);
        };

        request.set_named(route_match.params);
        let handler = route_match.route.handler;
        let action = self.action(&handler)?;

        debug!(handler = %handler, path = %request.path(), "dispatching");
        let output = action(&request, &self.services).map_err(|source| KernelError::Handler {
            handler: handler.to_string(),
            source,
        })?;

        Ok(Self::finish(output))
    }

    fn action(&self, handler: &HandlerSpec) -> Result<&Action, KernelError> {
        self.controllers
            .get(&handler.class)
            .and_then(|controller| controller.get(&handler.method))
            .ok_or_else(|| KernelError::MissingHandler {
                handler: handler.to_string(),
            })
    }

    fn finish(output: Output) -> Response {
        match output {
            Output::Text(text) => Response::ok(text),
            Output::Template(template) => Response::ok(template.into_content()),
            Output::Response(response) => response,
        }
    }

    /// No route matched: serve the template named after the path, else 404
    fn fallback(&self, request: &Request) -> Result<Response, KernelError> {
        let name = fallback_template_name(request);

        if is_status_page(&name) || !self.services.templates.contains(&name) {
            debug!(path = %request.path(), template = %name, "no route or template");
            return Ok(self.error_page(StatusCode::NOT_FOUND, request.format(), None));
        }

        let template = self
            .services
            .render(&name, &request.to_value())
            .map_err(|source| KernelError::Template {
                name: name.clone(),
                source,
            })?;

        Ok(Response::ok(template.into_content()))
    }

    /// Error body in the request's format; details only in debug mode
    fn error_page(&self, status: StatusCode, format: &str, err: Option<&KernelError>) -> Response {
        let title = match err {
            Some(err) if err.is_ambiguous() => "Ambiguous Request",
            _ => status.canonical_reason().unwrap_or("Error"),
        };
        let detail = err.filter(|_| self.debug).map(error_chain);

        // A `<status>` template replaces the built-in HTML page
        if format == "html" {
            let data = Value::object([
                ("status", Value::from(u32::from(status.as_u16()))),
                ("title", Value::from(title)),
                ("detail", Value::from(detail.clone())),
            ]);
            if let Ok(page) = self.load_status_page(status, &data) {
                return Response::new(status, page);
            }
        }

        let body = match format {
            "json" => serde_json::json!({
                "status": status.as_u16(),
                "error": title,
                "detail": detail,
            })
            .to_string(),
            "txt" | "text" => match detail {
                Some(detail) => format!("{} {}\n{}\n", status.as_u16(), title, detail),
                None => format!("{} {}\n", status.as_u16(), title),
            },
            _ => format!(
                r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body>
  <h1>{status} {title}</h1>
  {detail}
  <a href="/">Go Home</a>
</body>
</html>"#,
                status = status.as_u16(),
                title = title,
                detail = detail
                    .map(|d| format!("<pre>{}</pre>", escape_html(&d)))
                    .unwrap_or_default(),
            ),
        };

        Response::new(status, body)
    }

    fn load_status_page(&self, status: StatusCode, data: &Value) -> anyhow::Result<String> {
        let name = status.as_u16().to_string();
        if !self.services.templates.contains(&name) {
            anyhow::bail!("no '{}' template", name);
        }
        let template = self
            .services
            .render(&name, data)
            .with_context(|| format!("Failed to render status page {}", name))?;
        Ok(template.into_content())
    }
}

/// `/` -> `index`, `/users/list` -> `users/list`
fn fallback_template_name(request: &Request) -> String {
    if request.is_root() {
        "index".to_string()
    } else {
        request.path().segments().join("/")
    }
}

/// `404`, `500`: reserved for `error_page`, never served by the fallback
fn is_status_page(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

fn error_chain(err: &KernelError) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

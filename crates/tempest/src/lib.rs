// Tempest - small MVC web framework
// Scored route dispatch and `{{ }}` token templates

pub mod value;
pub mod template;
pub mod hooks;

// Framework modules
pub mod renderer;
pub mod template_loader;
pub mod request;
pub mod response;
pub mod kernel;
pub mod config;

// Re-export core types
pub use value::{Bindable, Value};
pub use template::{Template, Token, TokenPart};
pub use hooks::HookRegistry;
pub use renderer::{Diagnostic, Engine, Rendered};

// Re-export framework types
pub use template_loader::TemplateCache;
pub use request::{Bucket, DataBag, DataStack, Request};
pub use response::Response;
pub use kernel::{Action, Controller, Kernel, KernelError, Output, Services};
pub use config::Config;

// Re-export the router crate and commonly used dependency types
pub use tempest_router as router;
pub use tempest_router::{HandlerSpec, Path, Route, RouteError, RouteMatch, Router};
pub use axum;
pub use axum::http::StatusCode;

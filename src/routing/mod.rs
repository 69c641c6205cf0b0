//! Request routing: normalize the raw request, resolve the API version, scan the
//! version's route table for the first matching pattern and dispatch to a registered handler.

mod context;
mod dispatch;
mod matcher;
mod registry;
mod request;
mod table;
mod version;

pub use context::RequestContext;
pub use dispatch::Dispatcher;
pub use matcher::{PathParams, PathPattern};
pub use registry::{Handler, HandlerRegistry};
pub use request::{normalize, parse_body, NormalizedRequest, RawRequest};
pub use table::{HandlerId, Method, RouteEntry, RouteTable};
pub use version::{resolve, ApiVersion, API_PREFIX};

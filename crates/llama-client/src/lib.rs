//! Session, transport and resource services for the Llama Matemática admin client
//!
//! The pieces fit together like this:
//!
//! - [`SessionStore`] holds the token and user, persisted through a
//!   [`KeyValueStore`] under the `auth-storage` key.
//! - [`Transport`] attaches the bearer token and classifies responses into an
//!   [`Outcome`]; [`Interceptor`] applies the 401 policy on top.
//! - [`ApiClient`] combines both; the services in [`resources`] and the
//!   generic [`CrudController`] are built on it.
//! - [`RouteGuard`] decides whether a [`Route`] may render for the current
//!   session.

#![forbid(unsafe_code)]

pub mod api_client;
pub mod crud;
pub mod error;
pub mod guard;
pub mod interceptor;
pub mod navigation;
pub mod notice;
pub mod resources;
pub mod session;
pub mod storage;
pub mod transport;

pub use api_client::ApiClient;
pub use crud::CrudController;
pub use error::{ClientError, Result};
pub use guard::{GuardDecision, RouteGuard};
pub use interceptor::Interceptor;
pub use navigation::{HistoryNavigator, Navigator, Route};
pub use notice::{Notice, NoticeLevel};
pub use resources::{ResourceKind, ResourceService};
pub use session::{SessionState, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use transport::{Outcome, Transport};

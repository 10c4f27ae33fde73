//! In-app navigation: route table, guard policy and the router itself.
//!
//! - `routes`: `RouteDescriptor`, `RouteMeta`, `View` and the default table
//! - `guard`: `NavigationGuard`, the protected/public policy
//! - `navigation`: `Router`, which resolves paths and runs the guard
//!
//! `Navigator` is the handle the request pipeline uses to send the user to
//! login after an authorization failure. `Router` implements it.

pub mod guard;
pub mod navigation;
pub mod routes;

pub use guard::{Decision, NavigationGuard};
pub use navigation::{NavigationError, Router};
pub use routes::{default_routes, RouteDescriptor, RouteMeta, RouteTarget, View};

/// Login view path
pub const LOGIN_PATH: &str = "/login";

/// Registration view path
pub const REGISTER_PATH: &str = "/register";

/// Application root; resolves to the dashboard
pub const HOME_PATH: &str = "/";

/// Where unmatched paths land
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Late-bound navigation handle.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`. Failures are the navigator's to report.
    fn push(&self, path: &str);
}

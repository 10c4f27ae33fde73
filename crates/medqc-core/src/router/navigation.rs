use std::sync::RwLock;

use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::SessionStore;

use super::guard::{Decision, NavigationGuard};
use super::routes::{default_routes, RouteDescriptor, RouteTarget, View};
use super::{Navigator, DASHBOARD_PATH};

/// Maximum redirects followed for one navigation.
/// The default table needs at most three (`/login` -> `/` -> `/dashboard`).
const MAX_REDIRECTS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Too many redirects navigating to {0}")]
    RedirectLoop(String),

    #[error("No route matches {0}")]
    NoRoute(String),
}

/// Resolves paths against the route table and applies the guard.
pub struct Router {
    routes: Vec<RouteDescriptor>,
    guard: NavigationGuard,
    /// Index into `routes` of the route currently shown
    current: RwLock<Option<usize>>,
}

impl Router {
    pub fn new(session: SessionStore) -> Self {
        Self::with_routes(default_routes(), session)
    }

    pub fn with_routes(routes: Vec<RouteDescriptor>, session: SessionStore) -> Self {
        Self {
            routes,
            guard: NavigationGuard::new(session),
            current: RwLock::new(None),
        }
    }

    /// The route currently shown, if any navigation has succeeded yet
    pub fn current_route(&self) -> Option<&RouteDescriptor> {
        let index = (*self.current.read().ok()?)?;
        self.routes.get(index)
    }

    pub fn current_view(&self) -> Option<View> {
        self.current_route().and_then(RouteDescriptor::view)
    }

    /// Navigate to `path`, following static redirects, the catch-all and
    /// guard redirects. Returns the view that ends up shown.
    ///
    /// Unmatched paths fall back to the dashboard before the guard runs, so
    /// the guard still sees the resolved target.
    pub fn navigate(&self, path: &str) -> Result<View, NavigationError> {
        let mut target = normalize(path);

        for _ in 0..MAX_REDIRECTS {
            let Some(index) = self.resolve(&target) else {
                if target == DASHBOARD_PATH {
                    return Err(NavigationError::NoRoute(target));
                }
                debug!(from = %target, "Unmatched path, falling back to dashboard");
                target = DASHBOARD_PATH.to_string();
                continue;
            };
            let route = &self.routes[index];

            let view = match route.target {
                RouteTarget::Redirect(to) => {
                    debug!(from = %target, to, "Static redirect");
                    target = to.to_string();
                    continue;
                }
                RouteTarget::View(view) => view,
            };

            match self.guard.evaluate(route, self.current_route()) {
                Decision::Proceed => {
                    if let Ok(mut current) = self.current.write() {
                        *current = Some(index);
                    }
                    debug!(path = %route.path, "Navigated");
                    return Ok(view);
                }
                Decision::RedirectTo(to) => {
                    debug!(from = %target, to = %to, "Guard redirect");
                    target = to;
                }
            }
        }

        Err(NavigationError::RedirectLoop(path.to_string()))
    }

    fn resolve(&self, path: &str) -> Option<usize> {
        self.routes.iter().position(|r| r.path == path)
    }
}

impl Navigator for Router {
    fn push(&self, path: &str) {
        if let Err(e) = self.navigate(path) {
            warn!(path, error = %e, "Navigation failed");
        }
    }
}

/// Strip query string and fragment; drop a trailing slash except on root.
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

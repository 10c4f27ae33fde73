use crate::auth::SessionStore;

use super::{RouteDescriptor, HOME_PATH, LOGIN_PATH, REGISTER_PATH};

/// Outcome of a navigation check. Denial is always a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    RedirectTo(String),
}

/// Protected/public policy, evaluated before any view is shown.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    session: SessionStore,
}

impl NavigationGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Decide whether navigating to `target` may proceed.
    /// `_current` is the route being left; the policy does not depend on it.
    pub fn evaluate(&self, target: &RouteDescriptor, _current: Option<&RouteDescriptor>) -> Decision {
        decide(target, self.session.token().is_some())
    }
}

/// The guard policy as a pure function of route and token presence.
pub fn decide(target: &RouteDescriptor, has_token: bool) -> Decision {
    if target.is_protected() && !has_token {
        Decision::RedirectTo(LOGIN_PATH.to_string())
    } else if (target.path == LOGIN_PATH || target.path == REGISTER_PATH) && has_token {
        Decision::RedirectTo(HOME_PATH.to_string())
    } else {
        Decision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{MemoryStorage, SessionStorage, UserInfo, USER_KEY};
    use crate::router::{RouteMeta, RouteTarget, View, DASHBOARD_PATH};

    fn route(path: &str, meta: Option<RouteMeta>) -> RouteDescriptor {
        RouteDescriptor::new(path, RouteTarget::View(View::Dashboard), meta)
    }

    fn guard(logged_in: bool) -> NavigationGuard {
        let session = SessionStore::new(Arc::new(MemoryStorage::new()));
        if logged_in {
            session.set_session("tok", &UserInfo::new("zhang"));
        }
        NavigationGuard::new(session)
    }

    #[test]
    fn test_anonymous_to_protected_goes_to_login() {
        let dashboard = route(DASHBOARD_PATH, Some(RouteMeta::requires_auth()));
        assert_eq!(
            guard(false).evaluate(&dashboard, None),
            Decision::RedirectTo(LOGIN_PATH.to_string())
        );
    }

    #[test]
    fn test_logged_in_to_login_goes_home() {
        let login = route(LOGIN_PATH, Some(RouteMeta::public()));
        let register = route(REGISTER_PATH, Some(RouteMeta::public()));
        let g = guard(true);
        assert_eq!(g.evaluate(&login, None), Decision::RedirectTo(HOME_PATH.to_string()));
        assert_eq!(g.evaluate(&register, None), Decision::RedirectTo(HOME_PATH.to_string()));
    }

    #[test]
    fn test_logged_in_to_protected_proceeds() {
        let dashboard = route(DASHBOARD_PATH, Some(RouteMeta::requires_auth()));
        assert_eq!(guard(true).evaluate(&dashboard, None), Decision::Proceed);
    }

    #[test]
    fn test_public_routes_always_proceed() {
        let about = route("/about", Some(RouteMeta::public()));
        assert_eq!(decide(&about, false), Decision::Proceed);
        assert_eq!(decide(&about, true), Decision::Proceed);
    }

    #[test]
    fn test_no_meta_is_protected() {
        let bare = route("/reports", None);
        assert_eq!(decide(&bare, false), Decision::RedirectTo(LOGIN_PATH.to_string()));
        assert_eq!(decide(&bare, true), Decision::Proceed);
    }

    #[test]
    fn test_anonymous_on_login_proceeds() {
        let login = route(LOGIN_PATH, Some(RouteMeta::public()));
        assert_eq!(decide(&login, false), Decision::Proceed);
    }

    #[test]
    fn test_stale_user_without_token_is_denied() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(USER_KEY, r#"{"username":"old"}"#).unwrap();
        let g = NavigationGuard::new(SessionStore::new(storage));
        let dashboard = route(DASHBOARD_PATH, Some(RouteMeta::requires_auth()));
        assert_eq!(g.evaluate(&dashboard, None), Decision::RedirectTo(LOGIN_PATH.to_string()));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let g = guard(false);
        let dashboard = route(DASHBOARD_PATH, None);
        let current = route(LOGIN_PATH, Some(RouteMeta::public()));
        let first = g.evaluate(&dashboard, Some(&current));
        let second = g.evaluate(&dashboard, Some(&current));
        assert_eq!(first, second);
    }
}

use super::{DASHBOARD_PATH, HOME_PATH, LOGIN_PATH, REGISTER_PATH};

/// Views of the application shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    Dashboard,
    HeadQc,
    ChestNonContrastQc,
    ChestContrastQc,
    CoronaryCtaQc,
    Hemorrhage,
    Issues,
}

impl View {
    /// Get the display title for this view.
    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Register => "Register",
            View::Dashboard => "Dashboard",
            View::HeadQc => "CT Head (non-contrast)",
            View::ChestNonContrastQc => "CT Chest (non-contrast)",
            View::ChestContrastQc => "CT Chest (contrast)",
            View::CoronaryCtaQc => "Coronary CTA",
            View::Hemorrhage => "Hemorrhage Detection",
            View::Issues => "Issue Summary",
        }
    }
}

/// Access flags of a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub public: Option<bool>,
    pub requires_auth: Option<bool>,
}

impl RouteMeta {
    pub fn public() -> Self {
        Self {
            public: Some(true),
            requires_auth: None,
        }
    }

    pub fn requires_auth() -> Self {
        Self {
            public: None,
            requires_auth: Some(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(View),
    /// Static redirect, applied before the guard runs
    Redirect(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: String,
    pub target: RouteTarget,
    pub meta: Option<RouteMeta>,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>, target: RouteTarget, meta: Option<RouteMeta>) -> Self {
        Self {
            path: path.into(),
            target,
            meta,
        }
    }

    /// A route is protected unless it is marked public or explicitly opts
    /// out of auth. No meta at all means protected.
    pub fn is_protected(&self) -> bool {
        let meta = self.meta.unwrap_or_default();
        meta.requires_auth != Some(false) && meta.public != Some(true)
    }

    pub fn view(&self) -> Option<View> {
        match self.target {
            RouteTarget::View(view) => Some(view),
            RouteTarget::Redirect(_) => None,
        }
    }
}

/// The application's route table
pub fn default_routes() -> Vec<RouteDescriptor> {
    let protected = |path: &str, view: View| {
        RouteDescriptor::new(path, RouteTarget::View(view), Some(RouteMeta::requires_auth()))
    };

    vec![
        RouteDescriptor::new(LOGIN_PATH, RouteTarget::View(View::Login), Some(RouteMeta::public())),
        RouteDescriptor::new(
            REGISTER_PATH,
            RouteTarget::View(View::Register),
            Some(RouteMeta::public()),
        ),
        RouteDescriptor::new(
            HOME_PATH,
            RouteTarget::Redirect(DASHBOARD_PATH),
            Some(RouteMeta::requires_auth()),
        ),
        protected(DASHBOARD_PATH, View::Dashboard),
        protected("/head", View::HeadQc),
        protected("/chest-non-contrast", View::ChestNonContrastQc),
        protected("/chest-contrast", View::ChestContrastQc),
        protected("/coronary-cta", View::CoronaryCtaQc),
        protected("/hemorrhage", View::Hemorrhage),
        protected("/issues", View::Issues),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protection_rules() {
        let route = |meta| RouteDescriptor::new("/x", RouteTarget::View(View::Dashboard), meta);

        assert!(route(None).is_protected());
        assert!(route(Some(RouteMeta::default())).is_protected());
        assert!(route(Some(RouteMeta::requires_auth())).is_protected());
        assert!(!route(Some(RouteMeta::public())).is_protected());
        assert!(!route(Some(RouteMeta {
            public: None,
            requires_auth: Some(false),
        }))
        .is_protected());
        // public wins over requires_auth
        assert!(!route(Some(RouteMeta {
            public: Some(true),
            requires_auth: Some(true),
        }))
        .is_protected());
    }

    #[test]
    fn test_default_routes_only_auth_views_are_public() {
        let public: Vec<_> = default_routes()
            .into_iter()
            .filter(|r| !r.is_protected())
            .map(|r| r.path)
            .collect();
        assert_eq!(public, vec![LOGIN_PATH, REGISTER_PATH]);
    }
}

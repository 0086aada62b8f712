//! Route table and the authenticated-route guard.

/// Client routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Self::Root),
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

/// Route actually shown for a requested one.
///
/// `/` forwards to the dashboard; protected routes fall back to login
/// without a session.
pub fn resolve_route(requested: Route, authenticated: bool) -> Route {
    let target = match requested {
        Route::Root => Route::Dashboard,
        other => other,
    };
    if target.requires_auth() && !authenticated {
        Route::Login
    } else {
        target
    }
}

/// Entry in the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLink {
    Go(Route),
    Logout,
}

pub fn navigation_links(authenticated: bool) -> Vec<NavLink> {
    if authenticated {
        vec![NavLink::Go(Route::Dashboard), NavLink::Logout]
    } else {
        vec![NavLink::Go(Route::Login), NavLink::Go(Route::Register)]
    }
}

#[cfg(test)]
mod tests {
    use super::{navigation_links, resolve_route, NavLink, Route};

    #[test]
    fn root_forwards_to_dashboard_and_guard_applies() {
        assert_eq!(resolve_route(Route::Root, true), Route::Dashboard);
        assert_eq!(resolve_route(Route::Root, false), Route::Login);
        assert_eq!(resolve_route(Route::Dashboard, false), Route::Login);
        assert_eq!(resolve_route(Route::Register, false), Route::Register);
        assert_eq!(resolve_route(Route::Login, true), Route::Login);
    }

    #[test]
    fn paths_roundtrip() {
        for route in [Route::Root, Route::Login, Route::Register, Route::Dashboard] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn navigation_depends_on_session() {
        assert!(navigation_links(true).contains(&NavLink::Logout));
        assert_eq!(
            navigation_links(false),
            vec![NavLink::Go(Route::Login), NavLink::Go(Route::Register)]
        );
    }
}

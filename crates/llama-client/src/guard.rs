//! Route guard
//!
//! Stateless: every evaluation reads the session snapshot it is given.

use crate::navigation::{Navigator, Route};
use crate::session::{SessionState, SessionStore};
use llama_core::RoleKind;

/// What to do with a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the protected page
    Render,
    /// Send the user elsewhere instead
    Redirect(Route),
}

/// Access rule for a group of routes
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    allowed_roles: Option<Vec<RoleKind>>,
}

impl RouteGuard {
    /// Any authenticated user passes
    #[must_use]
    pub const fn authenticated() -> Self {
        Self {
            allowed_roles: None,
        }
    }

    /// Only users with one of `roles` pass
    #[must_use]
    pub fn with_roles(roles: &[RoleKind]) -> Self {
        Self {
            allowed_roles: Some(roles.to_vec()),
        }
    }

    /// Guard protecting `route`
    ///
    /// Teachers reach the dashboard, the course tree and the reports. Every
    /// other page is admin-only.
    #[must_use]
    pub fn for_route(route: Route) -> Self {
        match route {
            Route::Login
            | Route::Dashboard
            | Route::Courses
            | Route::Topics { .. }
            | Route::Lessons { .. }
            | Route::Questions { .. }
            | Route::Reports => Self::with_roles(&[RoleKind::Admin, RoleKind::Teacher]),
            Route::Institutions
            | Route::Careers { .. }
            | Route::Teachers
            | Route::Students
            | Route::Cycles
            | Route::Store
            | Route::ItemTypes
            | Route::Characters => Self::with_roles(&[RoleKind::Admin]),
        }
    }

    /// Decide for the given session snapshot
    #[must_use]
    pub fn evaluate(&self, state: &SessionState) -> GuardDecision {
        if !state.is_authenticated {
            return GuardDecision::Redirect(Route::Login);
        }

        if let Some(allowed) = &self.allowed_roles {
            let role = state.role_kind().unwrap_or(RoleKind::Unknown);
            if !allowed.contains(&role) {
                return GuardDecision::Redirect(Route::Dashboard);
            }
        }

        GuardDecision::Render
    }

    /// Evaluate `route` and move the navigator accordingly
    ///
    /// Returns `true` when the page may render.
    pub fn enter(session: &SessionStore, navigator: &dyn Navigator, route: Route) -> bool {
        if route.is_public() {
            navigator.navigate(route);
            return true;
        }

        match Self::for_route(route).evaluate(&session.state()) {
            GuardDecision::Render => {
                navigator.navigate(route);
                true
            }
            GuardDecision::Redirect(target) => {
                tracing::info!(requested = %route, redirect = %target, "route denied");
                navigator.navigate(target);
                false
            }
        }
    }
}

//! Route guard and application shell.
//!
//! The guard decides whether a requested route may render. It starts in
//! `Unknown`, renders the loading placeholder once, then settles from the
//! session store. A `watch` receiver lets it notice logins and logouts that
//! happen after mount.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::auth;
use crate::screens::ScreenError;
use crate::session::SessionStore;

pub const LOADING_PLACEHOLDER: &str = "Cargando...";
pub const LOGOUT_LABEL: &str = "Cerrar Sesión";

// ═══════════════════════════════════════════════════════════
// Routes
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    Login,
    /// Default authenticated route.
    #[default]
    Composer,
    PrescriptionList,
    LocalPrescriptions,
    Patients,
    Doctors,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Composer => "/recetas",
            Route::PrescriptionList => "/recetas/list",
            Route::LocalPrescriptions => "/local/recetas",
            Route::Patients => "/pacientes",
            Route::Doctors => "/medicos",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Route::default());
        }
        [
            Route::Login,
            Route::Composer,
            Route::PrescriptionList,
            Route::LocalPrescriptions,
            Route::Patients,
            Route::Doctors,
        ]
        .into_iter()
        .find(|r| r.path() == path)
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ═══════════════════════════════════════════════════════════
// Guard
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// What the front end should do for the requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Session not checked yet; show the placeholder.
    Loading,
    Redirect(Route),
    Render(Route),
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
    changes: watch::Receiver<bool>,
    state: GuardState,
    requested: Route,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>, requested: Route) -> Self {
        let changes = session.subscribe();
        Self {
            session,
            changes,
            state: GuardState::Unknown,
            requested,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn requested(&self) -> Route {
        self.requested
    }

    pub fn resolve(&self) -> Resolution {
        match self.state {
            GuardState::Unknown => Resolution::Loading,
            _ if !self.requested.requires_auth() => Resolution::Render(self.requested),
            GuardState::Authenticated => Resolution::Render(self.requested),
            GuardState::Unauthenticated => Resolution::Redirect(Route::Login),
        }
    }

    /// Settle the guard. The placeholder goes to `render` only while the
    /// state is still `Unknown`, so a second `mount` renders nothing.
    pub fn mount(&mut self, render: &mut impl FnMut(&str)) -> Resolution {
        if self.state == GuardState::Unknown {
            render(LOADING_PLACEHOLDER);
            self.changes.mark_unchanged();
            self.state = Self::state_for(self.session.is_authenticated());
            tracing::debug!(route = %self.requested, state = ?self.state, "Route guard settled");
        }
        self.resolve()
    }

    /// Apply any session change published since the last check.
    pub fn refresh(&mut self) -> Resolution {
        if self.state != GuardState::Unknown && self.changes.has_changed().unwrap_or(false) {
            let authenticated = *self.changes.borrow_and_update();
            self.state = Self::state_for(authenticated);
            tracing::debug!(route = %self.requested, state = ?self.state, "Route guard refreshed");
        }
        self.resolve()
    }

    fn state_for(authenticated: bool) -> GuardState {
        if authenticated {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Shell
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem { route: Route::Patients, label: "Pacientes" },
    NavItem { route: Route::Doctors, label: "Médicos" },
    NavItem { route: Route::Composer, label: "Nueva Receta" },
    NavItem { route: Route::PrescriptionList, label: "Recetas Enviadas (Web)" },
    NavItem { route: Route::LocalPrescriptions, label: "Recetas Locales / PDFs" },
];

/// Navigation frame around authenticated screens.
pub struct Shell {
    session: Arc<SessionStore>,
    current: Route,
}

impl Shell {
    pub fn new(session: Arc<SessionStore>, current: Route) -> Self {
        Self { session, current }
    }

    pub fn nav_items(&self) -> &'static [NavItem] {
        &NAV_ITEMS
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn navigate(&mut self, route: Route) -> Route {
        self.current = route;
        route
    }

    pub fn logout(&mut self) -> Result<Route, ScreenError> {
        let route = auth::logout(&self.session)?;
        self.current = route;
        Ok(route)
    }
}

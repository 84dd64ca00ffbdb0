//! Client-side role gate. Decisions come from the cached user-info alone; the backend still
//! enforces authorization on every call.

use crate::{models::Role, session::SessionContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    AdminDashboard,
    Users,
    ManagerDashboard,
    MemberDashboard,
    Tasks,
    MyTasks,
    Reports,
    Profile,
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Login,
        Route::Register,
        Route::AdminDashboard,
        Route::Users,
        Route::ManagerDashboard,
        Route::MemberDashboard,
        Route::Tasks,
        Route::MyTasks,
        Route::Reports,
        Route::Profile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Register => "/register",
            Route::AdminDashboard => "/Admin-Dashboard",
            Route::Users => "/users",
            Route::ManagerDashboard => "/Manager-Dashboard",
            Route::MemberDashboard => "/Member-Dashboard",
            Route::Tasks => "/tasks",
            Route::MyTasks => "/my-tasks",
            Route::Reports => "/reports",
            Route::Profile => "/my-profile",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn access(self) -> Access {
        match self {
            Route::Login | Route::Register => Access::Public,
            Route::AdminDashboard | Route::Users => Access::Roles(&[Role::Admin]),
            Route::ManagerDashboard => Access::Roles(&[Role::Manager]),
            Route::MemberDashboard | Route::MyTasks => Access::Roles(&[Role::Member]),
            Route::Tasks | Route::Reports => Access::Roles(&[Role::Admin, Role::Manager]),
            Route::Profile => Access::Authenticated,
        }
    }

    /// Dashboard a role lands on after sign-in.
    pub fn home(role: Role) -> Route {
        match role {
            Role::Admin => Route::AdminDashboard,
            Role::Manager => Route::ManagerDashboard,
            Role::Member => Route::MemberDashboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    RedirectToLogin,
    Forbidden { home: Route },
}

pub fn check(role: Option<Role>, route: Route) -> Navigation {
    match (route.access(), role) {
        (Access::Public, _) => Navigation::Allow,
        (_, None) => Navigation::RedirectToLogin,
        (Access::Authenticated, Some(_)) => Navigation::Allow,
        (Access::Roles(allowed), Some(role)) if allowed.contains(&role) => Navigation::Allow,
        (Access::Roles(_), Some(role)) => Navigation::Forbidden {
            home: Route::home(role),
        },
    }
}

#[derive(Clone)]
pub struct Guard {
    session: SessionContext,
}

impl Guard {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn check(&self, route: Route) -> Navigation {
        let outcome = check(self.session.role(), route);
        if outcome != Navigation::Allow {
            tracing::debug!(path = route.path(), ?outcome, "Navigation denied");
        }
        outcome
    }

    pub fn sidebar(&self) -> Vec<SidebarLink> {
        self.session.role().map(sidebar_links).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarLink {
    pub label: &'static str,
    pub path: &'static str,
    roles: &'static [Role],
}

const SIDEBAR: [SidebarLink; 7] = [
    SidebarLink { label: "Dashboard", path: "/Admin-Dashboard", roles: &[Role::Admin] },
    SidebarLink { label: "Dashboard", path: "/Manager-Dashboard", roles: &[Role::Manager] },
    SidebarLink { label: "Dashboard", path: "/Member-Dashboard", roles: &[Role::Member] },
    SidebarLink { label: "Manage Users", path: "/users", roles: &[Role::Admin] },
    SidebarLink { label: "Tasks", path: "/tasks", roles: &[Role::Manager] },
    SidebarLink { label: "My Tasks", path: "/my-tasks", roles: &[Role::Member] },
    SidebarLink { label: "Reports", path: "/reports", roles: &[Role::Admin, Role::Manager] },
];

pub fn sidebar_links(role: Role) -> Vec<SidebarLink> {
    SIDEBAR
        .into_iter()
        .filter(|link| link.roles.contains(&role))
        .collect()
}

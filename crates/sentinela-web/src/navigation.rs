//! Dashboard pages and the navigation a session is allowed to see.

use serde::Serialize;

use sentinela_auth::permissions::*;
use sentinela_auth::{Gate, Guarded, PermissionGate, ReadOnlyGate, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Gauge,
    UserCheck,
    Calculator,
    TrendingUp,
    BarChart,
    Workflow,
    ScrollText,
    Settings,
    Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Dashboard,
    Prinad,
    Ecl,
    Propensao,
    Analytics,
    Pipeline,
    Audit,
    Settings,
    Users,
}

impl Page {
    /// Sidebar order.
    pub const ALL: [Page; 9] = [
        Page::Dashboard,
        Page::Prinad,
        Page::Ecl,
        Page::Propensao,
        Page::Analytics,
        Page::Pipeline,
        Page::Audit,
        Page::Settings,
        Page::Users,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Prinad => "PRINAD classification",
            Page::Ecl => "Expected credit loss",
            Page::Propensao => "Limit propensity",
            Page::Analytics => "Model analytics",
            Page::Pipeline => "Portfolio pipeline",
            Page::Audit => "Audit log",
            Page::Settings => "Settings",
            Page::Users => "Users",
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Prinad => "/prinad",
            Page::Ecl => "/ecl",
            Page::Propensao => "/propensao",
            Page::Analytics => "/analytics",
            Page::Pipeline => "/pipeline",
            Page::Audit => "/audit",
            Page::Settings => "/settings",
            Page::Users => "/users",
        }
    }

    pub fn icon(self) -> Icon {
        match self {
            Page::Dashboard => Icon::Gauge,
            Page::Prinad => Icon::UserCheck,
            Page::Ecl => Icon::Calculator,
            Page::Propensao => Icon::TrendingUp,
            Page::Analytics => Icon::BarChart,
            Page::Pipeline => Icon::Workflow,
            Page::Audit => Icon::ScrollText,
            Page::Settings => Icon::Settings,
            Page::Users => Icon::Users,
        }
    }

    pub fn required_permission(self) -> &'static str {
        match self {
            Page::Dashboard => VIEW_DASHBOARD,
            Page::Prinad => VIEW_PRINAD,
            Page::Ecl => VIEW_ECL,
            Page::Propensao => VIEW_PROPENSAO,
            Page::Analytics => VIEW_ANALYTICS,
            Page::Pipeline => RUN_PIPELINE,
            Page::Audit => VIEW_AUDIT,
            Page::Settings => VIEW_SETTINGS,
            Page::Users => MANAGE_USERS,
        }
    }

    pub fn gate(self) -> PermissionGate {
        PermissionGate::new(self.required_permission())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub page: Page,
    pub title: &'static str,
    pub route: &'static str,
    pub icon: Icon,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

/// Pages whose gate passes for `session`, in sidebar order.
pub fn navigation(session: &Session) -> Vec<NavItem> {
    Page::ALL
        .iter()
        .filter_map(|page| page.gate().render_opt(session, *page))
        .map(|page| {
            let guarded: Guarded<Page> = ReadOnlyGate.wrap(session, page);
            NavItem {
                page,
                title: page.title(),
                route: page.route(),
                icon: page.icon(),
                read_only: !guarded.is_interactive(),
                notice: guarded.notice(),
            }
        })
        .collect()
}

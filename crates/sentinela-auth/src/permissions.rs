//! Permission vocabulary.
//!
//! Permissions are opaque tags; the authentication backend owns the
//! authoritative list. These are the tags this application checks.

pub const VIEW_DASHBOARD: &str = "view:dashboard";
pub const VIEW_PRINAD: &str = "view:prinad";
pub const VIEW_ECL: &str = "view:ecl";
pub const VIEW_PROPENSAO: &str = "view:propensao";
pub const VIEW_ANALYTICS: &str = "view:analytics";
pub const RUN_CLASSIFICATION: &str = "run:classification";
pub const RUN_PIPELINE: &str = "run:pipeline";
pub const SIMULATE_LIMITS: &str = "simulate:limits";
pub const EXPORT_CSV: &str = "export:csv";
pub const EXPORT_REPORT: &str = "export:report";
pub const EXPORT_BACEN: &str = "export:bacen";
pub const VIEW_AUDIT: &str = "view:audit";
pub const VIEW_SETTINGS: &str = "view:settings";
pub const MANAGE_SETTINGS: &str = "manage:settings";
pub const MANAGE_USERS: &str = "manage:users";

/// Grants every permission.
pub const WILDCARD: &str = "*";

pub const PERMISSIONS: &[(&str, &str)] = &[
    (VIEW_DASHBOARD, "View the overview dashboard"),
    (VIEW_PRINAD, "View PRINAD classifications"),
    (VIEW_ECL, "View ECL calculations and homogeneous groups"),
    (VIEW_PROPENSAO, "View propensity scores and limit recommendations"),
    (VIEW_ANALYTICS, "View model performance, drift and backtests"),
    (RUN_CLASSIFICATION, "Submit clients for classification"),
    (RUN_PIPELINE, "Run the portfolio pipeline"),
    (SIMULATE_LIMITS, "Simulate limit changes"),
    (EXPORT_CSV, "Export tables as CSV"),
    (EXPORT_REPORT, "Export rendered reports"),
    (EXPORT_BACEN, "Produce regulatory exports"),
    (VIEW_AUDIT, "View the audit log"),
    (VIEW_SETTINGS, "View application settings"),
    (MANAGE_SETTINGS, "Change application settings"),
    (MANAGE_USERS, "Create and manage user accounts"),
];

pub fn is_known(permission: &str) -> bool {
    permission == WILDCARD || PERMISSIONS.iter().any(|(p, _)| *p == permission)
}

pub fn has_permission<'a, I>(user_permissions: I, required: &str) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    user_permissions
        .into_iter()
        .any(|p| p == WILDCARD || p == required)
}

//! Role-gated navigation. One static table, one check per navigation.

use crate::auth::UserRole;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Page {
    Login,
    Dashboard,
    Checkin,
    History,
    Team,
    Alerts,
    Analytics,
    Admin,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavOutcome {
    Granted,
    RedirectToLogin,
    RedirectToDashboard,
}

const ALL: &[UserRole] = &[
    UserRole::Employee,
    UserRole::Manager,
    UserRole::HrAdmin,
    UserRole::SuperAdmin,
];
const MANAGEMENT: &[UserRole] = &[UserRole::Manager, UserRole::HrAdmin, UserRole::SuperAdmin];
const ADMINISTRATION: &[UserRole] = &[UserRole::HrAdmin, UserRole::SuperAdmin];

pub fn allowed_roles(page: Page) -> &'static [UserRole] {
    match page {
        Page::Login | Page::Dashboard | Page::Checkin | Page::History => ALL,
        Page::Team | Page::Alerts | Page::Analytics => MANAGEMENT,
        Page::Admin => ADMINISTRATION,
    }
}

/// Unauthenticated access redirects to login; an authenticated role
/// outside the page's set redirects to the dashboard.
pub fn resolve(page: Page, role: Option<UserRole>) -> NavOutcome {
    if page == Page::Login {
        return NavOutcome::Granted;
    }
    let Some(role) = role else {
        return NavOutcome::RedirectToLogin;
    };
    if allowed_roles(page).contains(&role) {
        NavOutcome::Granted
    } else {
        NavOutcome::RedirectToDashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_is_sent_to_login() {
        assert_eq!(resolve(Page::Dashboard, None), NavOutcome::RedirectToLogin);
        assert_eq!(resolve(Page::Admin, None), NavOutcome::RedirectToLogin);
    }

    #[test]
    fn login_page_is_always_reachable() {
        assert_eq!(resolve(Page::Login, None), NavOutcome::Granted);
        assert_eq!(
            resolve(Page::Login, Some(UserRole::Employee)),
            NavOutcome::Granted
        );
    }

    #[test]
    fn employee_on_management_page_goes_to_dashboard_not_login() {
        assert_eq!(
            resolve(Page::Team, Some(UserRole::Employee)),
            NavOutcome::RedirectToDashboard
        );
        assert_eq!(
            resolve(Page::Alerts, Some(UserRole::Employee)),
            NavOutcome::RedirectToDashboard
        );
    }

    #[test]
    fn manager_reaches_management_but_not_admin() {
        assert_eq!(
            resolve(Page::Analytics, Some(UserRole::Manager)),
            NavOutcome::Granted
        );
        assert_eq!(
            resolve(Page::Admin, Some(UserRole::Manager)),
            NavOutcome::RedirectToDashboard
        );
    }

    #[test]
    fn hr_admin_and_super_admin_reach_admin() {
        assert_eq!(
            resolve(Page::Admin, Some(UserRole::HrAdmin)),
            NavOutcome::Granted
        );
        assert_eq!(
            resolve(Page::Admin, Some(UserRole::SuperAdmin)),
            NavOutcome::Granted
        );
    }

    #[test]
    fn every_role_reaches_the_dashboard() {
        for role in ALL {
            assert_eq!(resolve(Page::Dashboard, Some(*role)), NavOutcome::Granted);
        }
    }
}

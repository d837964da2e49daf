use std::collections::HashMap;

use async_trait::async_trait;
use staff_portal::{
    directory::{DirectoryError, RoleDirectory},
    gate::{Decision, GateConfig, PathClass, RedirectReason},
    models::Role,
    session::{Session, SessionUser},
};
use uuid::Uuid;

// --- Mock Directory for Gate Logic ---

/// Directory backed by a fixed username-to-role map. `fail` simulates the
/// database being unreachable.
#[derive(Default)]
struct MockDirectory {
    roles: HashMap<String, Role>,
    fail: bool,
}

#[async_trait]
impl RoleDirectory for MockDirectory {
    async fn get_role(&self, username: &str) -> Result<Option<Role>, DirectoryError> {
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(self.roles.get(username).cloned())
    }
}

// --- Helper Functions ---

fn directory_of(entries: &[(&str, Role)]) -> MockDirectory {
    MockDirectory {
        roles: entries
            .iter()
            .map(|(name, role)| (name.to_string(), role.clone()))
            .collect(),
        fail: false,
    }
}

fn failing_directory() -> MockDirectory {
    MockDirectory {
        roles: HashMap::new(),
        fail: true,
    }
}

fn session_for(email: Option<&str>) -> Session {
    Session {
        user: SessionUser {
            id: Uuid::from_u128(1),
            email: email.map(str::to_string),
        },
    }
}

fn login_redirect_from(path: &str) -> Decision {
    Decision::Redirect {
        location: format!("/?redirectedFrom={}", path),
        reason: RedirectReason::MissingSession,
    }
}

// --- Classification ---

#[test]
fn test_classify_buckets_paths_by_prefix() {
    let gate = GateConfig::default();

    assert_eq!(gate.classify("/"), PathClass::Open);
    assert_eq!(gate.classify("/about"), PathClass::Open);
    assert_eq!(gate.classify("/staff"), PathClass::Staff);
    assert_eq!(gate.classify("/staff/dashboard"), PathClass::Staff);
    assert_eq!(gate.classify("/admin"), PathClass::Admin);
    assert_eq!(gate.classify("/admin/dashboard"), PathClass::Admin);
    assert_eq!(gate.classify("/public/info"), PathClass::Bypassed);
    assert_eq!(gate.classify("/static/app.css"), PathClass::Bypassed);
    assert_eq!(gate.classify("/images/logo.png"), PathClass::Bypassed);
    assert_eq!(gate.classify("/favicon.ico"), PathClass::Bypassed);
}

#[test]
fn test_classify_is_segment_aware() {
    let gate = GateConfig::default();

    // Sibling paths sharing a textual prefix are not protected.
    assert_eq!(gate.classify("/staffing"), PathClass::Open);
    assert_eq!(gate.classify("/staff-lounge"), PathClass::Open);
    assert_eq!(gate.classify("/administrator"), PathClass::Open);
    assert_eq!(gate.classify("/publication"), PathClass::Open);
}

#[test]
fn test_directory_key_strips_the_configured_domain() {
    let gate = GateConfig::default();

    assert_eq!(gate.directory_key("jane@example.com"), "jane");
    // Identities outside the domain are used verbatim.
    assert_eq!(gate.directory_key("jane@other.com"), "jane@other.com");
    assert_eq!(gate.directory_key("jane"), "jane");
}

// --- Unprotected and Bypassed Paths ---

#[tokio::test]
async fn test_unprotected_paths_allow_without_session() {
    let gate = GateConfig::default();
    // A failing directory proves no lookup happens on these paths.
    let directory = failing_directory();

    for path in ["/", "/health", "/about/team", "/staffing"] {
        let decision = gate.decide(path, None, &directory).await;
        assert_eq!(decision, Decision::Allow, "path {path}");
    }
}

#[tokio::test]
async fn test_unprotected_paths_allow_with_session() {
    let gate = GateConfig::default();
    let directory = failing_directory();
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/about", Some(&session), &directory).await;
    assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn test_bypassed_paths_allow_without_session() {
    let gate = GateConfig::default();
    let directory = failing_directory();

    let decision = gate.decide("/public/info", None, &directory).await;
    assert_eq!(decision, Decision::Allow);
}

// --- Missing Session ---

#[tokio::test]
async fn test_protected_path_without_session_redirects_to_login() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Staff)]);

    let decision = gate.decide("/staff/dashboard", None, &directory).await;
    assert_eq!(decision, login_redirect_from("/staff/dashboard"));

    let decision = gate.decide("/admin/dashboard", None, &directory).await;
    assert_eq!(decision, login_redirect_from("/admin/dashboard"));
}

#[tokio::test]
async fn test_protected_prefix_root_requires_session_too() {
    let gate = GateConfig::default();
    let directory = directory_of(&[]);

    let decision = gate.decide("/staff", None, &directory).await;
    assert_eq!(decision, login_redirect_from("/staff"));
}

// --- Role Checks ---

#[tokio::test]
async fn test_admin_role_reaches_admin_area() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Admin)]);
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/admin/dashboard", Some(&session), &directory).await;
    assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn test_staff_role_reaches_staff_area() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Staff)]);
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn test_staff_role_in_admin_area_redirects_to_staff_home() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Staff)]);
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/admin/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/staff/dashboard".to_string(),
            reason: RedirectReason::WrongRole,
        }
    );
}

#[tokio::test]
async fn test_admin_role_in_staff_area_redirects_to_admin_home() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Admin)]);
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/admin/dashboard".to_string(),
            reason: RedirectReason::WrongRole,
        }
    );
}

#[tokio::test]
async fn test_unknown_role_falls_through_to_opposite_dashboard() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Unknown("intern".to_string()))]);
    let session = session_for(Some("jane@example.com"));

    // An unrecognized role fails both specific checks, so it lands on the
    // opposite area's home page rather than an error page.
    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/admin/dashboard".to_string(),
            reason: RedirectReason::WrongRole,
        }
    );

    let decision = gate.decide("/admin/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/staff/dashboard".to_string(),
            reason: RedirectReason::WrongRole,
        }
    );
}

// --- Fail-Closed Role Resolution ---

#[tokio::test]
async fn test_role_lookup_error_fails_closed_to_login() {
    let gate = GateConfig::default();
    let directory = failing_directory();
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/".to_string(),
            reason: RedirectReason::RoleUnresolved,
        }
    );
}

#[tokio::test]
async fn test_missing_directory_row_fails_closed_to_login() {
    let gate = GateConfig::default();
    let directory = directory_of(&[]);
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/admin/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/".to_string(),
            reason: RedirectReason::RoleUnresolved,
        }
    );
}

#[tokio::test]
async fn test_session_without_email_fails_closed_to_login() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Staff)]);
    let session = session_for(None);

    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/".to_string(),
            reason: RedirectReason::RoleUnresolved,
        }
    );
}

// --- Identity Derivation ---

#[tokio::test]
async fn test_email_domain_is_stripped_before_lookup() {
    let gate = GateConfig::default();
    // The directory only knows the bare username.
    let directory = directory_of(&[("jane", Role::Staff)]);
    let session = session_for(Some("jane@example.com"));

    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn test_foreign_domain_email_is_looked_up_verbatim() {
    let gate = GateConfig::default();
    let directory = directory_of(&[("jane", Role::Staff)]);
    let session = session_for(Some("jane@other.com"));

    // "jane@other.com" has no directory row under that exact key.
    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(
        decision,
        Decision::Redirect {
            location: "/".to_string(),
            reason: RedirectReason::RoleUnresolved,
        }
    );

    // A directory row stored under the full address does resolve.
    let directory = directory_of(&[("jane@other.com", Role::Staff)]);
    let decision = gate.decide("/staff/dashboard", Some(&session), &directory).await;
    assert_eq!(decision, Decision::Allow);
}

use crate::{directory::RoleDirectory, models::Role, session::Session};

// --- Path Classification ---

/// PathClass
///
/// The gate's view of an incoming request path, resolved before any external
/// call is made. Only `Staff` and `Admin` paths ever trigger a session or
/// role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Matcher exclusion: static assets, image optimization output, the
    /// favicon, and public files. The gate does not run for these at all.
    Bypassed,
    /// No protected prefix. Always allowed, regardless of session state.
    Open,
    /// Under the staff prefix. Requires a session with the `staff` role.
    Staff,
    /// Under the admin prefix. Requires a session with the `admin` role.
    Admin,
}

// --- Decision Output ---

/// RedirectReason
///
/// Why the gate refused to let a request through. Carried on the decision
/// for structured logging; never shown to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Protected path without any session.
    MissingSession,
    /// Session present, but its role could not be resolved (no email on the
    /// session, no directory row, or the lookup itself failed).
    RoleUnresolved,
    /// Session and role resolved, but the role does not match the area.
    WrongRole,
}

/// Decision
///
/// Pure output of the access decision. `Allow` lets the request continue to
/// the inner router; `Redirect` short-circuits it with an HTTP redirect to
/// one of the fixed destinations (login, staff home, admin home).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect {
        location: String,
        reason: RedirectReason,
    },
}

// --- Policy Configuration ---

/// GateConfig
///
/// The access policy: which prefixes are protected, where refused requests
/// are sent, which prefixes bypass the gate entirely, and how a session
/// identity is turned into a directory lookup key.
///
/// Prefix matching is segment aware: a prefix matches itself exactly or at
/// a `/` boundary, so `/staff` covers `/staff` and `/staff/dashboard` but
/// not `/staffing`.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Prefix of the staff area.
    pub staff_prefix: String,
    /// Prefix of the admin area.
    pub admin_prefix: String,
    /// Where unauthenticated or unresolvable requests are sent.
    pub login_path: String,
    /// Landing page for users holding the `staff` role.
    pub staff_home: String,
    /// Landing page for users holding the `admin` role.
    pub admin_home: String,
    /// Prefixes excluded from the gate: static assets, image optimization
    /// output, favicon, public files.
    pub bypass_prefixes: Vec<String>,
    /// Domain suffix stripped from the session email to obtain the
    /// directory username.
    pub email_domain: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            staff_prefix: "/staff".to_string(),
            admin_prefix: "/admin".to_string(),
            login_path: "/".to_string(),
            staff_home: "/staff/dashboard".to_string(),
            admin_home: "/admin/dashboard".to_string(),
            bypass_prefixes: vec![
                "/static".to_string(),
                "/images".to_string(),
                "/favicon.ico".to_string(),
                "/public".to_string(),
            ],
            email_domain: "@example.com".to_string(),
        }
    }
}

/// Segment-aware prefix test: the prefix matches exactly, or the remainder
/// starts at a path-segment boundary. `/staffing` does not match `/staff`.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl GateConfig {
    /// classify
    ///
    /// Resolves the path class from configured prefixes alone. Bypass
    /// prefixes win over protected prefixes, so a bypass entry nested under
    /// a protected area would be honored.
    pub fn classify(&self, path: &str) -> PathClass {
        if self
            .bypass_prefixes
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
        {
            return PathClass::Bypassed;
        }
        if path_has_prefix(path, &self.admin_prefix) {
            return PathClass::Admin;
        }
        if path_has_prefix(path, &self.staff_prefix) {
            return PathClass::Staff;
        }
        PathClass::Open
    }

    /// is_bypassed
    ///
    /// True when the matcher excludes this path from the gate entirely.
    /// The middleware checks this before fetching a session, so excluded
    /// paths cost no external call.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.classify(path) == PathClass::Bypassed
    }

    /// directory_key
    ///
    /// Derives the directory username from the session email by stripping
    /// the configured domain suffix. An email outside that domain is looked
    /// up verbatim, which then fails closed on the missing directory row.
    pub fn directory_key<'a>(&self, email: &'a str) -> &'a str {
        email.strip_suffix(&self.email_domain).unwrap_or(email)
    }

    /// decide
    ///
    /// The access decision function. Given the request path, the session
    /// resolved for this request (if any), and the role directory, produces
    /// the decision for this request. Stateless; one call per request.
    ///
    /// Every refusal degrades to a redirect. A role that cannot be resolved
    /// for any reason sends the user back to login even though they were
    /// authenticated (fail-closed).
    pub async fn decide(
        &self,
        path: &str,
        session: Option<&Session>,
        directory: &dyn RoleDirectory,
    ) -> Decision {
        let class = match self.classify(path) {
            PathClass::Bypassed | PathClass::Open => {
                tracing::debug!(%path, "path not protected, allowing");
                return Decision::Allow;
            }
            protected => protected,
        };

        let Some(session) = session else {
            tracing::info!(%path, "no session on protected path, redirecting to login");
            return Decision::Redirect {
                location: format!("{}?redirectedFrom={}", self.login_path, path),
                reason: RedirectReason::MissingSession,
            };
        };

        // A session without an email identity cannot be mapped to a
        // directory row.
        let Some(email) = session.user.email.as_deref() else {
            tracing::warn!(
                %path,
                user_id = %session.user.id,
                "session has no email identity, redirecting to login"
            );
            return self.fail_closed();
        };

        let username = self.directory_key(email);
        let role = match directory.get_role(username).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                tracing::warn!(%path, %username, "no directory role for user, redirecting to login");
                return self.fail_closed();
            }
            Err(e) => {
                tracing::error!(%path, %username, error = %e, "role lookup failed, redirecting to login");
                return self.fail_closed();
            }
        };

        // Exact role checks. A role outside the known set fails both checks
        // and lands on the opposite area's home page.
        if class == PathClass::Admin && role != Role::Admin {
            tracing::info!(%path, %username, role = %role, "unauthorized admin access attempt");
            return Decision::Redirect {
                location: self.staff_home.clone(),
                reason: RedirectReason::WrongRole,
            };
        }
        if class == PathClass::Staff && role != Role::Staff {
            tracing::info!(%path, %username, role = %role, "unauthorized staff access attempt");
            return Decision::Redirect {
                location: self.admin_home.clone(),
                reason: RedirectReason::WrongRole,
            };
        }

        Decision::Allow
    }

    /// Plain redirect to login, discarding the original destination.
    fn fail_closed(&self) -> Decision {
        Decision::Redirect {
            location: self.login_path.clone(),
            reason: RedirectReason::RoleUnresolved,
        }
    }
}

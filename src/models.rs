use std::fmt;

/// Role
///
/// The authorization label resolved per authenticated identity via the user
/// directory. The portal recognizes exactly two roles; any other value the
/// directory returns is carried as `Unknown` and fails every specific role
/// check in the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
    Unknown(String),
}

impl Role {
    /// The wire form of the role, as stored in the directory.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Unknown(other) => other,
        }
    }
}

impl From<String> for Role {
    /// Exact string mapping. Comparison against the known set is case
    /// sensitive; "Admin" is an unknown role.
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Role::Admin,
            "staff" => Role::Staff,
            _ => Role::Unknown(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

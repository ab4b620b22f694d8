use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed role enumeration. Every historical spelling parses into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    UserManager,
    EventManager,
    NewsManager,
    ContentManager,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::UserManager,
        Role::EventManager,
        Role::NewsManager,
        Role::ContentManager,
        Role::Viewer,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::UserManager => "user_manager",
            Role::EventManager => "event_manager",
            Role::NewsManager => "news_manager",
            Role::ContentManager => "content_manager",
            Role::Viewer => "viewer",
        }
    }

    /// Parse any accepted spelling; `None` for names outside the enumeration.
    pub fn parse(raw: &str) -> Option<Role> {
        match normalize_role_name(raw).as_str() {
            "admin" | "administrator" | "super_admin" => Some(Role::Admin),
            "user_manager" | "user_management" => Some(Role::UserManager),
            "event_manager" | "events_manager" => Some(Role::EventManager),
            "news_manager" | "news_editor" => Some(Role::NewsManager),
            "content_manager" => Some(Role::ContentManager),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Trim, lower-case and fold `-`/space into `_`.
pub fn normalize_role_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Normalized set of roles held by one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw role names; names outside the enumeration are dropped
    /// (they would grant nothing anyway).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            match Role::parse(name) {
                Some(role) => {
                    set.insert(role);
                }
                None => tracing::debug!(role = %name, "ignoring unrecognized role"),
            }
        }
        Self(set)
    }

    /// Merge the legacy single `role` field with the newer `roles` list.
    pub fn from_legacy(role: Option<&str>, roles: &[String]) -> Self {
        Self::from_names(role.into_iter().chain(roles.iter().map(String::as_str)))
    }

    pub fn insert(&mut self, role: Role) {
        self.0.insert(role);
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// The role a legacy single-role client should display.
    pub fn primary(&self) -> Option<Role> {
        self.0.iter().next().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roles = Vec::<Role>::deserialize(deserializer)?;
        Ok(roles.into_iter().collect())
    }
}

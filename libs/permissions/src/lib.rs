//! Role → capability table shared by every authorization boundary.
//!
//! Deny-by-default: a role outside the enumeration resolves to the empty set,
//! and an empty role set grants nothing.

mod capability;
mod role;

pub use capability::{Capability, CapabilitySet, UnknownCapability};
pub use role::{normalize_role_name, Role, RoleSet, UnknownRole};

/// Static capability set of a single role.
pub const fn capabilities_of(role: Role) -> CapabilitySet {
    use Capability::*;
    match role {
        Role::Admin => CapabilitySet::of(&[Users, Events, News, Settings]),
        Role::UserManager => CapabilitySet::of(&[Users]),
        Role::EventManager => CapabilitySet::of(&[Events]),
        Role::NewsManager => CapabilitySet::of(&[News]),
        Role::ContentManager => CapabilitySet::of(&[Events, News]),
        Role::Viewer => CapabilitySet::empty(),
    }
}

/// Union of the capability sets of every role held.
pub fn resolve(roles: &RoleSet) -> CapabilitySet {
    roles
        .iter()
        .fold(CapabilitySet::empty(), |acc, role| acc.union(capabilities_of(role)))
}

/// Resolve raw role names as they arrive from an identity provider.
pub fn resolve_names<I, S>(names: I) -> CapabilitySet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    resolve(&RoleSet::from_names(names))
}

pub fn authorize(roles: &RoleSet, capability: Capability) -> bool {
    resolve(roles).contains(capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_matches_union_of_role_sets() {
        for a in Role::ALL {
            for b in Role::ALL {
                let roles: RoleSet = [a, b].into_iter().collect();
                for cap in Capability::ALL {
                    let expected =
                        capabilities_of(a).contains(cap) || capabilities_of(b).contains(cap);
                    assert_eq!(authorize(&roles, cap), expected, "{a} + {b} / {cap}");
                }
            }
        }
    }

    #[test]
    fn unknown_roles_never_grant() {
        for cap in Capability::ALL {
            assert!(!resolve_names(["root", "superuser", ""]).contains(cap));
            assert!(!authorize(&RoleSet::new(), cap));
        }
    }

    #[test]
    fn viewer_is_intentionally_empty() {
        assert!(capabilities_of(Role::Viewer).is_empty());
        for role in Role::ALL.into_iter().filter(|r| *r != Role::Viewer) {
            assert!(!capabilities_of(role).is_empty(), "{role}");
        }
    }

    #[test]
    fn admin_holds_everything() {
        let caps = resolve_names(["administrator"]);
        assert_eq!(caps.len(), Capability::ALL.len());
    }
}

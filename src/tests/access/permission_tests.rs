use super::*;

#[test]
fn parses_and_normalizes_permission_strings() {
    let p: Permission = " Outlet:READ:Own ".parse().expect("valid permission");
    assert_eq!(p.resource(), "outlet");
    assert_eq!(p.action(), "read");
    assert_eq!(p.scope(), Scope::Own);
    assert_eq!(p.to_string(), "outlet:read:own");
    assert_eq!(Permission::new("USER", "Update", Scope::Any).to_string(), "user:update:any");
}

#[test]
fn rejects_malformed_permissions() {
    for raw in ["outlet:read", "outlet:read:own:extra", ":read:own", "outlet::any", ""] {
        assert!(
            matches!(raw.parse::<Permission>(), Err(PermissionParseError::Shape(_))),
            "{raw}"
        );
    }
    assert!(matches!(
        "outlet:read:all".parse::<Permission>(),
        Err(PermissionParseError::Scope(_))
    ));
}

#[test]
fn exact_match_is_case_insensitive() {
    let set = PermissionSet::new(["OUTLET:READ:OWN"]);
    assert!(set.has_permission("outlet:read:own"));
    assert!(set.has_permission("Outlet:Read:Own"));
    assert!(!set.has_permission("outlet:update:own"));
}

#[test]
fn any_scope_satisfies_own_but_not_the_reverse() {
    let any = PermissionSet::new(["user:read:any"]);
    assert!(any.has_permission("user:read:own"));
    assert!(any.has_permission("user:read:any"));

    let own = PermissionSet::new(["user:read:own"]);
    assert!(own.has_permission("user:read:own"));
    assert!(!own.has_permission("user:read:any"));
}

#[test]
fn fallback_never_crosses_resource_or_action() {
    let set = PermissionSet::new(["outlet:update:any"]);
    assert!(!set.has_permission("outlet:read:own"));
    assert!(!set.has_permission("user:update:own"));
    assert!(!set.has_permission("not-a-permission"));
}

#[test]
fn has_any_is_an_or_over_requirements() {
    let set = PermissionSet::new(["outlet:read:own"]);
    let required = vec!["outlet:read:any".to_string(), "outlet:read:own".to_string()];
    assert!(set.has_any(&required));
    assert!(!set.has_any(&["user:read:own".to_string()]));
    assert!(!set.has_any(&[]));
}

#[test]
fn nobody_signed_in_has_nothing() {
    let set = PermissionSet::for_user(None);
    assert!(set.is_empty());
    assert!(!set.has_permission("outlet:read:own"));
}

#[test]
fn blank_entries_are_dropped() {
    let set = PermissionSet::new(["", "  ", "role:read:any", "ROLE:READ:ANY"]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec!["role:read:any"]);
}

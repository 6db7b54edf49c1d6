use super::*;

fn table() -> RouteTable {
    RouteTable::standard().expect("standard routes compile")
}

#[test]
fn standard_table_follows_catalogue_order() {
    let table = table();
    assert_eq!(table.len(), AppRoute::ALL.len());
    let patterns: Vec<_> = table.iter().map(|r| r.pattern()).collect();
    assert_eq!(patterns[0], HOME_PATH);
    assert_eq!(patterns[1], "/dealer/:dealerId/mbo-management");
}

#[test]
fn patterns_are_anchored_and_segment_bound() {
    let table = table();
    let route = table
        .find("/dealer/d-1/mbo-management")
        .expect("mbo management matches");
    assert_eq!(route.pattern(), "/dealer/:dealerId/mbo-management");

    let details = table
        .find("/dealer/d-1/mbo-management/m-9")
        .expect("details match");
    assert_eq!(details.pattern(), "/dealer/:dealerId/mbo-management/:mboId");

    assert!(table.find("/dealer/d-1/mbo-management/m-9/extra").is_none());
    assert!(table.find("/prefix/dealer/d-1/users").is_none());
    assert!(table.find("/dealer//users").is_none());
    assert!(table.find("/dealer/a/b/users").is_none());
}

#[test]
fn literal_text_is_escaped() {
    let table = RouteTable::compile([("/reports/v1.0/:id", ["report:read:any"])])
        .expect("compile");
    assert!(table.find("/reports/v1.0/7").is_some());
    assert!(table.find("/reports/v1x0/7").is_none());
}

#[test]
fn own_scope_user_reaches_mbo_management() {
    let perms = PermissionSet::new(["outlet:read:own"]);
    let table = table();
    let resolver = PermissionResolver::new(&perms, &table);
    assert!(resolver.check_route_access("/dealer/d-1/mbo-management"));
    assert!(resolver.check_route_access("/dealer/d-1/outlet/o-2/details"));
    assert!(!resolver.check_route_access("/dealer/d-1/users"));
}

#[test]
fn home_and_unregistered_routes_are_open() {
    let perms = PermissionSet::default();
    let table = table();
    let resolver = PermissionResolver::new(&perms, &table);
    assert!(resolver.check_route_access(HOME_PATH));
    assert!(resolver.check_route_access(ROOT_PATH));
    assert!(resolver.check_route_access(""));
    assert!(resolver.check_route_access("/settings/profile"));
    assert!(!resolver.check_route_access("/dealer/d-1/mbo-management"));
}

#[test]
fn routes_without_requirements_are_open() {
    let table = RouteTable::compile([("/dealer/:dealerId/help", Vec::<String>::new())])
        .expect("compile");
    let perms = PermissionSet::default();
    let resolver = PermissionResolver::new(&perms, &table);
    assert!(resolver.check_route_access("/dealer/d-1/help"));
}

#[test]
fn user_without_permissions_keeps_only_home() {
    let perms = PermissionSet::default();
    let table = table();
    let resolver = PermissionResolver::new(&perms, &table);

    let nav = standard_nav_items("d-1");
    let allowed = resolver.authorized_routes(&nav);
    assert_eq!(allowed, vec![AppRoute::Home.nav_item(&[])]);
}

#[test]
fn home_is_moved_to_the_front() {
    let perms = PermissionSet::new(["user:read:any"]);
    let table = table();
    let resolver = PermissionResolver::new(&perms, &table);

    let nav = vec![
        AppRoute::UserManagement.nav_item(&["d-1"]),
        AppRoute::MboManagement.nav_item(&["d-1"]),
        AppRoute::Home.nav_item(&[]),
    ];
    let allowed = resolver.authorized_routes(&nav);
    let paths: Vec<_> = allowed.iter().map(|n| n.path.as_str()).collect();
    assert_eq!(paths, vec![HOME_PATH, "/dealer/d-1/users"]);
}

#[test]
fn first_authorized_route_is_home() {
    let perms = PermissionSet::default();
    let table = table();
    assert_eq!(
        PermissionResolver::new(&perms, &table).first_authorized_route(),
        HOME_PATH
    );
}

#[test]
fn route_paths_fill_named_segments() {
    assert_eq!(
        AppRoute::OutletDetails.path(&["d-1", "o-2"]),
        "/dealer/d-1/outlet/o-2/details"
    );
    assert_eq!(
        AppRoute::MboManagementDetails.path(&["d-1"]),
        "/dealer/d-1/mbo-management/:mboId"
    );
    assert_eq!(AppRoute::Home.path(&["ignored"]), HOME_PATH);
}

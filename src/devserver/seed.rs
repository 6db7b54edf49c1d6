//! Fixed fixtures the dev backend starts with.

use super::state::Account;
use super::tokens::now_ts;
use crate::model::{
    Address, Dealership, Outlet, OutletKind, PermissionRecord, Role, RoleSummary, User,
};

pub const DEALERSHIP_ID: &str = "d-1";
pub const MANAGER_OUTLET_ID: &str = "o-1";

pub const ADMIN_EMAIL: &str = "admin@mbo.dev";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const MANAGER_EMAIL: &str = "manager@mbo.dev";
pub const MANAGER_PASSWORD: &str = "manager123";
pub const VIEWER_EMAIL: &str = "viewer@mbo.dev";
pub const VIEWER_PASSWORD: &str = "viewer123";

const RESOURCES: [&str; 4] = ["outlet", "user", "role", "dealership"];
const ACTIONS: [&str; 4] = ["create", "read", "update", "delete"];
const SCOPES: [&str; 2] = ["own", "any"];

pub(super) fn permission_catalog() -> Vec<PermissionRecord> {
    let mut out = Vec::new();
    for resource in RESOURCES {
        for action in ACTIONS {
            for scope in SCOPES {
                out.push(PermissionRecord {
                    id: format!("p-{}-{}-{}", resource, action, scope),
                    name: format!("{}:{}:{}", resource, action, scope),
                    description: None,
                    resource: Some(resource.to_string()),
                    action: Some(action.to_string()),
                    scope: Some(scope.to_string()),
                });
            }
        }
    }
    out
}

fn role(id: &str, name: &str, description: &str, permissions: Vec<PermissionRecord>) -> Role {
    let ts = now_ts();
    Role {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        permissions,
        is_active: true,
        is_system: Some(true),
        created_at: ts.clone(),
        updated_at: ts,
    }
}

pub(super) fn roles(catalog: &[PermissionRecord]) -> Vec<Role> {
    let pick = |names: &[&str]| -> Vec<PermissionRecord> {
        catalog
            .iter()
            .filter(|p| names.contains(&p.name.as_str()))
            .cloned()
            .collect()
    };
    let any_scoped = catalog
        .iter()
        .filter(|p| p.scope.as_deref() == Some("any"))
        .cloned()
        .collect();

    vec![
        role("r-1", "dealer_admin", "Full dealership access", any_scoped),
        role(
            "r-2",
            "outlet_manager",
            "Manages the outlets it is assigned to",
            pick(&["outlet:read:own", "outlet:update:own"]),
        ),
        role("r-3", "viewer", "Signed in, nothing else", Vec::new()),
    ]
}

fn user(id: &str, name: &str, email: &str, role_id: &str, outlet_id: Option<&str>) -> User {
    let ts = now_ts();
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role_id: role_id.to_string(),
        dealership_id: DEALERSHIP_ID.to_string(),
        outlet_id: outlet_id.map(str::to_string),
        phone: None,
        role: None,
        is_active: true,
        created_at: ts.clone(),
        updated_at: ts,
    }
}

pub(super) fn accounts() -> Vec<Account> {
    vec![
        Account {
            user: user("u-1", "Dealer Admin", ADMIN_EMAIL, "r-1", None),
            password: ADMIN_PASSWORD.to_string(),
        },
        Account {
            user: user(
                "u-2",
                "Outlet Manager",
                MANAGER_EMAIL,
                "r-2",
                Some(MANAGER_OUTLET_ID),
            ),
            password: MANAGER_PASSWORD.to_string(),
        },
        Account {
            user: user("u-3", "Read Only", VIEWER_EMAIL, "r-3", None),
            password: VIEWER_PASSWORD.to_string(),
        },
    ]
}

fn outlet(id: &str, name: &str, kind: OutletKind, city: &str) -> Outlet {
    let ts = now_ts();
    Outlet {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        address: Address {
            street: "1 Ring Road".to_string(),
            city: city.to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            country: "India".to_string(),
        },
        dealership_id: DEALERSHIP_ID.to_string(),
        status: "ACTIVE".to_string(),
        credit_limit: 500_000.0,
        security_deposit: 50_000.0,
        contact_person: None,
        contact_phone: None,
        contact_email: None,
        approval_status: "APPROVED".to_string(),
        is_active: true,
        created_at: ts.clone(),
        updated_at: ts,
    }
}

pub(super) fn outlets() -> Vec<Outlet> {
    vec![
        outlet(MANAGER_OUTLET_ID, "Indiranagar MBO", OutletKind::Mbo, "Bengaluru"),
        outlet("o-2", "Whitefield MBO", OutletKind::Mbo, "Bengaluru"),
        outlet("o-3", "Hosur Distribution", OutletKind::Distributor, "Hosur"),
    ]
}

pub(super) fn dealerships() -> Vec<Dealership> {
    let ts = now_ts();
    vec![Dealership {
        id: DEALERSHIP_ID.to_string(),
        name: "Sterling Motors".to_string(),
        gst_number: "29ABCDE1234F1Z5".to_string(),
        pan_number: "ABCDE1234F".to_string(),
        address: "12 MG Road".to_string(),
        city: Some("Bengaluru".to_string()),
        state: Some("Karnataka".to_string()),
        pincode: Some("560001".to_string()),
        country: Some("India".to_string()),
        contact_phone: "+91 80 1234 5678".to_string(),
        contact_email: "contact@sterling.example".to_string(),
        is_active: true,
        created_at: ts.clone(),
        updated_at: ts,
    }]
}

pub(super) fn role_summary(role: &Role) -> RoleSummary {
    RoleSummary {
        id: role.id.clone(),
        name: role.name.clone(),
        description: role.description.clone(),
    }
}

use anyhow::{Context, Result};

use mbo_console::access::{
    GuardDecision, LOGIN_PATH, PermissionResolver, RouteTable, protected_route,
    standard_nav_items,
};

use super::{Console, print_json};

pub(super) fn can(console: &Console, permission: &str) -> Result<()> {
    let snap = console.controller().snapshot();
    let allowed = snap.permissions().has_permission(permission);
    println!("{}", if allowed { "yes" } else { "no" });
    Ok(())
}

pub(super) fn routes(console: &Console, dealer: Option<String>, json: bool) -> Result<()> {
    let snap = console.controller().snapshot();
    let dealer = dealer
        .or_else(|| snap.user.as_ref().and_then(|u| u.dealership_id.clone()))
        .context("no dealership on the signed-in user (pass --dealer)")?;

    let permissions = snap.permissions();
    let table = RouteTable::standard()?;
    let resolver = PermissionResolver::new(&permissions, &table);
    let allowed = resolver.authorized_routes(&standard_nav_items(&dealer));

    if json {
        return print_json(&allowed, "routes");
    }
    for item in allowed {
        println!("{:<16} {}", item.label, item.path);
    }
    Ok(())
}

pub(super) fn check(console: &Console, path: &str, json: bool) -> Result<()> {
    let snap = console.controller().snapshot();
    let permissions = snap.permissions();
    let table = RouteTable::standard()?;
    let resolver = PermissionResolver::new(&permissions, &table);
    let decision = protected_route(&snap, &resolver, LOGIN_PATH, path);

    if json {
        return print_json(&decision, "decision");
    }
    match decision {
        GuardDecision::Wait => println!("wait"),
        GuardDecision::Render => println!("render {}", path),
        GuardDecision::Redirect { to, return_to } => match return_to {
            Some(back) => println!("redirect {} (return to {})", to, back),
            None => println!("redirect {}", to),
        },
    }
    Ok(())
}

use anyhow::{Context, Result};

use mbo_console::model::RegisterRequest;

use super::{Console, print_json};

pub(super) async fn login(console: &Console, email: &str, password: &str, json: bool) -> Result<()> {
    let user = console
        .controller()
        .login(email, password)
        .await
        .context("login")?;
    if json {
        print_json(&user, "user")?;
    } else {
        println!("Logged in as {} ({})", user.name, user.role);
    }
    Ok(())
}

pub(super) async fn logout(console: &Console) -> Result<()> {
    let was_signed_in = console.controller().snapshot().is_authenticated();
    console.controller().logout().await;
    let snap = console.controller().snapshot();
    match (&snap.error, was_signed_in) {
        (Some(err), _) => println!("Logged out locally ({})", err),
        (None, true) => println!("Logged out"),
        (None, false) => println!("Not logged in"),
    }
    Ok(())
}

pub(super) fn whoami(console: &Console, json: bool) -> Result<()> {
    let snap = console.controller().snapshot();
    if json {
        return print_json(&snap, "session");
    }
    match (&snap.user, snap.is_authenticated()) {
        (Some(user), true) => {
            println!("{} <{}>", user.name, user.email);
            println!("role: {}", user.role);
            if let Some(dealership) = &user.dealership_id {
                println!("dealership: {}", dealership);
            }
            if let Some(outlet) = &user.outlet_id {
                println!("outlet: {}", outlet);
            }
            println!("permissions: {}", user.permissions.len());
        }
        _ => println!("Not logged in"),
    }
    Ok(())
}

pub(super) async fn refresh(console: &Console) -> Result<()> {
    let service = console.controller().service();
    service.refresh().await.context("refresh access token")?;
    println!("Access token refreshed");
    Ok(())
}

pub(super) async fn register(console: &Console, req: &RegisterRequest, json: bool) -> Result<()> {
    let user = console
        .controller()
        .register(req)
        .await
        .context("register")?;
    if json {
        print_json(&user, "user")?;
    } else {
        println!("Registered {} <{}> as {}", user.name, user.email, user.role);
        if let Some(next) = console.history().current() {
            println!("Next: sign in at {}", next);
        }
    }
    Ok(())
}

use anyhow::{Context, Result};

use mbo_console::client::RequestOptions;
use mbo_console::model::Pagination;
use mbo_console::resources::{DealershipsApi, OutletsApi, PageRequest, RolesApi, UsersApi};

use super::{Console, print_json};
use crate::{DealershipCommands, OutletCommands, PageArgs, RoleCommands, UserCommands};

fn page_request(args: &PageArgs) -> PageRequest {
    PageRequest::new(args.page, args.page_size)
}

fn print_pagination(p: &Pagination) {
    println!("page {}/{} ({} total)", p.page, p.total_pages.max(1), p.total);
}

pub(super) async fn users(console: &Console, command: UserCommands) -> Result<()> {
    let api = UsersApi::new(console.client().clone());
    match command {
        UserCommands::List(args) => {
            let page = api.list(page_request(&args)).await.context("list users")?;
            if args.json {
                return print_json(&page, "users");
            }
            for u in &page.data {
                let role = u.role.as_ref().map(|r| r.name.as_str()).unwrap_or("-");
                println!("{} {} <{}> {}", u.id, u.name, u.email, role);
            }
            print_pagination(&page.pagination);
        }
        UserCommands::Get { id, json } => {
            let u = api.get(&id).await.context("get user")?;
            if json {
                return print_json(&u, "user");
            }
            println!("id: {}", u.id);
            println!("name: {}", u.name);
            println!("email: {}", u.email);
            println!("role: {}", u.role_id);
            println!("dealership: {}", u.dealership_id);
            if let Some(outlet) = &u.outlet_id {
                println!("outlet: {}", outlet);
            }
            println!("active: {}", u.is_active);
        }
    }
    Ok(())
}

pub(super) async fn roles(console: &Console, command: RoleCommands) -> Result<()> {
    let api = RolesApi::new(console.client().clone());
    match command {
        RoleCommands::List { page, permissions } => {
            let out = api
                .list(page_request(&page), permissions)
                .await
                .context("list roles")?;
            if page.json {
                return print_json(&out, "roles");
            }
            for r in &out.data {
                println!("{} {} - {}", r.id, r.name, r.description);
                for p in &r.permissions {
                    println!("    {}", p.name);
                }
            }
            print_pagination(&out.pagination);
        }
        RoleCommands::Get { id, json } => {
            let r = api.get(&id).await.context("get role")?;
            if json {
                return print_json(&r, "role");
            }
            println!("id: {}", r.id);
            println!("name: {}", r.name);
            println!("description: {}", r.description);
            println!("permissions:");
            for p in &r.permissions {
                println!("  {}", p.name);
            }
        }
    }
    Ok(())
}

pub(super) async fn outlets(console: &Console, command: OutletCommands) -> Result<()> {
    let api = OutletsApi::new(console.client().clone());
    match command {
        OutletCommands::List(args) => {
            let page = api
                .list_mbo(page_request(&args))
                .await
                .context("list outlets")?;
            if args.json {
                return print_json(&page, "outlets");
            }
            for o in &page.data {
                println!("{} {} ({}) {}", o.id, o.name, o.address.city, o.status);
            }
            print_pagination(&page.pagination);
        }
        OutletCommands::Get { id, json } => {
            let o = api.get(&id).await.context("get outlet")?;
            if json {
                return print_json(&o, "outlet");
            }
            println!("id: {}", o.id);
            println!("name: {}", o.name);
            println!("type: {}", o.kind.as_query());
            println!("city: {}", o.address.city);
            println!("status: {}", o.status);
            println!("approval: {}", o.approval_status);
        }
    }
    Ok(())
}

pub(super) async fn dealerships(console: &Console, command: DealershipCommands) -> Result<()> {
    let api = DealershipsApi::new(console.client().clone());
    match command {
        DealershipCommands::List(args) => {
            let page = api
                .list(page_request(&args))
                .await
                .context("list dealerships")?;
            if args.json {
                return print_json(&page, "dealerships");
            }
            for d in &page.data {
                println!("{} {}", d.id, d.name);
            }
            print_pagination(&page.pagination);
        }
        DealershipCommands::Get { id, json } => {
            let d = api.get(&id).await.context("get dealership")?;
            if json {
                return print_json(&d, "dealership");
            }
            println!("id: {}", d.id);
            println!("name: {}", d.name);
            println!("gst: {}", d.gst_number);
            println!("contact: {} {}", d.contact_email, d.contact_phone);
        }
    }
    Ok(())
}

pub(super) async fn raw_get(console: &Console, path: &str) -> Result<()> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    let resp = console
        .client()
        .get(&path, RequestOptions::default())
        .await
        .with_context(|| format!("GET {}", path))?;
    let value = resp.value()?;
    print_json(&value, "response")
}

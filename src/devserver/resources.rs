//! Bearer-protected resource handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::http_error::{bad_request, conflict, not_found};
use super::seed::{DEALERSHIP_ID, role_summary};
use super::state::{Account, DevState};
use super::tokens::now_ts;
use crate::model::{
    Envelope, NewRole, NewUser, Outlet, Paginated, Pagination, Role, RoleUpdate, User,
    UserUpdate,
};
use crate::resources::DEFAULT_PAGE_SIZE;

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListQuery {
    page: Option<u32>,
    page_size: Option<u32>,

    #[serde(rename = "type")]
    kind: Option<String>,

    include_permissions: Option<bool>,
}

fn paginate<T>(items: Vec<T>, q: &ListQuery) -> Paginated<T> {
    let page = q.page.unwrap_or(1).max(1);
    let page_size = q
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let total = items.len() as u64;
    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let data = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();
    Paginated {
        status: "success".to_string(),
        data,
        pagination: Pagination::for_total(total, page, page_size),
    }
}

fn single<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(Envelope::success(data))).into_response()
}

fn deleted(what: &str) -> Response {
    Json(serde_json::json!({"status": "success", "message": format!("{} deleted", what)}))
        .into_response()
}

async fn with_role(state: &DevState, mut user: User) -> User {
    user.role = state.roles.read().await.get(&user.role_id).map(role_summary);
    user
}

pub(super) async fn list_users(
    State(state): State<Arc<DevState>>,
    Query(q): Query<ListQuery>,
) -> Response {
    let users: Vec<User> = {
        let accounts = state.accounts.read().await;
        accounts.values().map(|a| a.user.clone()).collect()
    };
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        out.push(with_role(&state, user).await);
    }
    Json(paginate(out, &q)).into_response()
}

pub(super) async fn get_user(State(state): State<Arc<DevState>>, Path(id): Path<String>) -> Response {
    let user = state.accounts.read().await.get(&id).map(|a| a.user.clone());
    match user {
        Some(user) => single(StatusCode::OK, with_role(&state, user).await),
        None => not_found("user"),
    }
}

pub(super) async fn create_user(
    State(state): State<Arc<DevState>>,
    Json(body): Json<NewUser>,
) -> Response {
    if !state.roles.read().await.contains_key(&body.role_id) {
        return bad_request(&format!("unknown role {}", body.role_id));
    }
    let user = {
        let mut accounts = state.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.user.email.eq_ignore_ascii_case(body.email.trim()))
        {
            return conflict("User already exists");
        }
        let ts = now_ts();
        let user = User {
            id: state.next_id("u"),
            name: body.name,
            email: body.email.trim().to_string(),
            role_id: body.role_id,
            dealership_id: DEALERSHIP_ID.to_string(),
            outlet_id: body.outlet_id,
            phone: body.phone,
            role: None,
            is_active: true,
            created_at: ts.clone(),
            updated_at: ts,
        };
        accounts.insert(
            user.id.clone(),
            Account {
                user: user.clone(),
                password: body.password,
            },
        );
        user
    };
    single(StatusCode::CREATED, with_role(&state, user).await)
}

pub(super) async fn update_user(
    State(state): State<Arc<DevState>>,
    Path(id): Path<String>,
    Json(body): Json<UserUpdate>,
) -> Response {
    let user = {
        let mut accounts = state.accounts.write().await;
        let Some(account) = accounts.get_mut(&id) else {
            return not_found("user");
        };
        let user = &mut account.user;
        if let Some(name) = body.name {
            user.name = name;
        }
        if let Some(email) = body.email {
            user.email = email;
        }
        if let Some(role_id) = body.role_id {
            user.role_id = role_id;
        }
        if let Some(outlet_id) = body.outlet_id {
            user.outlet_id = Some(outlet_id);
        }
        if let Some(phone) = body.phone {
            user.phone = Some(phone);
        }
        if let Some(active) = body.is_active {
            user.is_active = active;
        }
        user.updated_at = now_ts();
        user.clone()
    };
    single(StatusCode::OK, with_role(&state, user).await)
}

pub(super) async fn delete_user(
    State(state): State<Arc<DevState>>,
    Path(id): Path<String>,
) -> Response {
    match state.accounts.write().await.remove(&id) {
        Some(_) => deleted("User"),
        None => not_found("user"),
    }
}

pub(super) async fn list_roles(
    State(state): State<Arc<DevState>>,
    Query(q): Query<ListQuery>,
) -> Response {
    let include_permissions = q.include_permissions.unwrap_or(false);
    let roles: Vec<Role> = state
        .roles
        .read()
        .await
        .values()
        .cloned()
        .map(|mut r| {
            if !include_permissions {
                r.permissions.clear();
            }
            r
        })
        .collect();
    Json(paginate(roles, &q)).into_response()
}

pub(super) async fn get_role(State(state): State<Arc<DevState>>, Path(id): Path<String>) -> Response {
    match state.roles.read().await.get(&id) {
        Some(role) => single(StatusCode::OK, role.clone()),
        None => not_found("role"),
    }
}

pub(super) async fn create_role(
    State(state): State<Arc<DevState>>,
    Json(body): Json<NewRole>,
) -> Response {
    if body.name.trim().is_empty() {
        return bad_request("role name is required");
    }
    let mut roles = state.roles.write().await;
    if roles.values().any(|r| r.name == body.name) {
        return conflict("Role already exists");
    }
    let ts = now_ts();
    let role = Role {
        id: state.next_id("r"),
        name: body.name,
        description: body.description,
        permissions: state.permissions_by_id(&body.permission_ids),
        is_active: true,
        is_system: Some(false),
        created_at: ts.clone(),
        updated_at: ts,
    };
    roles.insert(role.id.clone(), role.clone());
    single(StatusCode::CREATED, role)
}

pub(super) async fn update_role(
    State(state): State<Arc<DevState>>,
    Path(id): Path<String>,
    Json(body): Json<RoleUpdate>,
) -> Response {
    let mut roles = state.roles.write().await;
    let Some(role) = roles.get_mut(&id) else {
        return not_found("role");
    };
    if let Some(name) = body.name {
        role.name = name;
    }
    if let Some(description) = body.description {
        role.description = description;
    }
    if let Some(ids) = body.permission_ids {
        role.permissions = state.permissions_by_id(&ids);
    }
    if let Some(active) = body.is_active {
        role.is_active = active;
    }
    role.updated_at = now_ts();
    single(StatusCode::OK, role.clone())
}

pub(super) async fn delete_role(
    State(state): State<Arc<DevState>>,
    Path(id): Path<String>,
) -> Response {
    let mut roles = state.roles.write().await;
    match roles.get(&id) {
        None => return not_found("role"),
        Some(role) if role.is_system == Some(true) => {
            return bad_request("system roles cannot be deleted");
        }
        Some(_) => {}
    }
    roles.remove(&id);
    deleted("Role")
}

pub(super) async fn list_outlets(
    State(state): State<Arc<DevState>>,
    Query(q): Query<ListQuery>,
) -> Response {
    let outlets: Vec<Outlet> = state
        .outlets
        .read()
        .await
        .iter()
        .filter(|o| {
            q.kind
                .as_deref()
                .is_none_or(|k| o.kind.as_query().eq_ignore_ascii_case(k))
        })
        .cloned()
        .collect();
    Json(paginate(outlets, &q)).into_response()
}

pub(super) async fn get_outlet(
    State(state): State<Arc<DevState>>,
    Path(id): Path<String>,
) -> Response {
    match state.outlets.read().await.iter().find(|o| o.id == id) {
        Some(outlet) => single(StatusCode::OK, outlet.clone()),
        None => not_found("outlet"),
    }
}

pub(super) async fn list_dealerships(
    State(state): State<Arc<DevState>>,
    Query(q): Query<ListQuery>,
) -> Response {
    let dealerships = state.dealerships.read().await.clone();
    Json(paginate(dealerships, &q)).into_response()
}

pub(super) async fn get_dealership(
    State(state): State<Arc<DevState>>,
    Path(id): Path<String>,
) -> Response {
    match state.dealerships.read().await.iter().find(|d| d.id == id) {
        Some(dealership) => single(StatusCode::OK, dealership.clone()),
        None => not_found("dealership"),
    }
}

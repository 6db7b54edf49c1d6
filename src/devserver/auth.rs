//! `/auth/*` handlers and the request middleware.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::http_error::{bad_request, conflict, internal_error, unauthorized};
use super::state::{Account, DevState};
use super::tokens::{
    bearer_token, expired_refresh_cookie, now_ts, refresh_cookie, set_refresh_cookie,
};
use crate::model::{Envelope, LoginData, LoginRequest, RegisterRequest, User};

pub(super) async fn count_requests(
    State(state): State<Arc<DevState>>,
    req: Request,
    next: Next,
) -> Response {
    state.count_request();
    next.run(req).await
}

pub(super) async fn require_bearer(
    State(state): State<Arc<DevState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_string) else {
        return unauthorized("Access token required");
    };
    if state.access_subject(&token).await.is_none() {
        return unauthorized("Access token expired");
    }
    next.run(req).await
}

pub(super) async fn login(
    State(state): State<Arc<DevState>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    state.count_login();

    let user = {
        let accounts = state.accounts.read().await;
        accounts
            .values()
            .find(|a| {
                a.user.is_active
                    && a.user.email.eq_ignore_ascii_case(body.email.trim())
                    && a.password == body.password
            })
            .map(|a| a.user.clone())
    };
    let Some(user) = user else {
        return unauthorized("Invalid credentials");
    };

    let access_token = match state.issue_access_token(&user.id).await {
        Ok(t) => t,
        Err(err) => return internal_error(err),
    };
    let refresh_secret = match state.issue_refresh_token(&user.id).await {
        Ok(t) => t,
        Err(err) => return internal_error(err),
    };
    let profile = state.profile(&user).await;
    tracing::debug!(user = %user.email, "dev login");

    (
        [(header::SET_COOKIE, set_refresh_cookie(&refresh_secret))],
        Json(Envelope::success(LoginData {
            access_token,
            refresh_token: None,
            user: profile,
        })),
    )
        .into_response()
}

pub(super) async fn refresh_token(State(state): State<Arc<DevState>>, headers: HeaderMap) -> Response {
    state.count_refresh();

    let delay = state.refresh_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if state.refresh_fails() {
        return unauthorized("Invalid refresh token");
    }

    let Some(secret) = refresh_cookie(&headers) else {
        return unauthorized("Refresh token missing");
    };
    let Some(user_id) = state.refresh_subject(&secret).await else {
        return unauthorized("Invalid refresh token");
    };
    let access_token = match state.issue_access_token(&user_id).await {
        Ok(t) => t,
        Err(err) => return internal_error(err),
    };

    let body = if state.flat_refresh_response() {
        serde_json::json!({"accessToken": access_token})
    } else {
        serde_json::json!({"status": "success", "data": {"accessToken": access_token}})
    };
    Json(body).into_response()
}

/// Always succeeds; whatever credentials came along are revoked.
pub(super) async fn logout(State(state): State<Arc<DevState>>, headers: HeaderMap) -> Response {
    if let Some(secret) = refresh_cookie(&headers) {
        state.revoke_refresh(&secret).await;
    }
    if let Some(token) = bearer_token(&headers) {
        state.revoke_access(token).await;
    }
    (
        [(header::SET_COOKIE, expired_refresh_cookie())],
        Json(serde_json::json!({"status": "success", "message": "Logged out"})),
    )
        .into_response()
}

pub(super) async fn register(
    State(state): State<Arc<DevState>>,
    Json(body): Json<RegisterRequest>,
) -> Response {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return bad_request("email and password are required");
    }

    let role_id = {
        let roles = state.roles.read().await;
        roles
            .values()
            .find(|r| r.name == body.role_name)
            .map(|r| r.id.clone())
    };
    let Some(role_id) = role_id else {
        return bad_request(&format!("unknown role {}", body.role_name));
    };

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
            name: body.name.clone(),
            email: body.email.trim().to_string(),
            role_id,
            dealership_id: body.dealership_id.clone(),
            outlet_id: body.outlet_id.clone(),
            phone: None,
            role: None,
            is_active: true,
            created_at: ts.clone(),
            updated_at: ts,
        };
        accounts.insert(
            user.id.clone(),
            Account {
                user: user.clone(),
                password: body.password.clone(),
            },
        );
        user
    };

    let profile = state.profile(&user).await;
    (StatusCode::CREATED, Json(Envelope::success(profile))).into_response()
}

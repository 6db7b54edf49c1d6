//! Session and access layer for the MBO dealership dashboard.
//!
//! [`client::ApiClient`] carries every backend call and recovers from an
//! expired access token with a single shared refresh.
//! [`session::SessionController`] owns the authentication state and
//! [`access`] decides which pages the signed-in user is offered.
//!
//! Route and permission filtering here is for presentation only. It hides
//! pages a user cannot use; it does not protect anything. The backend
//! authorizes every request on its own.

pub mod access;
pub mod client;
pub mod credentials;
pub mod devserver;
pub mod endpoints;
pub mod model;
pub mod resources;
pub mod session;
pub mod store;

//! Typed wrappers over [`ApiClient`] for the dealership resource endpoints.
//!
//! Every call goes through the client core, so the logged-out gate and the
//! refresh-on-401 behaviour apply here unchanged.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::{ApiClient, ApiError, RequestOptions};
use crate::model::{Envelope, Paginated};

mod dealerships;
mod outlets;
mod roles;
mod users;

pub use self::dealerships::DealershipsApi;
pub use self::outlets::OutletsApi;
pub use self::roles::RolesApi;
pub use self::users::UsersApi;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page of a list endpoint. Pages are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub(crate) fn options(self) -> RequestOptions {
        RequestOptions::default()
            .with_query("page", self.page)
            .with_query("pageSize", self.page_size)
    }
}

async fn fetch_page<T: DeserializeOwned>(
    client: &ApiClient,
    path: &str,
    options: RequestOptions,
) -> Result<Paginated<T>, ApiError> {
    client.get_json(path, options).await
}

async fn fetch_one<T: DeserializeOwned>(client: &ApiClient, path: &str) -> Result<T, ApiError> {
    let env: Envelope<T> = client.get_json(path, RequestOptions::default()).await?;
    Ok(env.data)
}

async fn send_one<B: Serialize, T: DeserializeOwned>(
    client: &ApiClient,
    method: Method,
    path: &str,
    body: &B,
) -> Result<T, ApiError> {
    let env: Envelope<T> = client
        .send_json(method, path, body, RequestOptions::default())
        .await?;
    Ok(env.data)
}

async fn delete_one(client: &ApiClient, path: &str) -> Result<(), ApiError> {
    client.delete(path, RequestOptions::default()).await?;
    Ok(())
}

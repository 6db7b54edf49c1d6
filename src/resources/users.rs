use reqwest::Method;

use super::{PageRequest, delete_one, fetch_one, fetch_page, send_one};
use crate::client::{ApiClient, ApiError};
use crate::endpoints;
use crate::model::{NewUser, Paginated, User, UserUpdate};

#[derive(Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Paginated<User>, ApiError> {
        fetch_page(&self.client, endpoints::USERS, page.options()).await
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        fetch_one(&self.client, &endpoints::user(id)).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        send_one(&self.client, Method::POST, endpoints::USERS, user).await
    }

    pub async fn update(&self, id: &str, update: &UserUpdate) -> Result<User, ApiError> {
        send_one(&self.client, Method::PUT, &endpoints::user(id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        delete_one(&self.client, &endpoints::user(id)).await
    }
}

use reqwest::Method;

use super::{PageRequest, delete_one, fetch_one, fetch_page, send_one};
use crate::client::{ApiClient, ApiError};
use crate::endpoints;
use crate::model::{NewRole, Paginated, Role, RoleUpdate};

#[derive(Clone)]
pub struct RolesApi {
    client: ApiClient,
}

impl RolesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// With `include_permissions` each role carries its permission records.
    pub async fn list(
        &self,
        page: PageRequest,
        include_permissions: bool,
    ) -> Result<Paginated<Role>, ApiError> {
        let mut options = page.options();
        if include_permissions {
            options = options.with_query("includePermissions", true);
        }
        fetch_page(&self.client, endpoints::ROLES, options).await
    }

    pub async fn get(&self, id: &str) -> Result<Role, ApiError> {
        fetch_one(&self.client, &endpoints::role(id)).await
    }

    pub async fn create(&self, role: &NewRole) -> Result<Role, ApiError> {
        send_one(&self.client, Method::POST, endpoints::ROLES, role).await
    }

    pub async fn update(&self, id: &str, update: &RoleUpdate) -> Result<Role, ApiError> {
        send_one(&self.client, Method::PUT, &endpoints::role(id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        delete_one(&self.client, &endpoints::role(id)).await
    }
}

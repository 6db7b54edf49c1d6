use super::{PageRequest, fetch_one, fetch_page};
use crate::client::{ApiClient, ApiError};
use crate::endpoints;
use crate::model::{Outlet, OutletKind, Paginated};

#[derive(Clone)]
pub struct OutletsApi {
    client: ApiClient,
}

impl OutletsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// MBO outlets only; distributors are not managed from the dashboard.
    pub async fn list_mbo(&self, page: PageRequest) -> Result<Paginated<Outlet>, ApiError> {
        let options = page
            .options()
            .with_query("type", OutletKind::Mbo.as_query());
        fetch_page(&self.client, endpoints::OUTLETS, options).await
    }

    pub async fn get(&self, id: &str) -> Result<Outlet, ApiError> {
        fetch_one(&self.client, &endpoints::outlet(id)).await
    }
}

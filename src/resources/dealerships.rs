use super::{PageRequest, fetch_one, fetch_page};
use crate::client::{ApiClient, ApiError};
use crate::endpoints;
use crate::model::{Dealership, Paginated};

#[derive(Clone)]
pub struct DealershipsApi {
    client: ApiClient,
}

impl DealershipsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Paginated<Dealership>, ApiError> {
        fetch_page(&self.client, endpoints::DEALERSHIPS, page.options()).await
    }

    pub async fn get(&self, id: &str) -> Result<Dealership, ApiError> {
        fetch_one(&self.client, &endpoints::dealership(id)).await
    }
}

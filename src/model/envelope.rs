//! Response envelopes shared by every backend endpoint.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: String,

    pub data: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
            message: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub status: String,

    pub data: Vec<T>,

    pub pagination: Pagination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn for_total(total: u64, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(u64::from(page_size)) as u32;
        Self {
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "get_default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: i64,
    #[serde(default = "get_default_page_size")]
    #[validate(range(min = 1, max = 100, message = "pageSize must be between 1 and 100"))]
    pub page_size: i64,
}

impl PageQuery {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total_items: i64) -> i64 {
        if total_items <= 0 {
            return 0;
        }
        (total_items + self.page_size - 1) / self.page_size
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            page: get_default_page(),
            page_size: get_default_page_size(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentFilter {
    #[serde(default)]
    pub audio_record_id: Option<i64>,
    #[serde(default)]
    pub post_id: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessageFilter {
    #[serde(default)]
    pub receiver_id: Option<i64>,
}

fn get_default_page() -> i64 {
    1
}

fn get_default_page_size() -> i64 {
    10
}

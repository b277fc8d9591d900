use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::PageQuery;

/// Page envelope shared by every list endpoint.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedListResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> PagedListResponse<T> {
    pub fn new(items: Vec<T>, query: PageQuery, total_items: i64) -> Self {
        PagedListResponse {
            items,
            page: query.page,
            page_size: query.page_size,
            total_items,
            total_pages: query.total_pages(total_items),
        }
    }

    pub fn map_from<R>(rows: Vec<R>, query: PageQuery, total_items: i64) -> Self
    where
        T: From<R>,
    {
        Self::new(rows.into_iter().map(T::from).collect(), query, total_items)
    }
}

/// An empty page is answered with 204 and no body.
impl<T: Serialize> IntoResponse for PagedListResponse<T> {
    fn into_response(self) -> Response {
        if self.items.is_empty() {
            return StatusCode::NO_CONTENT.into_response();
        }
        Json(self).into_response()
    }
}

/// 201 with a `Location` header pointing at the new resource.
#[derive(Debug)]
pub struct Created<T> {
    pub location: String,
    pub body: T,
}

impl<T> Created<T> {
    pub fn at(location: String, body: T) -> Self {
        Created { location, body }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            [(header::LOCATION, self.location)],
            Json(self.body),
        )
            .into_response()
    }
}

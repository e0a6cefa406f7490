// src/common/envelope.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The uniform response shape every endpoint returns, success or failure.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Success with no payload (delete, logout, etc.).
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(code.to_string()),
        }
    }
}

/// Standard pagination query parameters (`?page=1&perPage=20&q=foo`).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
}

impl PageQuery {
    pub fn limit(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page.unwrap_or(1).max(1) - 1) * self.limit()
    }
}

/// One page of results plus enough metadata for the client to paginate.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, query: &PageQuery, total: i64) -> Self {
        Self {
            items,
            page: query.page.unwrap_or(1).max(1),
            per_page: query.limit(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_carries_data_and_null_error() {
        let body = serde_json::to_value(ApiResponse::ok("done", json!({"id": 1}))).unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("done"));
        assert_eq!(body["data"]["id"], json!(1));
        assert_eq!(body["error"], json!(null));
    }

    #[test]
    fn failure_envelope_carries_code_and_null_data() {
        let body = serde_json::to_value(ApiResponse::failure("nope", "NOT_FOUND")).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["data"], json!(null));
        assert_eq!(body["error"], json!("NOT_FOUND"));
    }

    #[test]
    fn page_query_defaults_and_clamping() {
        let q = PageQuery { page: None, per_page: None, q: None };
        assert_eq!(q.limit(), 20);
        assert_eq!(q.offset(), 0);

        let q = PageQuery { page: Some(3), per_page: Some(500), q: None };
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 200);

        let q = PageQuery { page: Some(0), per_page: Some(0), q: None };
        assert_eq!(q.limit(), 1);
        assert_eq!(q.offset(), 0);
    }
}

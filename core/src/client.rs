//! Stateless HTTP request builder and response parser for the property API.
//!
//! # Design
//! `PropertyClient` holds only a `base_url`. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the round-trip.
//!
//! The server mounts list and delete under `/api/properties` and the rest
//! under `/properties`; the client mirrors that layout exactly.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{MessageBody, Property, PropertyFields, UpdateGroup};

/// Synchronous, stateless client for the property API.
#[derive(Debug, Clone)]
pub struct PropertyClient {
    base_url: String,
}

impl PropertyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /api/properties`, optionally narrowed by a full-text search term.
    pub fn build_list_properties(&self, search_term: Option<&str>) -> HttpRequest {
        let mut path = format!("{}/api/properties", self.base_url);
        if let Some(term) = search_term.filter(|t| !t.trim().is_empty()) {
            path.push_str("?searchTerm=");
            path.push_str(&urlencoding::encode(term));
        }
        HttpRequest::without_body(HttpMethod::Get, path)
    }

    pub fn build_group_properties(&self) -> HttpRequest {
        HttpRequest::without_body(
            HttpMethod::Get,
            format!("{}/properties/groups", self.base_url),
        )
    }

    pub fn build_get_property(&self, id: &str) -> HttpRequest {
        HttpRequest::without_body(HttpMethod::Get, self.property_path(id))
    }

    pub fn build_create_property(&self, input: &PropertyFields) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(HttpRequest::with_json(
            HttpMethod::Post,
            format!("{}/properties", self.base_url),
            body,
        ))
    }

    pub fn build_update_group(&self, id: &str, group: &str) -> Result<HttpRequest, ApiError> {
        let body = to_json(&UpdateGroup {
            group: group.to_string(),
        })?;
        Ok(HttpRequest::with_json(
            HttpMethod::Put,
            self.property_path(id),
            body,
        ))
    }

    pub fn build_delete_property(&self, id: &str) -> HttpRequest {
        HttpRequest::without_body(
            HttpMethod::Delete,
            format!("{}/api/properties/{}", self.base_url, urlencoding::encode(id)),
        )
    }

    pub fn parse_list_properties(&self, response: HttpResponse) -> Result<Vec<Property>, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_group_properties(
        &self,
        response: HttpResponse,
    ) -> Result<BTreeMap<String, Vec<Property>>, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_get_property(&self, response: HttpResponse) -> Result<Property, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_create_property(&self, response: HttpResponse) -> Result<Property, ApiError> {
        check_status(&response, 201)?;
        from_json(&response.body)
    }

    pub fn parse_update_group(&self, response: HttpResponse) -> Result<Property, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    /// Returns the server's confirmation message.
    pub fn parse_delete_property(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        from_json::<MessageBody>(&response.body).map(|body| body.message)
    }

    fn property_path(&self, id: &str) -> String {
        format!("{}/properties/{}", self.base_url, urlencoding::encode(id))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let message = serde_json::from_str::<MessageBody>(&response.body)
        .map(|body| body.message)
        .unwrap_or_else(|_| response.body.clone());
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PropertyClient {
        PropertyClient::new("http://localhost:5000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_without_search_term() {
        let req = client().build_list_properties(None);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:5000/api/properties");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_list_encodes_search_term() {
        let req = client().build_list_properties(Some("harbour & bay"));
        assert_eq!(
            req.path,
            "http://localhost:5000/api/properties?searchTerm=harbour%20%26%20bay"
        );
    }

    #[test]
    fn build_list_ignores_blank_search_term() {
        let req = client().build_list_properties(Some("   "));
        assert_eq!(req.path, "http://localhost:5000/api/properties");
    }

    #[test]
    fn build_group_properties_path() {
        let req = client().build_group_properties();
        assert_eq!(req.path, "http://localhost:5000/properties/groups");
    }

    #[test]
    fn build_create_property_sends_json() {
        let mut input = PropertyFields::new("Pending");
        input.city = Some("Lisbon".to_string());
        let req = client().build_create_property(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:5000/properties");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"group": "Pending", "city": "Lisbon"}));
    }

    #[test]
    fn build_update_group_sends_only_group() {
        let req = client().build_update_group("abc123", "Exited").unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:5000/properties/abc123");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"group": "Exited"}));
    }

    #[test]
    fn build_delete_uses_api_prefix() {
        let req = client().build_delete_property("abc123");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:5000/api/properties/abc123");
    }

    #[test]
    fn parse_list_success() {
        let props = client()
            .parse_list_properties(response(200, r#"[{"id":"a","group":"Pending"}]"#))
            .unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].group, "Pending");
    }

    #[test]
    fn parse_groups_success() {
        let groups = client()
            .parse_group_properties(response(
                200,
                r#"{"Exited":[{"id":"b","group":"Exited"}],"Pending":[]}"#,
            ))
            .unwrap();
        assert_eq!(groups["Exited"].len(), 1);
        assert!(groups["Pending"].is_empty());
    }

    #[test]
    fn parse_get_not_found() {
        let err = client()
            .parse_get_property(response(404, r#"{"message":"Property not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_extracts_server_message() {
        let err = client()
            .parse_create_property(response(500, r#"{"message":"Failed to create property"}"#))
            .unwrap_err();
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to create property");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_create_keeps_raw_body_without_message() {
        let err = client()
            .parse_create_property(response(502, "bad gateway"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 502, ref message } if message == "bad gateway"));
    }

    #[test]
    fn parse_delete_returns_message() {
        let message = client()
            .parse_delete_property(response(200, r#"{"message":"Property deleted successfully"}"#))
            .unwrap();
        assert_eq!(message, "Property deleted successfully");
    }

    #[test]
    fn parse_update_bad_json() {
        let err = client()
            .parse_update_group(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = PropertyClient::new("http://localhost:5000/").build_group_properties();
        assert_eq!(req.path, "http://localhost:5000/properties/groups");
    }
}

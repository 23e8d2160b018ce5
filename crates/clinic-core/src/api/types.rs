//! Wire types for the clinic backend API
//!
//! The backend wraps every JSON body in the same envelope:
//! `{status, message, data}`. Dates travel as naive ISO-8601 with no
//! zone suffix.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Outcome reported inside a response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Success,
    Error,
    NotFound,
}

/// Standard response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de>"))]
pub struct Envelope<D> {
    pub status: ApiStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<D>,
}

/// Bare error body used by non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// One page of a list response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

/// Body of a paginated list query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Login credentials; exactly one identifier field is set, chosen by
/// classifying the free-form identifier the user typed
#[derive(Debug, Clone, Default, Serialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
}

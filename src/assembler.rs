//! Response assembly.
//!
//! Turns a matched endpoint, its bound path parameters and its schema into
//! the response body.

use crate::config::{EndpointDefinition, HttpMethod, ResponseType};
use crate::generator::{generate, generate_many};
use crate::matcher::PathParams;
use crate::schema::SchemaTemplate;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Default page size when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Body of a mock response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Empty,
}

/// Status and body of a mock response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub body: ResponseBody,
}

impl ResponseDescriptor {
    /// The JSON body, if any.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Empty => None,
        }
    }
}

/// Pagination metadata of a paged list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Read `page` and `limit` from the query. Missing or unusable values
    /// fall back to page 1 and [`DEFAULT_PAGE_SIZE`].
    pub fn from_query(query: &HashMap<String, String>, total: usize, list_cap: usize) -> Self {
        let positive = |key: &str| {
            query
                .get(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
        };
        let page = positive("page").unwrap_or(1);
        let limit = positive("limit")
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, list_cap.max(1));

        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Number of items on the requested page.
    pub fn page_len(&self) -> usize {
        let start = (self.page - 1).saturating_mul(self.limit);
        self.total.saturating_sub(start).min(self.limit)
    }
}

/// Inputs for [`assemble`] beyond the endpoint itself.
#[derive(Debug)]
pub struct AssembleRequest<'a> {
    pub params: &'a PathParams,
    pub query: &'a HashMap<String, String>,
    pub status: u16,
    pub list_cap: usize,
}

/// Build the response for a matched endpoint.
pub fn assemble<R: Rng>(
    endpoint: &EndpointDefinition,
    template: &SchemaTemplate,
    request: &AssembleRequest<'_>,
    rng: &mut R,
) -> ResponseDescriptor {
    let status = request.status;

    if endpoint.method == HttpMethod::Delete || status == 204 {
        return ResponseDescriptor {
            status,
            body: ResponseBody::Empty,
        };
    }

    let body = match endpoint.response_type {
        ResponseType::List => {
            let total = (endpoint.count as usize).min(request.list_cap);
            if endpoint.support_pagination {
                let pagination = Pagination::from_query(request.query, total, request.list_cap);
                let data = generate_many(template, pagination.page_len(), rng);
                json!({ "data": data, "pagination": pagination })
            } else {
                json!({ "data": generate_many(template, total, rng) })
            }
        }
        ResponseType::Single => {
            let mut item = generate(template, rng);
            merge_params(&mut item, request.params);
            item
        }
    };

    ResponseDescriptor {
        status,
        body: ResponseBody::Json(body),
    }
}

/// Copy path parameters into an object, replacing generated fields of the
/// same name. Non-object values are left untouched.
fn merge_params(item: &mut Value, params: &PathParams) {
    if let Value::Object(map) = item {
        for (name, value) in params {
            map.insert(name.clone(), Value::String(value.clone()));
        }
    }
}

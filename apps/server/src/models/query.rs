//! Query objects for list endpoints
//!
//! Filtering and pagination live in the store, not the client: handlers
//! translate whitelisted query parameters into a `ListQuery` and the store
//! evaluates it, so behavior is identical for every resource type.

use std::collections::HashMap;

use crate::{config::ApiConfig, models::ResourceKind, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Contains,
}

/// One predicate against a payload field. Fields are dotted paths into the
/// payload JSON (`status`, `name.family`) and must come from the kind's
/// whitelist - the store interpolates them into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: &'static str,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    /// ANDed predicates.
    pub filters: Vec<Filter>,
    /// Free-text substring, ORed across the kind's display fields.
    pub text: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ListQuery {
    pub fn unfiltered(api: &ApiConfig) -> Self {
        Self {
            filters: Vec::new(),
            text: None,
            limit: api.default_page_size,
            offset: 0,
        }
    }

    /// Build a query from raw request parameters.
    ///
    /// Recognized keys: `limit`, `offset`, `q`, and the kind's equality
    /// filter fields. Anything else is rejected so typos don't silently
    /// return the unfiltered collection.
    pub fn from_params(
        kind: ResourceKind,
        params: &HashMap<String, String>,
        api: &ApiConfig,
    ) -> Result<Self> {
        let mut query = Self::unfiltered(api);

        for (key, value) in params {
            match key.as_str() {
                "limit" => {
                    query.limit = value.parse().map_err(|_| {
                        Error::Validation(format!("limit must be an integer, got '{value}'"))
                    })?;
                }
                "offset" => {
                    query.offset = value.parse().map_err(|_| {
                        Error::Validation(format!("offset must be an integer, got '{value}'"))
                    })?;
                }
                "q" => {
                    if !value.is_empty() {
                        query.text = Some(value.clone());
                    }
                }
                other => {
                    let field = kind
                        .equality_filter_fields()
                        .iter()
                        .find(|f| **f == other)
                        .copied()
                        .ok_or_else(|| {
                            Error::Validation(format!(
                                "Unknown filter field '{}' for {}",
                                other,
                                kind.name()
                            ))
                        })?;
                    query.filters.push(Filter {
                        field,
                        op: FilterOp::Eq,
                        value: value.clone(),
                    });
                }
            }
        }

        query.limit = query.limit.clamp(1, api.max_page_size);
        query.offset = query.offset.max(0);
        Ok(query)
    }
}

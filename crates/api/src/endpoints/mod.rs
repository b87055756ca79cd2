//! API endpoints.
//!
//! Entity models serialize directly as response payloads; sensitive user
//! columns are skipped at the entity level.

mod activation_codes;
mod auth;
mod clients;
mod contacts;
mod deals;
mod leads;
mod locations;
mod pipelines;
mod tiers;
mod users;

use axum::Router;
use crm_db::query::FilterRequest;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/tiers", tiers::router())
        .nest("/activation-codes", activation_codes::router())
        .nest("/locations", locations::router())
        .nest("/clients", clients::router())
        .nest("/contacts", contacts::router())
        .nest("/pipelines", pipelines::router())
        .nest("/leads", leads::router())
        .nest("/deals", deals::router())
}

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Parsed list parameters: pagination plus the remaining filter pairs.
pub(crate) struct ListParams {
    pub request: FilterRequest,
    pub limit: u64,
    pub offset: u64,
}

/// Split `limit`/`offset` out of the raw query pairs; everything else goes
/// to the filter resolver in its original order.
pub(crate) fn list_params(pairs: Vec<(String, String)>) -> ListParams {
    let mut limit = DEFAULT_LIMIT;
    let mut offset = 0;
    let mut filters = Vec::new();

    for (key, value) in pairs {
        match key.as_str() {
            "limit" => limit = value.parse().unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
            "offset" => offset = value.parse().unwrap_or(0),
            _ => filters.push((key, value)),
        }
    }

    ListParams {
        request: FilterRequest::from_pairs(filters),
        limit,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_split_pagination_from_filters() {
        let pairs = vec![
            ("status".to_string(), "active".to_string()),
            ("limit".to_string(), "50".to_string()),
            ("offset".to_string(), "10".to_string()),
            ("keyword".to_string(), "acme".to_string()),
        ];

        let params = list_params(pairs);
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 10);
        let keys: Vec<&str> = params.request.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["status", "keyword"]);
    }

    #[test]
    fn test_list_params_caps_limit() {
        let pairs = vec![("limit".to_string(), "9999".to_string())];
        assert_eq!(list_params(pairs).limit, MAX_LIMIT);
    }

    #[test]
    fn test_list_params_defaults() {
        let params = list_params(Vec::new());
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.offset, 0);
        assert!(params.request.is_empty());
    }
}

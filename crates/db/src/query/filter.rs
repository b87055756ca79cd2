//! Filter resolver core.
//!
//! A [`FilterSet`] holds named predicate handlers for one entity type;
//! [`FilterSet::apply`] walks an incoming parameter bag and chains the
//! matching handlers onto a `Select`. The resolver itself never errors:
//! unknown keys are a no-op, absent values (`null`, `""`, `false`) skip the
//! handler, and anything else is the handler's own business.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Select};

/// A raw filter value taken from a request parameter bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Explicit null.
    Null,
    /// Boolean; `false` counts as absent.
    Bool(bool),
    /// String; `""` counts as absent.
    Str(String),
    /// List of strings (e.g. repeated query parameters).
    List(Vec<String>),
}

impl FilterValue {
    /// Whether this value is one of the three "absent" sentinels
    /// (`null`, empty string, `false`).
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => true,
            Self::Str(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(true) => false,
        }
    }

    /// The string form of this value, if it has one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value into a filter value. Numbers are stringified;
    /// nested objects have no filter meaning and collapse to `Null`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null | serde_json::Value::Object(_) => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::String(s) => Self::Str(s.clone()),
            serde_json::Value::Number(n) => Self::Str(n.to_string()),
            serde_json::Value::Array(items) => Self::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        serde_json::Value::String(s) => Some(s.clone()),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
        }
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// An ordered bag of filter parameters, as received from a query string or
/// JSON body. Key order is preserved; it is the order handlers run in.
#[derive(Debug, Clone, Default)]
pub struct FilterRequest {
    entries: Vec<(String, FilterValue)>,
}

impl FilterRequest {
    /// Create an empty request.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Build from string pairs (query-string form). Repeated keys are kept;
    /// [`FilterSet::apply`] only honors the first occurrence.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), FilterValue::Str(v.into())))
                .collect(),
        }
    }

    /// Build from a JSON object, preserving the object's key order.
    #[must_use]
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            entries: object
                .iter()
                .map(|(k, v)| (k.clone(), FilterValue::from_json(v)))
                .collect(),
        }
    }

    /// Iterate the parameters in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A filter handler: takes the select and the raw value, returns the
/// (possibly) narrowed select.
pub type FilterFn<E> = Box<dyn Fn(Select<E>, &FilterValue) -> Select<E> + Send + Sync>;

/// Named filter handlers for one entity type.
///
/// Registered once per entity at startup; each name maps to exactly one
/// handler. Handlers are pure over the select — they chain predicates and
/// never touch request state.
pub struct FilterSet<E: EntityTrait> {
    handlers: Vec<(&'static str, FilterFn<E>)>,
}

impl<E: EntityTrait> Default for FilterSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FilterSet<E> {
    /// Create an empty filter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an arbitrary handler under `name`.
    ///
    /// Registering the same name twice is a programmer error.
    #[must_use]
    pub fn register(mut self, name: &'static str, handler: FilterFn<E>) -> Self {
        debug_assert!(
            !self.handlers.iter().any(|(n, _)| *n == name),
            "duplicate filter handler: {name}"
        );
        self.handlers.push((name, handler));
        self
    }

    /// Register an equality handler on `column`. A string value becomes
    /// `column = value`; a list becomes `column IN (values)`; `true`
    /// becomes `column = TRUE`.
    #[must_use]
    pub fn eq(self, name: &'static str, column: E::Column) -> Self {
        self.register(
            name,
            Box::new(move |select, value| match value {
                FilterValue::Str(s) => select.filter(column.eq(s.clone())),
                FilterValue::List(items) => select.filter(column.is_in(items.clone())),
                FilterValue::Bool(b) => select.filter(column.eq(*b)),
                FilterValue::Null => select,
            }),
        )
    }

    /// Register a `>=` handler on a timestamp `column`. Accepts RFC 3339 or
    /// `YYYY-MM-DD` (start of day, UTC); unparseable input is fail-open.
    #[must_use]
    pub fn date_from(self, name: &'static str, column: E::Column) -> Self {
        self.register(
            name,
            Box::new(move |select, value| {
                match value.as_str().and_then(|s| parse_date_bound(s, false)) {
                    Some(ts) => select.filter(column.gte(ts)),
                    None => select,
                }
            }),
        )
    }

    /// Register a `<=` handler on a timestamp `column`. A bare date means
    /// end of day, so `start_date == end_date` covers the whole day.
    #[must_use]
    pub fn date_to(self, name: &'static str, column: E::Column) -> Self {
        self.register(
            name,
            Box::new(move |select, value| {
                match value.as_str().and_then(|s| parse_date_bound(s, true)) {
                    Some(ts) => select.filter(column.lte(ts)),
                    None => select,
                }
            }),
        )
    }

    /// Register a multi-column OR substring search.
    #[must_use]
    pub fn keyword(self, name: &'static str, columns: Vec<E::Column>) -> Self {
        self.register(
            name,
            Box::new(move |select, value| match value.as_str() {
                Some(term) => {
                    let condition = columns
                        .iter()
                        .fold(Condition::any(), |cond, col| cond.add(col.contains(term)));
                    select.filter(condition)
                }
                None => select,
            }),
        )
    }

    /// Look up a handler by name.
    fn get(&self, name: &str) -> Option<&FilterFn<E>> {
        self.handlers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, h)| h)
    }

    /// Apply the matching handlers to `select`, in the request's key order.
    ///
    /// Unknown keys and absent values are skipped silently. A key repeated
    /// within one request is honored once (first occurrence). The select is
    /// returned unexecuted; pagination and execution are the caller's.
    #[must_use]
    pub fn apply(&self, select: Select<E>, request: &FilterRequest) -> Select<E> {
        let mut applied: Vec<&str> = Vec::new();
        let mut select = select;

        for (key, value) in request.iter() {
            if value.is_absent() || applied.contains(&key) {
                continue;
            }
            if let Some(handler) = self.get(key) {
                select = handler(select, value);
                applied.push(key);
            }
        }

        select
    }
}

/// Parse a date bound. `end` selects the inclusive end of day for bare
/// dates; full RFC 3339 timestamps are taken as given.
fn parse_date_bound(input: &str, end: bool) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    let time = if end {
        date.and_hms_opt(23, 59, 59)?
    } else {
        date.and_hms_opt(0, 0, 0)?
    };
    Some(time.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::client;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    fn sql(select: &Select<client::Entity>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    fn client_filters() -> FilterSet<client::Entity> {
        FilterSet::new()
            .eq("status", client::Column::Status)
            .eq("location_id", client::Column::LocationId)
            .keyword(
                "keyword",
                vec![client::Column::Name, client::Column::Email],
            )
            .date_from("start_date", client::Column::CreatedAt)
            .date_to("end_date", client::Column::CreatedAt)
    }

    #[test]
    fn test_unknown_keys_are_a_no_op() {
        let filters = client_filters();
        let base = client::Entity::find();

        let mut request = FilterRequest::new();
        request.push("nonexistent", "whatever");
        request.push("also_unknown", "3");

        let filtered = filters.apply(client::Entity::find(), &request);
        assert_eq!(sql(&base), sql(&filtered));
    }

    #[test]
    fn test_absent_values_skip_the_handler() {
        // A handler that must not run for absent values.
        let filters: FilterSet<client::Entity> = FilterSet::new().register(
            "trap",
            Box::new(|_, _| panic!("handler invoked for an absent value")),
        );

        let mut request = FilterRequest::new();
        request.push("trap", FilterValue::Null);
        request.push("trap", FilterValue::Str(String::new()));
        request.push("trap", FilterValue::Bool(false));

        let base = client::Entity::find();
        let filtered = filters.apply(client::Entity::find(), &request);
        assert_eq!(sql(&base), sql(&filtered));
    }

    #[test]
    fn test_equality_filter_adds_predicate() {
        let filters = client_filters();

        let mut request = FilterRequest::new();
        request.push("location_id", "loc42");

        let filtered = filters.apply(client::Entity::find(), &request);
        let query = sql(&filtered);
        assert!(query.contains("location_id"), "{query}");
        assert!(query.contains("loc42"), "{query}");
    }

    #[test]
    fn test_list_value_becomes_in_predicate() {
        let filters = client_filters();

        let mut request = FilterRequest::new();
        request.push(
            "location_id",
            FilterValue::List(vec!["a".to_string(), "b".to_string()]),
        );

        let query = sql(&filters.apply(client::Entity::find(), &request));
        assert!(query.contains("IN"), "{query}");
    }

    #[test]
    fn test_repeated_key_is_applied_once() {
        let filters = client_filters();

        let mut once = FilterRequest::new();
        once.push("location_id", "loc1");

        let mut twice = FilterRequest::new();
        twice.push("location_id", "loc1");
        twice.push("location_id", "loc1");

        let applied_once = filters.apply(client::Entity::find(), &once);
        let applied_twice = filters.apply(client::Entity::find(), &twice);
        assert_eq!(sql(&applied_once), sql(&applied_twice));
    }

    #[test]
    fn test_date_pair_applies_both_bounds_independently() {
        let filters = client_filters();

        let mut request = FilterRequest::new();
        request.push("start_date", "2024-01-01");
        request.push("end_date", "2024-06-30");

        let query = sql(&filters.apply(client::Entity::find(), &request));
        assert!(query.contains(">="), "{query}");
        assert!(query.contains("<="), "{query}");
    }

    #[test]
    fn test_unparseable_date_fails_open() {
        let filters = client_filters();
        let base = client::Entity::find();

        let mut request = FilterRequest::new();
        request.push("start_date", "not-a-date");

        let filtered = filters.apply(client::Entity::find(), &request);
        assert_eq!(sql(&base), sql(&filtered));
    }

    #[test]
    fn test_keyword_builds_or_search() {
        let filters = client_filters();

        let mut request = FilterRequest::new();
        request.push("keyword", "acme");

        let query = sql(&filters.apply(client::Entity::find(), &request));
        assert!(query.contains("OR"), "{query}");
        assert!(query.contains("LIKE"), "{query}");
    }

    #[test]
    fn test_handlers_run_in_request_key_order() {
        let filters = client_filters();

        let mut request = FilterRequest::new();
        request.push("end_date", "2024-06-30");
        request.push("start_date", "2024-01-01");

        let query = sql(&filters.apply(client::Entity::find(), &request));
        let lte = query.find("<=").unwrap();
        let gte = query.find(">=").unwrap();
        assert!(lte < gte, "request order not preserved: {query}");
    }

    #[test]
    fn test_from_json_preserves_key_order_and_types() {
        let object = serde_json::json!({
            "status": "active",
            "flag": true,
            "count": 3,
            "missing": null,
        });
        let map = object.as_object().unwrap();
        let request = FilterRequest::from_json(map);

        let entries: Vec<_> = request.iter().collect();
        assert_eq!(entries[0], ("status", &FilterValue::Str("active".into())));
        assert_eq!(entries[1], ("flag", &FilterValue::Bool(true)));
        assert_eq!(entries[2], ("count", &FilterValue::Str("3".into())));
        assert_eq!(entries[3], ("missing", &FilterValue::Null));
    }

    #[test]
    fn test_filter_value_absence_sentinels() {
        assert!(FilterValue::Null.is_absent());
        assert!(FilterValue::Str(String::new()).is_absent());
        assert!(FilterValue::Bool(false).is_absent());
        assert!(FilterValue::List(vec![]).is_absent());

        assert!(!FilterValue::Bool(true).is_absent());
        assert!(!FilterValue::Str("x".to_string()).is_absent());
    }
}

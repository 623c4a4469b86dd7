//! Navigation link generation
//!
//! Links rebuild a canonical query string using the same bracket-path
//! convention the parser consumes, so every generated link is round-trip
//! parseable. Boolean combinators have no query-string form and are
//! skipped.

use crate::config::PageConfig;
use crate::core::field::FieldValue;
use crate::core::filter::{FilterEntry, FilterOperand, FilterTree};
use crate::core::paginator::PaginationMeta;
use crate::core::query::PageRequest;
use serde::Serialize;
use url::form_urlencoded;

/// Self-describing navigation links for a page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageLinks {
    pub first: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Produce `first`/`prev`/`next`/`last` links for a page.
///
/// `prev` and `next` appear only when the corresponding meta flag and
/// boundary cursor are present; `last` whenever the last-cursor probe
/// found a final record.
pub fn generate_links(
    base_url: &str,
    request: &PageRequest,
    config: &PageConfig,
    meta: &PaginationMeta,
) -> PageLinks {
    let base_params = canonical_params(request, config);

    let first = render_url(base_url, &base_params);

    let prev = match (&meta.start_cursor, meta.has_previous_page) {
        (Some(cursor), true) => Some(render_url(
            base_url,
            &with_param(&base_params, "page[before]", cursor),
        )),
        _ => None,
    };

    let next = match (&meta.end_cursor, meta.has_next_page) {
        (Some(cursor), true) => Some(render_url(
            base_url,
            &with_param(&base_params, "page[after]", cursor),
        )),
        _ => None,
    };

    let last = meta.last_cursor.as_ref().map(|cursor| {
        render_url(base_url, &with_param(&base_params, "page[after]", cursor))
    });

    PageLinks {
        first,
        prev,
        next,
        last,
    }
}

/// Canonical query parameters shared by every link: `page[size]` only when
/// non-default, `sort` verbatim when non-default, filters re-bracketed.
fn canonical_params(request: &PageRequest, config: &PageConfig) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if let Some(size) = request.size {
        if size != config.default_size {
            params.push(("page[size]".to_string(), size.to_string()));
        }
    }

    if !request.sort.is_empty() && request.sort != ["id"] {
        params.push(("sort".to_string(), request.sort.join(",")));
    }

    serialize_filter(&request.filter, "", &mut params);

    params
}

fn serialize_filter(tree: &FilterTree, prefix: &str, params: &mut Vec<(String, String)>) {
    for (key, entry) in &tree.0 {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match entry {
            FilterEntry::Literal(value) => {
                params.push((format!("filter[{}]", path), render_value(value)));
            }
            FilterEntry::List(values) => {
                params.push((format!("filter[{}]", path), render_list(values)));
            }
            FilterEntry::Operators(ops) => {
                for (op, operand) in ops {
                    let rendered = match operand {
                        FilterOperand::Value(value) => render_value(value),
                        FilterOperand::List(values) => render_list(values),
                    };
                    params.push((format!("filter[{}][{}]", path, op), rendered));
                }
            }
            FilterEntry::Nested(subtree) => serialize_filter(subtree, &path, params),
            // Combinators cannot be expressed in a query string
            FilterEntry::Or(_) | FilterEntry::And(_) | FilterEntry::Not(_) => {}
        }
    }
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => s.clone(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(x) => x.to_string(),
        FieldValue::Boolean(b) => b.to_string(),
        FieldValue::Uuid(u) => u.to_string(),
        FieldValue::DateTime(dt) => dt.to_rfc3339(),
        FieldValue::Null => "null".to_string(),
    }
}

fn render_list(values: &[FieldValue]) -> String {
    values
        .iter()
        .map(render_value)
        .collect::<Vec<_>>()
        .join(",")
}

fn with_param(params: &[(String, String)], key: &str, value: &str) -> Vec<(String, String)> {
    let mut extended = params.to_vec();
    extended.push((key.to_string(), value.to_string()));
    extended
}

fn render_url(base_url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return base_url.to_string();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    format!("{}?{}", base_url, serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::parse_query;

    fn meta(
        has_next: bool,
        has_prev: bool,
        start: Option<&str>,
        end: Option<&str>,
        last: Option<&str>,
    ) -> PaginationMeta {
        PaginationMeta {
            has_next_page: has_next,
            has_previous_page: has_prev,
            start_cursor: start.map(str::to_string),
            end_cursor: end.map(str::to_string),
            last_cursor: last.map(str::to_string),
            total_count: 0,
        }
    }

    fn decode_query(link: &str) -> Vec<(String, String)> {
        let query = link.split_once('?').map(|(_, q)| q).unwrap_or("");
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn test_default_size_is_omitted() {
        let request = PageRequest::new().with_size(10);
        let links = generate_links(
            "/articles",
            &request,
            &PageConfig::default(),
            &meta(false, false, None, None, None),
        );
        assert_eq!(links.first, "/articles");
    }

    #[test]
    fn test_non_default_size_is_included() {
        let request = PageRequest::new().with_size(25);
        let links = generate_links(
            "/articles",
            &request,
            &PageConfig::default(),
            &meta(false, false, None, None, None),
        );
        assert_eq!(
            decode_query(&links.first),
            vec![("page[size]".to_string(), "25".to_string())]
        );
    }

    #[test]
    fn test_default_sort_is_omitted() {
        let request = PageRequest::new().with_sort(&["id"]);
        let links = generate_links(
            "/articles",
            &request,
            &PageConfig::default(),
            &meta(false, false, None, None, None),
        );
        assert_eq!(links.first, "/articles");
    }

    #[test]
    fn test_next_and_prev_require_flag_and_cursor() {
        let request = PageRequest::new();
        let config = PageConfig::default();

        let links = generate_links(
            "/articles",
            &request,
            &config,
            &meta(true, false, Some("s"), Some("e"), None),
        );
        assert!(links.next.is_some());
        assert!(links.prev.is_none());

        let links = generate_links(
            "/articles",
            &request,
            &config,
            &meta(false, true, Some("s"), Some("e"), None),
        );
        assert!(links.next.is_none());
        assert!(links.prev.is_some());
    }

    #[test]
    fn test_cursor_params_use_before_and_after() {
        let request = PageRequest::new();
        let links = generate_links(
            "/articles",
            &request,
            &PageConfig::default(),
            &meta(true, true, Some("start123"), Some("end456"), Some("last789")),
        );
        let prev = decode_query(links.prev.as_deref().expect("prev link"));
        assert!(prev.contains(&("page[before]".to_string(), "start123".to_string())));
        let next = decode_query(links.next.as_deref().expect("next link"));
        assert!(next.contains(&("page[after]".to_string(), "end456".to_string())));
        let last = decode_query(links.last.as_deref().expect("last link"));
        assert!(last.contains(&("page[after]".to_string(), "last789".to_string())));
    }

    #[test]
    fn test_links_round_trip_through_parser() {
        let original = parse_query(
            &[
                ("page[size]".to_string(), "25".to_string()),
                ("sort".to_string(), "-createdAt".to_string()),
                ("filter[title]".to_string(), "rust".to_string()),
                ("filter[status]".to_string(), "active,draft".to_string()),
                ("filter[createdAt][gte]".to_string(), "2024-01-01".to_string()),
                ("filter[category.name]".to_string(), "tools".to_string()),
            ],
        );

        let links = generate_links(
            "/articles",
            &original,
            &PageConfig::default(),
            &meta(false, false, None, None, None),
        );

        let reparsed = parse_query(&decode_query(&links.first));
        assert_eq!(reparsed.size, original.size);
        assert_eq!(reparsed.sort, original.sort);
        assert_eq!(reparsed.filter, original.filter);
    }
}

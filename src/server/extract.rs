//! Axum extractors for pagination queries
//!
//! The extractor only lifts the raw query pairs out of the request; turning
//! them into a [`PageRequest`] stays an explicit, testable step so handlers
//! keep control over when parsing happens.

use crate::core::query::{PageRequest, parse_query};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use url::form_urlencoded;

/// Raw query pairs extracted from the request URI.
///
/// # Example
/// ```rust,ignore
/// pub async fn list_articles(query: PageQuery) -> impl IntoResponse {
///     let request = query.into_request();
///     // paginator.paginate(&repo, &request, "/articles").await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PageQuery(pub Vec<(String, String)>);

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        let pairs = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Ok(PageQuery(pairs))
    }
}

impl PageQuery {
    /// Parse the raw pairs into a pagination request
    pub fn into_request(self) -> PageRequest {
        parse_query(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(uri: &str) -> PageQuery {
        let request = Request::builder().uri(uri).body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        PageQuery::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_extracts_decoded_pairs() {
        let query = extract("/articles?page%5Bsize%5D=5&sort=-createdAt").await;
        assert_eq!(
            query.0,
            vec![
                ("page[size]".to_string(), "5".to_string()),
                ("sort".to_string(), "-createdAt".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_into_request() {
        let query = extract("/articles?page%5Bsize%5D=5&filter%5Btitle%5D=rust").await;
        let request = query.into_request();
        assert_eq!(request.size, Some(5));
        assert!(request.filter.get("title").is_some());
    }

    #[tokio::test]
    async fn test_missing_query_is_empty() {
        let query = extract("/articles").await;
        assert!(query.0.is_empty());
    }
}

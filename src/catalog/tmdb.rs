use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::FilmPage,
};

use super::CatalogClient;

/// TMDB-backed catalog client.
///
/// Authenticates with a v4 read access token sent as a bearer credential.
#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_token: String,
    api_url: String,
}

/// Response of `GET /movie/{id}/external_ids`
#[derive(Debug, Deserialize)]
struct ExternalIdsResponse {
    imdb_id: Option<String>,
}

impl TmdbCatalog {
    pub fn new(api_token: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            api_url,
        }
    }

    async fn fetch_search(&self, query: &str, page: u32) -> AppResult<FilmPage> {
        let url = format!("{}/search/movie", self.api_url);
        let page = page.to_string();

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("query", query), ("page", page.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB search returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_external_ids(&self, movie_id: i64) -> AppResult<ExternalIdsResponse> {
        let url = format!("{}/movie/{}/external_ids", self.api_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB external_ids returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogClient for TmdbCatalog {
    async fn search(&self, query: &str, page: u32) -> FilmPage {
        if query.trim().is_empty() {
            return FilmPage::empty(page);
        }

        match self.fetch_search(query, page).await {
            Ok(found) => {
                tracing::info!(
                    query = %query,
                    page = page,
                    results = found.results.len(),
                    total_pages = found.total_pages,
                    "Film search completed"
                );
                found
            }
            Err(e) => {
                tracing::warn!(
                    query = %query,
                    page = page,
                    error = %e,
                    "Film search failed, returning empty page"
                );
                FilmPage::empty(page)
            }
        }
    }

    async fn external_id(&self, movie_id: i64) -> Option<String> {
        match self.fetch_external_ids(movie_id).await {
            Ok(ids) => ids.imdb_id.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::warn!(
                    movie_id = movie_id,
                    error = %e,
                    "External id lookup failed, continuing without it"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_catalog(api_url: &str) -> TmdbCatalog {
        TmdbCatalog::new("test_token".to_string(), api_url.to_string())
    }

    #[tokio::test]
    async fn test_search_trivial_query_returns_empty_page() {
        // No request is made for a blank query, so the unroutable URL is
        // never touched.
        let catalog = create_test_catalog("http://127.0.0.1:9");

        let page = catalog.search("   ", 2).await;
        assert_eq!(page, FilmPage::empty(2));
    }

    #[tokio::test]
    async fn test_search_transport_failure_returns_empty_page() {
        // Port 9 (discard) is not listening; the connection is refused.
        let catalog = create_test_catalog("http://127.0.0.1:9");

        let page = catalog.search("Inception", 1).await;
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn test_external_id_transport_failure_returns_none() {
        let catalog = create_test_catalog("http://127.0.0.1:9");

        assert_eq!(catalog.external_id(27205).await, None);
    }

    #[test]
    fn test_external_ids_response_deserialization() {
        let json = r#"{
            "id": 27205,
            "imdb_id": "tt1375666",
            "wikidata_id": "Q25188",
            "facebook_id": "inception"
        }"#;

        let ids: ExternalIdsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(ids.imdb_id, Some("tt1375666".to_string()));
    }

    #[test]
    fn test_external_ids_response_null_imdb_id() {
        let json = r#"{"id": 555, "imdb_id": null}"#;

        let ids: ExternalIdsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(ids.imdb_id, None);
    }
}

//! Supabase REST API client

use async_trait::async_trait;
use reqwest::{header::CONTENT_RANGE, Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::gateway::{Collection, GatewayError, Predicate, RemoteGateway};
use crate::config::Config;

/// Supabase client talking to the PostgREST endpoint of a project
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.gateway_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.supabase_url.clone(),
            api_key: config.gateway_key().to_string(),
        })
    }

    /// Get the REST API URL for a table
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach the project key headers
    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Send a request, turning non-success statuses into [`GatewayError::Api`]
    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = self
            .authed(request)
            .send()
            .await
            .map_err(GatewayError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status: status.as_u16(), body });
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteGateway for SupabaseClient {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, GatewayError> {
        let request = self
            .client
            .get(self.rest_url(collection.table()))
            .query(&[("select", "*")]);

        let rows: Vec<Value> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(GatewayError::Parse)?;

        debug!(collection = %collection, rows = rows.len(), "Fetched snapshot");
        Ok(rows)
    }

    async fn count(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> Result<u64, GatewayError> {
        let filters: Vec<(&str, String)> = predicates.iter().map(Predicate::query_pair).collect();

        // HEAD + count=exact returns only the Content-Range header, no rows
        let request = self
            .client
            .head(self.rest_url(collection.table()))
            .query(&[("select", "*")])
            .query(&filters)
            .header("Prefer", "count=exact");

        let response = self.send(request).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| GatewayError::MissingCount("no Content-Range header".to_string()))?;

        parse_content_range(range)
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, GatewayError> {
        let request = self
            .client
            .post(self.rest_url(collection.table()))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(&row);

        // PostgREST returns an array, get first element
        let results: Vec<Value> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(GatewayError::Parse)?;

        results.into_iter().next().ok_or(GatewayError::NoRowReturned)
    }
}

/// Extract the total from a PostgREST `Content-Range` value (`0-24/312` or `*/0`)
pub fn parse_content_range(value: &str) -> Result<u64, GatewayError> {
    value
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| GatewayError::MissingCount(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_with_rows() {
        assert_eq!(parse_content_range("0-24/312").unwrap(), 312);
    }

    #[test]
    fn content_range_head_only() {
        assert_eq!(parse_content_range("*/5").unwrap(), 5);
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
    }

    #[test]
    fn content_range_without_exact_count() {
        assert!(matches!(
            parse_content_range("0-24/*"),
            Err(GatewayError::MissingCount(_))
        ));
    }

    #[test]
    fn content_range_garbage() {
        assert!(parse_content_range("bytes").is_err());
        assert!(parse_content_range("*/-3").is_err());
    }

    #[test]
    fn rest_url_joins_table() {
        let config = crate::config::tests::test_config();
        let client = SupabaseClient::new(&config).unwrap();
        assert_eq!(
            client.rest_url(Collection::Thrift.table()),
            "https://project.supabase.co/rest/v1/thrift_items"
        );
    }
}

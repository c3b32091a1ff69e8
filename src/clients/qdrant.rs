//! Qdrant vector search client.

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clients::classify::classify_response;
use crate::clients::error::{ClientError, ClientResult};
use crate::config::QdrantConfig;
use crate::resilience::RetryPolicy;

const SERVICE: &str = "qdrant";

/// A point to store in a collection.
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub id: serde_json::Value,
    pub vector: Vec<f32>,
    pub payload: serde_json::Value,
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredPoint {
    pub id: serde_json::Value,
    pub score: f32,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

/// Client for the Qdrant REST API.
#[derive(Debug, Clone)]
pub struct QdrantClient {
    http: reqwest::Client,
    config: QdrantConfig,
    policy: RetryPolicy,
}

impl QdrantClient {
    pub fn new(http: reqwest::Client, config: QdrantConfig, policy: RetryPolicy) -> Self {
        Self {
            http,
            config,
            policy,
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        allowed: &[StatusCode],
    ) -> ClientResult<reqwest::Response> {
        let url = format!("{}{}", self.config.url.trim_end_matches('/'), path);
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let response = self
            .policy
            .run(SERVICE, |_| {
                let mut request = self
                    .http
                    .request(method.clone(), &url)
                    .timeout(timeout);
                if let Some(key) = &self.config.api_key {
                    request = request.header("api-key", key);
                }
                if let Some(body) = body {
                    request = request.json(body);
                }
                async move { classify_response(request.send().await, allowed).await }
            })
            .await?;

        Ok(response)
    }

    /// Create the collection unless it already exists.
    pub async fn ensure_collection(
        &self,
        collection: &str,
        vector_size: usize,
        distance: &str,
    ) -> ClientResult<()> {
        let path = format!("/collections/{}", collection);
        let existing = self
            .request(Method::GET, &path, None, &[StatusCode::NOT_FOUND])
            .await?;
        if existing.status().is_success() {
            return Ok(());
        }

        let body = serde_json::json!({ "vectors": { "size": vector_size, "distance": distance } });
        let created = self.request(Method::PUT, &path, Some(&body), &[]).await?;
        expect_success(created).await?;

        tracing::info!(collection, vector_size, "Created Qdrant collection");
        Ok(())
    }

    /// Insert or replace points.
    pub async fn upsert_points(&self, collection: &str, points: &[Point]) -> ClientResult<()> {
        let body = serde_json::json!({ "points": points });
        let response = self
            .request(
                Method::PUT,
                &format!("/collections/{}/points", collection),
                Some(&body),
                &[],
            )
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    /// Nearest-neighbour search.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        score_threshold: Option<f32>,
    ) -> ClientResult<Vec<ScoredPoint>> {
        let mut body = serde_json::json!({ "vector": vector, "limit": limit });
        if let Some(threshold) = score_threshold {
            body["score_threshold"] = serde_json::json!(threshold);
        }

        let response = self
            .request(
                Method::POST,
                &format!("/collections/{}/points/search", collection),
                Some(&body),
                &[],
            )
            .await?;
        let response = expect_success(response).await?;

        let body: SearchResponse = response.json().await.map_err(|e| ClientError::Decode {
            service: SERVICE,
            reason: e.to_string(),
        })?;
        Ok(body.result)
    }
}

async fn expect_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::UnexpectedStatus {
        service: SERVICE,
        status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_point_decodes_without_payload() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"result":[{"id":7,"score":0.91}],"status":"ok"}"#).unwrap();
        assert_eq!(body.result.len(), 1);
        assert_eq!(body.result[0].id, serde_json::json!(7));
        assert_eq!(body.result[0].payload, None);
    }

    #[test]
    fn test_point_serializes_for_upsert() {
        let point = Point {
            id: serde_json::json!(1),
            vector: vec![0.5, 0.25],
            payload: serde_json::json!({ "name": "Halušky" }),
        };
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["vector"], serde_json::json!([0.5, 0.25]));
        assert_eq!(value["payload"]["name"], "Halušky");
    }
}

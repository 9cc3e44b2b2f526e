//! HTTP gateway - network calls to the remote system of record
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list | `GET {base}/v3/merchants/{mid}/{resource}?limit&offset&filter` |
//! | get | `GET {base}/v3/merchants/{mid}/{resource}/{id}` |
//! | create | `POST {base}/v3/merchants/{mid}/{resource}` |
//! | update | `PUT {base}/v3/merchants/{mid}/{resource}/{id}` |
//! | delete | `DELETE {base}/v3/merchants/{mid}/{resource}/{id}` |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    ClientConfig, EntityType, GatewayError, GatewayResult, ListQuery, Record, RemoteEntityGateway,
    ResponseCache,
};

/// List envelope (`{"elements": [...]}`)
#[derive(serde::Deserialize)]
struct ElementsResponse {
    #[serde(default)]
    elements: Vec<Value>,
}

/// REST implementation of [`RemoteEntityGateway`]
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    merchant_id: String,
    token: Option<String>,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl HttpGateway {
    /// Create a new gateway from configuration
    pub fn new(config: &ClientConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            merchant_id: config.merchant_id.clone(),
            token: config.token.clone(),
            cache: None,
        })
    }

    /// Cache GET responses; writes invalidate the touched resource
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, entity: EntityType) -> String {
        format!(
            "{}/v3/merchants/{}/{}",
            self.base_url,
            self.merchant_id,
            entity.resource()
        )
    }

    fn record_url(&self, entity: EntityType, id: &str) -> String {
        format!("{}/{}", self.collection_url(entity), id)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send and map non-2xx statuses onto the gateway taxonomy
    async fn send(&self, req: RequestBuilder) -> GatewayResult<String> {
        let response = self.authorize(req).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        match status {
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(text)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(GatewayError::Validation(text))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::Transient(text)),
            s if s.is_server_error() => Err(GatewayError::Transient(format!("{}: {}", s, text))),
            s => Err(GatewayError::Unexpected(format!("{}: {}", s, text))),
        }
    }

    /// GET through the cache when one is configured
    async fn get_text(&self, url: String, query: &[(&str, String)]) -> GatewayResult<String> {
        let key = cache_key(&url, query);
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(&key)
        {
            tracing::trace!(key = %key, "response cache hit");
            return Ok(hit);
        }

        let text = self.send(self.client.get(&url).query(query)).await?;

        if let Some(cache) = &self.cache {
            cache.put(&key, text.clone());
        }
        Ok(text)
    }

    fn invalidate(&self, entity: EntityType) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&self.collection_url(entity));
        }
    }
}

fn cache_key(url: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", url, params.join("&"))
}

fn parse_record(text: &str) -> GatewayResult<Record> {
    let value: Value = serde_json::from_str(text)?;
    Record::from_value(value)
}

#[async_trait]
impl RemoteEntityGateway for HttpGateway {
    async fn list(&self, entity: EntityType, query: &ListQuery) -> GatewayResult<Vec<Record>> {
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(filter) = &query.filter {
            params.push(("filter", filter.to_query()));
        }

        let text = self.get_text(self.collection_url(entity), &params).await?;
        let envelope: ElementsResponse = serde_json::from_str(&text)?;
        envelope
            .elements
            .into_iter()
            .map(Record::from_value)
            .collect()
    }

    async fn get(&self, entity: EntityType, id: &str) -> GatewayResult<Record> {
        let text = self.get_text(self.record_url(entity, id), &[]).await?;
        parse_record(&text)
    }

    async fn create(&self, entity: EntityType, payload: Value) -> GatewayResult<Record> {
        let req = self.client.post(self.collection_url(entity)).json(&payload);
        let text = self.send(req).await?;
        self.invalidate(entity);
        parse_record(&text)
    }

    async fn update(&self, entity: EntityType, id: &str, payload: Value) -> GatewayResult<Record> {
        let req = self.client.put(self.record_url(entity, id)).json(&payload);
        let text = self.send(req).await?;
        self.invalidate(entity);
        parse_record(&text)
    }

    async fn delete(&self, entity: EntityType, id: &str) -> GatewayResult<()> {
        let req = self.client.delete(self.record_url(entity, id));
        self.send(req).await?;
        self.invalidate(entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> HttpGateway {
        let config = ClientConfig::new("https://pos.example.com/", "M1").with_token("t");
        HttpGateway::new(&config).unwrap()
    }

    #[test]
    fn test_urls() {
        let gw = gateway();
        assert_eq!(gw.base_url(), "https://pos.example.com");
        assert_eq!(
            gw.collection_url(EntityType::TaxRate),
            "https://pos.example.com/v3/merchants/M1/tax_rates"
        );
        assert_eq!(
            gw.record_url(EntityType::Order, "OR-9"),
            "https://pos.example.com/v3/merchants/M1/orders/OR-9"
        );
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("u", &[]), "u");
        assert_eq!(
            cache_key("u", &[("limit", "100".to_string()), ("offset", "0".to_string())]),
            "u?limit=100&offset=0"
        );
    }

    #[test]
    fn test_parse_record() {
        let rec = parse_record(r#"{"id":"PY-1","amount":1080}"#).unwrap();
        assert_eq!(rec.id, "PY-1");
        assert_eq!(rec.i64_field("amount"), Some(1080));
        assert!(parse_record("not json").is_err());
    }
}

//! Remote entity gateway trait

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{EntityType, Filter, GatewayResult, ListQuery, Record};

/// Upper bound on pages fetched by [`RemoteEntityGateway::list_all`]
const MAX_PAGES: u32 = 100;

/// CRUD access to the remote system of record
///
/// Calls are awaited one at a time by the simulator; implementations only
/// need to be `Send + Sync` so they can sit behind an `Arc`.
#[async_trait]
pub trait RemoteEntityGateway: Send + Sync {
    /// List one page of records
    async fn list(&self, entity: EntityType, query: &ListQuery) -> GatewayResult<Vec<Record>>;

    /// Fetch a record by id
    async fn get(&self, entity: EntityType, id: &str) -> GatewayResult<Record>;

    /// Create a record; the remote side assigns the id
    async fn create(&self, entity: EntityType, payload: Value) -> GatewayResult<Record>;

    /// Update fields of an existing record
    async fn update(&self, entity: EntityType, id: &str, payload: Value) -> GatewayResult<Record>;

    /// Delete a record
    async fn delete(&self, entity: EntityType, id: &str) -> GatewayResult<()>;

    /// Follow pages until a short page comes back
    async fn list_all(&self, entity: EntityType, filter: Option<Filter>) -> GatewayResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut query = ListQuery::new();
        query.filter = filter;

        for _ in 0..MAX_PAGES {
            let page = self.list(entity, &query).await?;
            let fetched = page.len() as u32;
            records.extend(page);
            if fetched < query.limit {
                return Ok(records);
            }
            query.offset += fetched;
        }

        tracing::warn!(
            entity = %entity,
            fetched = records.len(),
            "list_all stopped at page limit"
        );
        Ok(records)
    }
}

/// Serialize a typed payload into the JSON object the gateway expects
pub fn to_payload<T: Serialize>(payload: &T) -> GatewayResult<Value> {
    Ok(serde_json::to_value(payload)?)
}

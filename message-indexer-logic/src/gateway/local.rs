use super::{MessageGateway, MessageQuery, QueryError, SortDirection};
use crate::{repository, types::IndexedMessage};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, Order};
use std::sync::Arc;

/// Gateway backed by the local entity store.
pub struct LocalGateway {
    db: Arc<DatabaseConnection>,
}

impl LocalGateway {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageGateway for LocalGateway {
    async fn query(&self, request: &MessageQuery) -> Result<Vec<IndexedMessage>, QueryError> {
        let order = match request.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let items = repository::messages::find_recent(
            &self.db,
            request.limit,
            request.sender_filter.as_deref(),
            order,
        )
        .await?;
        Ok(items)
    }
}

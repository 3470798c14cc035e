use crate::types::IndexedMessage;
use entity::indexed_messages::{ActiveModel, Column, Entity};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Write-once insert keyed by id. Returns whether a new row was inserted; a
/// conflict on an existing id leaves the stored row untouched, which is what
/// makes replayed and concurrently duplicated upstream events safe.
pub async fn upsert<C: ConnectionTrait>(db: &C, msg: IndexedMessage) -> Result<bool, anyhow::Error> {
    let active: ActiveModel = msg.into();
    let inserted = Entity::insert(active)
        .on_conflict(OnConflict::column(Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(inserted > 0)
}

/// Up to `limit` messages ordered by timestamp (`order`), ties broken by id
/// ascending so equal-timestamp results are deterministic. `sender` filters
/// by exact address match.
pub async fn find_recent(
    db: &DatabaseConnection,
    limit: u64,
    sender: Option<&str>,
    order: Order,
) -> Result<Vec<IndexedMessage>, anyhow::Error> {
    let mut query = Entity::find();
    if let Some(sender) = sender {
        query = query.filter(Column::Sender.eq(sender));
    }
    let models = query
        .order_by(Column::Timestamp, order)
        .order_by_asc(Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(models.into_iter().map(IndexedMessage::from).collect())
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<IndexedMessage>, anyhow::Error> {
    let model = Entity::find_by_id(id).one(db).await?;
    Ok(model.map(IndexedMessage::from))
}

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
};

use super::{Reading, ReadingStore, StoreResult};
use crate::entity::readings;

/// [`ReadingStore`] backed by the `readings` table.
///
/// Holds the process-wide connection pool; clones share the pool.
#[derive(Clone)]
pub struct PostgresReadingStore {
    db: DatabaseConnection,
}

impl PostgresReadingStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<readings::Model> for Reading {
    fn from(row: readings::Model) -> Self {
        Self {
            timestamp: row.ts.map(|ts| ts.with_timezone(&Utc)),
            ph: row.ph,
            temperature: row.temp,
            outlets: [row.outlet1, row.outlet2, row.outlet3, row.outlet4],
        }
    }
}

#[async_trait]
impl ReadingStore for PostgresReadingStore {
    async fn fetch_recent_readings(&self, limit: u64) -> StoreResult<Vec<Reading>> {
        let rows = readings::Entity::find()
            .order_by_with_nulls(readings::Column::Ts, Order::Desc, NullOrdering::Last)
            .limit(limit)
            .all(&self.db)
            .await?;

        tracing::debug!(limit, fetched = rows.len(), "recent_readings_fetched");
        Ok(rows.into_iter().map(Reading::from).collect())
    }

    async fn fetch_latest_reading(&self) -> StoreResult<Option<Reading>> {
        let row = readings::Entity::find()
            .filter(readings::Column::Ts.is_not_null())
            .order_by_desc(readings::Column::Ts)
            .one(&self.db)
            .await?;

        Ok(row.map(Reading::from))
    }
}

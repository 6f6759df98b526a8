use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::query::sort_newest_first;
use crate::{
    Direction, LedgerStoreError, MovementId, MovementQuery, Result, StockMovement, StockSummary,
    WeightUnit,
    store::{Committed, LedgerCommit, LedgerStore, LedgerWrite},
};

const MOVEMENT_COLUMNS: &str = "id, direction, weight, amount, unit, recorded_at";

/// PostgreSQL-backed ledger store implementation.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgreSQL ledger store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    /// Runs migrations and makes sure the summary row exists.
    pub async fn initialize(&self) -> Result<()> {
        self.run_migrations().await?;
        sqlx::query(
            r#"
            INSERT INTO stock_summary (id, current_stock, total_cost, total_sales)
            VALUES (1, 0, 0, 0)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_movement(row: PgRow) -> Result<StockMovement> {
        let direction: String = row.try_get("direction")?;
        let unit: String = row.try_get("unit")?;

        Ok(StockMovement {
            id: MovementId::new(row.try_get("id")?),
            direction: Direction::from_code(&direction)
                .ok_or_else(|| LedgerStoreError::CorruptRow(format!("direction '{direction}'")))?,
            weight: row.try_get("weight")?,
            amount: row.try_get("amount")?,
            unit: WeightUnit::from_code(&unit)
                .ok_or_else(|| LedgerStoreError::CorruptRow(format!("unit '{unit}'")))?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }

    fn row_to_summary(row: PgRow) -> Result<StockSummary> {
        Ok(StockSummary {
            current_stock: row.try_get("current_stock")?,
            total_cost: row.try_get("total_cost")?,
            total_sales: row.try_get("total_sales")?,
        })
    }

    /// Distinguishes a deleted movement from a concurrently modified one
    /// after a guarded UPDATE/DELETE matched no row.
    async fn missing_or_stale(
        tx: &mut Transaction<'_, Postgres>,
        id: MovementId,
    ) -> LedgerStoreError {
        let exists: std::result::Result<Option<i64>, sqlx::Error> =
            sqlx::query_scalar("SELECT id FROM stock_movements WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(&mut **tx)
                .await;

        match exists {
            Ok(Some(_)) => LedgerStoreError::StaleMovement(id),
            Ok(None) => LedgerStoreError::MovementNotFound(id),
            Err(e) => LedgerStoreError::Database(e),
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn commit(&self, commit: LedgerCommit) -> Result<Committed> {
        // Start a transaction; dropping it without commit rolls back
        let mut tx = self.pool.begin().await?;

        // Lock the summary row so concurrent commits serialize here
        let current = sqlx::query(
            "SELECT current_stock, total_cost, total_sales FROM stock_summary WHERE id = 1 FOR UPDATE",
        )
        .fetch_optional(&mut *tx)
        .await?
        .map(Self::row_to_summary)
        .transpose()?
        .ok_or(LedgerStoreError::SummaryMissing)?;

        if let Some(required) = commit.options.required_stock
            && current.current_stock < required
        {
            return Err(LedgerStoreError::InsufficientStock {
                available: current.current_stock,
                requested: required,
            });
        }

        let row = match &commit.write {
            LedgerWrite::Insert(new) => {
                sqlx::query(&format!(
                    "INSERT INTO stock_movements (direction, weight, amount, unit, recorded_at) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {MOVEMENT_COLUMNS}"
                ))
                .bind(new.direction.code())
                .bind(new.weight)
                .bind(new.amount)
                .bind(new.direction.unit().code())
                .bind(new.recorded_at)
                .fetch_optional(&mut *tx)
                .await?
            }
            LedgerWrite::Revise {
                previous,
                weight,
                amount,
            } => {
                sqlx::query(&format!(
                    "UPDATE stock_movements SET weight = $2, amount = $3 \
                     WHERE id = $1 AND weight = $4 AND amount = $5 RETURNING {MOVEMENT_COLUMNS}"
                ))
                .bind(previous.id.as_i64())
                .bind(*weight)
                .bind(*amount)
                .bind(previous.weight)
                .bind(previous.amount)
                .fetch_optional(&mut *tx)
                .await?
            }
            LedgerWrite::Remove { previous } => {
                sqlx::query(&format!(
                    "DELETE FROM stock_movements \
                     WHERE id = $1 AND weight = $2 AND amount = $3 RETURNING {MOVEMENT_COLUMNS}"
                ))
                .bind(previous.id.as_i64())
                .bind(previous.weight)
                .bind(previous.amount)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        let movement = match (row, commit.write.target()) {
            (Some(row), _) => Self::row_to_movement(row)?,
            (None, Some(id)) => return Err(Self::missing_or_stale(&mut tx, id).await),
            (None, None) => {
                return Err(LedgerStoreError::CorruptRow(
                    "insert returned no row".to_string(),
                ));
            }
        };

        // Additive update: the stored totals are never overwritten from a read
        let summary_row = sqlx::query(
            r#"
            UPDATE stock_summary
            SET current_stock = current_stock + $1,
                total_cost = total_cost + $2,
                total_sales = total_sales + $3
            WHERE id = 1
            RETURNING current_stock, total_cost, total_sales
            "#,
        )
        .bind(commit.delta.stock)
        .bind(commit.delta.cost)
        .bind(commit.delta.sales)
        .fetch_one(&mut *tx)
        .await?;
        let summary = Self::row_to_summary(summary_row)?;

        tx.commit().await?;

        tracing::debug!(
            movement_id = %movement.id,
            current_stock = summary.current_stock,
            "ledger commit applied"
        );

        Ok(Committed { movement, summary })
    }

    async fn summary(&self) -> Result<StockSummary> {
        let row: Option<PgRow> = sqlx::query(
            "SELECT current_stock, total_cost, total_sales FROM stock_summary WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_summary(row),
            None => Err(LedgerStoreError::SummaryMissing),
        }
    }

    async fn get_movement(&self, id: MovementId) -> Result<Option<StockMovement>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_movement).transpose()
    }

    async fn list_movements(&self, query: MovementQuery) -> Result<Vec<StockMovement>> {
        let mut sql = format!("SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND recorded_at >= ${param_count}"));
        }
        if query.to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND recorded_at <= ${param_count}"));
        }

        sql.push_str(" ORDER BY recorded_at DESC, id DESC");

        let mut sqlx_query = sqlx::query(&sql);
        if let Some(from) = query.from {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.to {
            sqlx_query = sqlx_query.bind(to);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        let mut movements = rows
            .into_iter()
            .map(Self::row_to_movement)
            .collect::<Result<Vec<_>>>()?;
        // TIMESTAMPTZ keeps microseconds, so this only settles exact ties the same way as memory.
        sort_newest_first(&mut movements);
        Ok(movements)
    }
}

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use candlebin_core::{
    CandlebinError, Granularity, InstrumentId, PriceRecord, PriceStore, Symbol, SymbolCatalog,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

const STORE_NAME: &str = "sqlite";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
// Keeps each multi-row INSERT well under SQLite's bound-parameter limit.
const INSERT_CHUNK: usize = 100;

// Prices and volume are stored as exact decimal text, never as REAL.
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS ticker (
        id INTEGER PRIMARY KEY,
        symbol TEXT NOT NULL UNIQUE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS minute_price (
        ticker_id INTEGER NOT NULL REFERENCES ticker(id),
        date TEXT NOT NULL,
        time TEXT NOT NULL,
        open TEXT NOT NULL,
        high TEXT NOT NULL,
        low TEXT NOT NULL,
        close TEXT NOT NULL,
        volume TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS daily_price (
        ticker_id INTEGER NOT NULL REFERENCES ticker(id),
        date TEXT NOT NULL,
        open TEXT NOT NULL,
        high TEXT NOT NULL,
        low TEXT NOT NULL,
        close TEXT NOT NULL,
        volume TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS minute_price_by_ticker ON minute_price (ticker_id, date, time)",
    "CREATE INDEX IF NOT EXISTS daily_price_by_ticker ON daily_price (ticker_id, date)",
];

const SELECT_MINUTE: &str = r"
    SELECT date, time, open, high, low, close, volume
    FROM minute_price
    WHERE ticker_id = ?
    ORDER BY date ASC, time ASC, rowid ASC
";

const SELECT_DAILY: &str = r"
    SELECT date, '00:00:00' AS time, open, high, low, close, volume
    FROM daily_price
    WHERE ticker_id = ?
    ORDER BY date ASC, rowid ASC
";

fn db_err(e: sqlx::Error) -> CandlebinError {
    CandlebinError::store(STORE_NAME, e.to_string())
}

/// Price store and symbol catalog backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool on `url`, creating the database file if it is missing.
    ///
    /// # Errors
    /// Returns `Store` if the URL is malformed or the database cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, CandlebinError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30));
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(db_err)?;

        #[cfg(feature = "tracing")]
        tracing::info!(url, max_connections, "connected to sqlite price store");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables and indexes if they do not exist yet.
    ///
    /// # Errors
    /// Returns `Store` if a statement fails.
    pub async fn initialize(&self) -> Result<(), CandlebinError> {
        for stmt in SCHEMA {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    /// Register `symbol`, returning its identifier. Existing symbols keep theirs.
    ///
    /// # Errors
    /// Returns `Store` on driver failure.
    pub async fn insert_symbol(&self, symbol: &Symbol) -> Result<InstrumentId, CandlebinError> {
        sqlx::query("INSERT OR IGNORE INTO ticker (symbol) VALUES (?)")
            .bind(symbol.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        self.lookup(symbol)
            .await?
            .ok_or_else(|| CandlebinError::unknown_symbol(symbol.as_str()))
    }

    /// Append intraday records. Returns the number of rows written.
    ///
    /// # Errors
    /// Returns `Store` on driver failure; nothing is written in that case.
    pub async fn insert_minute(&self, records: &[PriceRecord]) -> Result<u64, CandlebinError> {
        self.insert(Granularity::SubDay, records).await
    }

    /// Append daily records; the time of day is discarded. Returns the number of rows written.
    ///
    /// # Errors
    /// Returns `Store` on driver failure; nothing is written in that case.
    pub async fn insert_daily(&self, records: &[PriceRecord]) -> Result<u64, CandlebinError> {
        self.insert(Granularity::Daily, records).await
    }

    /// Close every pooled connection. Pending queries finish first.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn lookup(&self, symbol: &Symbol) -> Result<Option<InstrumentId>, CandlebinError> {
        let row = sqlx::query("SELECT id FROM ticker WHERE symbol = ?")
            .bind(symbol.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| r.try_get::<i64, _>("id").map(InstrumentId))
            .transpose()
            .map_err(db_err)
    }

    async fn insert(
        &self,
        granularity: Granularity,
        records: &[PriceRecord],
    ) -> Result<u64, CandlebinError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for chunk in records.chunks(INSERT_CHUNK) {
            let mut qb: QueryBuilder<'_, Sqlite> = match granularity {
                Granularity::SubDay => QueryBuilder::new(
                    "INSERT INTO minute_price (ticker_id, date, time, open, high, low, close, volume) ",
                ),
                Granularity::Daily => QueryBuilder::new(
                    "INSERT INTO daily_price (ticker_id, date, open, high, low, close, volume) ",
                ),
            };
            qb.push_values(chunk, |mut b, r| {
                b.push_bind(r.instrument_id.0)
                    .push_bind(r.timestamp.format(DATE_FORMAT).to_string());
                if granularity == Granularity::SubDay {
                    b.push_bind(r.timestamp.format(TIME_FORMAT).to_string());
                }
                b.push_bind(r.open.to_string())
                    .push_bind(r.high.to_string())
                    .push_bind(r.low.to_string())
                    .push_bind(r.close.to_string())
                    .push_bind(r.volume.to_string());
            });
            qb.build().execute(&mut *tx).await.map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(records.len() as u64)
    }
}

fn parse_decimal(row: &SqliteRow, column: &str, at: &str) -> Result<Decimal, CandlebinError> {
    let raw: String = row.try_get(column).map_err(db_err)?;
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| CandlebinError::DataIntegrity(format!("unparsable {column} {raw:?} at {at}")))
}

fn parse_row(instrument: InstrumentId, row: &SqliteRow) -> Result<PriceRecord, CandlebinError> {
    let date: String = row.try_get("date").map_err(db_err)?;
    let time: String = row.try_get("time").map_err(db_err)?;
    let at = format!("{date} {time}");
    let d = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|_| CandlebinError::DataIntegrity(format!("unparsable date {date:?}")))?;
    let t = NaiveTime::parse_from_str(&time, TIME_FORMAT)
        .map_err(|_| CandlebinError::DataIntegrity(format!("unparsable time {time:?} on {date}")))?;
    Ok(PriceRecord {
        instrument_id: instrument,
        timestamp: NaiveDateTime::new(d, t),
        open: parse_decimal(row, "open", &at)?,
        high: parse_decimal(row, "high", &at)?,
        low: parse_decimal(row, "low", &at)?,
        close: parse_decimal(row, "close", &at)?,
        volume: parse_decimal(row, "volume", &at)?,
    })
}

#[async_trait]
impl PriceStore for SqliteStore {
    fn name(&self) -> &'static str {
        STORE_NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candlebin::sqlite::fetch",
            skip(self),
            fields(instrument = %instrument, granularity = %granularity),
        )
    )]
    async fn fetch(
        &self,
        instrument: InstrumentId,
        granularity: Granularity,
    ) -> Result<Vec<PriceRecord>, CandlebinError> {
        let sql = match granularity {
            Granularity::SubDay => SELECT_MINUTE,
            Granularity::Daily => SELECT_DAILY,
        };
        let rows = sqlx::query(sql)
            .bind(instrument.0)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(rows = rows.len(), "fetched price rows");

        rows.iter().map(|r| parse_row(instrument, r)).collect()
    }
}

#[async_trait]
impl SymbolCatalog for SqliteStore {
    async fn resolve_symbol(&self, symbol: &Symbol) -> Result<InstrumentId, CandlebinError> {
        self.lookup(symbol)
            .await?
            .ok_or_else(|| CandlebinError::unknown_symbol(symbol.as_str()))
    }
}

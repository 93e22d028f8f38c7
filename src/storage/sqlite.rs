use crate::model::{NormalizedRecord, PricePerUnitStatus, StorageError};
use crate::utils::{format_datetime, parse_datetime};
use rusqlite::{params, Connection, Row};

const RECORD_COLUMNS: &str = "id, title, price, unit_text, normalized_unit_qty, normalized_unit,
     price_per_unit, price_per_unit_status, store, url, timestamp";

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file and runs migrations.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                price REAL,
                normalized_unit_qty REAL,
                normalized_unit TEXT,
                price_per_unit REAL,
                store TEXT NOT NULL,
                url TEXT,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_products_store_ts ON products (store, timestamp);
            "
        )?;

        // Databases written by earlier ingests lack these columns
        Self::migrate_add_column_if_missing(&conn, "products", "unit_text", "TEXT")?;
        Self::migrate_add_column_if_missing(
            &conn,
            "products",
            "price_per_unit_status",
            "TEXT NOT NULL DEFAULT 'missing_price'",
        )?;

        Ok(Self { conn })
    }

    /// Adds the column to the table unless it already exists.
    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    /// Inserts the batch in one transaction: either every record lands or none.
    pub fn insert_records(&mut self, records: &[NormalizedRecord]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO products ({RECORD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ))?;

            for record in records {
                stmt.execute(params![
                    &record.id,
                    &record.title,
                    &record.price,
                    &record.unit_text,
                    &record.normalized_unit_qty,
                    &record.normalized_unit,
                    &record.price_per_unit,
                    record.price_per_unit_status.as_str(),
                    &record.source,
                    &record.url,
                    format_datetime(&record.normalized_at),
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Latest `ok` record per store whose title contains `keyword`
    /// (case-insensitive), cheapest per unit first.
    pub fn latest_best_prices(&self, keyword: &str) -> Result<Vec<NormalizedRecord>, StorageError> {
        let sql = format!(
            "SELECT {cols} FROM products p
             JOIN (
                 SELECT store, MAX(timestamp) AS latest_ts
                 FROM products
                 WHERE title LIKE ?1 ESCAPE '\\' AND price_per_unit_status = 'ok'
                 GROUP BY store
             ) latest ON p.store = latest.store AND p.timestamp = latest.latest_ts
             WHERE p.title LIKE ?1 ESCAPE '\\' AND p.price_per_unit_status = 'ok'
             ORDER BY p.price_per_unit ASC, p.store ASC",
            cols = RECORD_COLUMNS
                .split(',')
                .map(|c| format!("p.{}", c.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![like_pattern(keyword)], Self::map_record)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    fn map_record(row: &Row) -> Result<NormalizedRecord, rusqlite::Error> {
        let status_str: String = row.get(7)?;
        let price_per_unit_status = PricePerUnitStatus::from_db_str(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                Box::new(StorageError::InvalidValue(format!("status '{}'", status_str))),
            )
        })?;

        let ts_str: String = row.get(10)?;
        let normalized_at = parse_datetime(&ts_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                10,
                rusqlite::types::Type::Text,
                Box::new(StorageError::InvalidValue(format!("timestamp '{}'", ts_str))),
            )
        })?;

        Ok(NormalizedRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            price: row.get(2)?,
            unit_text: row.get(3)?,
            normalized_unit_qty: row.get(4)?,
            normalized_unit: row.get(5)?,
            price_per_unit: row.get(6)?,
            price_per_unit_status,
            source: row.get(8)?,
            url: row.get(9)?,
            normalized_at,
        })
    }
}

/// `%keyword%` with LIKE wildcards in the keyword escaped.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(title: &str, store: &str, ppu: Option<f64>, minutes: i64) -> NormalizedRecord {
        let status = if ppu.is_some() {
            PricePerUnitStatus::Ok
        } else {
            PricePerUnitStatus::MissingOrZeroQty
        };
        NormalizedRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            price: Some(10.0),
            unit_text: Some(title.to_string()),
            normalized_unit_qty: ppu.map(|p| 10.0 / p),
            normalized_unit: ppu.map(|_| "unit".to_string()),
            price_per_unit: ppu,
            price_per_unit_status: status,
            source: store.to_string(),
            url: None,
            normalized_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn inserts_and_reads_back() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let rec = record("Toilet Paper 12 Rolls", "Amazon", Some(0.5), 0);
        assert_eq!(storage.insert_records(&[rec.clone()]).unwrap(), 1);

        let found = storage.latest_best_prices("toilet").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, rec.id);
        assert_eq!(found[0].price_per_unit, Some(0.5));
        assert_eq!(found[0].price_per_unit_status, PricePerUnitStatus::Ok);
        assert_eq!(found[0].normalized_at, rec.normalized_at);
        assert_eq!(found[0].unit_text, rec.unit_text);
    }

    #[test]
    fn best_prices_use_latest_ok_record_per_store_sorted_ascending() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .insert_records(&[
                record("Toilet Paper A", "Amazon", Some(0.10), 0),
                record("Toilet Paper B", "Amazon", Some(0.40), 5),
                record("Toilet Paper C", "Target", Some(0.30), 1),
                record("Toilet Paper D", "Walmart", Some(0.20), 2),
                // newer but not ok: ignored
                record("Toilet Paper E", "Walmart", None, 9),
                record("Paper Towel", "Target", Some(0.01), 10),
            ])
            .unwrap();

        let found = storage.latest_best_prices("Toilet Paper").unwrap();
        let titles: Vec<&str> = found.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Toilet Paper D", "Toilet Paper C", "Toilet Paper B"]);
    }

    #[test]
    fn keyword_wildcards_are_literal() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .insert_records(&[record("100% Cotton Balls", "Target", Some(0.02), 0)])
            .unwrap();
        assert_eq!(storage.latest_best_prices("100%").unwrap().len(), 1);
        assert!(storage.latest_best_prices("1_0").unwrap().is_empty());
    }

    #[test]
    fn batch_insert_is_all_or_nothing() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let a = record("Bars 12 ct", "Amazon", Some(1.0), 0);
        let mut dup = record("Bars 24 ct", "Amazon", Some(0.9), 1);
        dup.id = a.id.clone();

        assert!(storage.insert_records(&[a, dup]).is_err());
        let n: i64 = storage
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn migrates_legacy_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE products (
                id TEXT PRIMARY KEY, title TEXT NOT NULL, price REAL,
                normalized_unit_qty REAL, normalized_unit TEXT, price_per_unit REAL,
                store TEXT NOT NULL, url TEXT, timestamp TEXT NOT NULL
            );",
        )
        .unwrap();

        let mut storage = SqliteStorage::with_connection(conn).unwrap();
        storage
            .insert_records(&[record("Protein Bar 12 ct", "Walmart", Some(1.5), 0)])
            .unwrap();
        assert_eq!(storage.latest_best_prices("protein bar").unwrap().len(), 1);
    }
}

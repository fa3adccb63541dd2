use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use uuid::Uuid;

use super::Repository;
use super::fold::{FlyerRow, fold_rows};
use super::schema::SCHEMA;
use crate::error::{Error, Result, WriteStep};
use crate::types::*;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteRepository {
    conn: Mutex<Connection>,
    date_policy: DatePolicy,
}

impl SqliteRepository {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self {
            conn: Mutex::new(conn),
            date_policy: DatePolicy::default(),
        })
    }

    #[must_use]
    pub fn with_date_policy(mut self, date_policy: DatePolicy) -> Self {
        self.date_policy = date_policy;
        self
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Fixed-width so that text ordering matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A table whose rows are shared and looked up by exact name.
struct NamedTable {
    lookup: &'static str,
    query_step: WriteStep,
    insert_step: WriteStep,
}

const STORES: NamedTable = NamedTable {
    lookup: "SELECT id FROM stores WHERE name = ?1",
    query_step: WriteStep::QueryStore,
    insert_step: WriteStep::InsertStore,
};

const PRODUCTS: NamedTable = NamedTable {
    lookup: "SELECT id FROM products WHERE name = ?1",
    query_step: WriteStep::QueryProduct,
    insert_step: WriteStep::InsertProduct,
};

fn find_id(tx: &Transaction<'_>, table: &NamedTable, name: &str) -> Result<Option<String>> {
    tx.query_row(table.lookup, params![name], |row| row.get(0))
        .optional()
        .map_err(Error::write(table.query_step))
}

/// Settles the outcome of inserting a fresh named row.
///
/// A uniqueness violation means another writer created the same name after
/// our lookup, so the row is re-read once and reused.
fn reuse_on_conflict(
    tx: &Transaction<'_>,
    table: &NamedTable,
    name: &str,
    id: String,
    inserted: rusqlite::Result<usize>,
) -> Result<String> {
    match inserted {
        Ok(_) => Ok(id),
        Err(rusqlite::Error::SqliteFailure(err, msg))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            match find_id(tx, table, name)? {
                Some(existing) => {
                    tracing::debug!(
                        "'{}' was created concurrently in {}, reusing {}",
                        name,
                        table.insert_step.table(),
                        existing
                    );
                    Ok(existing)
                }
                None => {
                    tracing::error!(
                        "Conflict on {} for '{}' but no row found on re-read",
                        table.insert_step.table(),
                        name
                    );
                    Err(Error::Write {
                        step: table.insert_step,
                        source: rusqlite::Error::SqliteFailure(err, msg),
                    })
                }
            }
        }
        Err(e) => Err(Error::Write {
            step: table.insert_step,
            source: e,
        }),
    }
}

fn find_or_create_store(tx: &Transaction<'_>, store: &StoreInfo, now: &str) -> Result<String> {
    if let Some(id) = find_id(tx, &STORES, &store.name)? {
        tracing::debug!("Reusing store '{}' ({})", store.name, id);
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    let inserted = tx.execute(
        "INSERT INTO stores (id, name, prefecture, city, street, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![id, store.name, store.prefecture, store.city, store.street, now],
    );
    let id = reuse_on_conflict(tx, &STORES, &store.name, id, inserted)?;
    tracing::debug!("Created store '{}' ({})", store.name, id);
    Ok(id)
}

fn find_or_create_product(tx: &Transaction<'_>, product: &ProductInfo, now: &str) -> Result<String> {
    if let Some(id) = find_id(tx, &PRODUCTS, &product.name)? {
        tracing::debug!("Reusing product '{}' ({})", product.name, id);
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    let inserted = tx.execute(
        "INSERT INTO products (id, name, category, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![id, product.name, product.category, now],
    );
    let id = reuse_on_conflict(tx, &PRODUCTS, &product.name, id, inserted)?;
    tracing::debug!("Created product '{}' ({})", product.name, id);
    Ok(id)
}

fn insert_campaign(tx: &Transaction<'_>, campaign: &Campaign) -> Result<()> {
    tx.execute(
        "INSERT INTO campaigns (id, flyer_id, name, start_date, end_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            campaign.id,
            campaign.flyer_id,
            campaign.name,
            campaign.start_date.map(|d| d.to_string()),
            campaign.end_date.map(|d| d.to_string()),
            format_datetime(&campaign.created_at),
            format_datetime(&campaign.updated_at),
        ],
    )
    .map_err(Error::write(WriteStep::InsertCampaign))?;
    Ok(())
}

fn link_campaign_store(tx: &Transaction<'_>, link: &CampaignStore) -> Result<()> {
    tx.execute(
        "INSERT INTO campaign_stores (campaign_id, store_id) VALUES (?1, ?2)",
        params![link.campaign_id, link.store_id],
    )
    .map_err(Error::write(WriteStep::LinkCampaignStore))?;
    Ok(())
}

fn insert_flyer_item(tx: &Transaction<'_>, item: &FlyerItem) -> Result<()> {
    tx.execute(
        "INSERT INTO flyer_items (id, campaign_id, product_id, price_excluding_tax,
             price_including_tax, unit, restriction_note, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            item.id,
            item.campaign_id,
            item.product_id,
            item.price_excluding_tax,
            item.price_including_tax,
            item.unit,
            item.restriction_note,
            format_datetime(&item.created_at),
            format_datetime(&item.updated_at),
        ],
    )
    .map_err(Error::write(WriteStep::InsertFlyerItem))?;
    Ok(())
}

const FLYER_BY_STORE: &str = "
    SELECT
        f.id, f.image_data, f.created_at, f.updated_at,
        s.id, s.name, s.prefecture, s.city, s.street,
        c.name, c.start_date, c.end_date,
        p.name, p.category,
        fi.price_excluding_tax, fi.price_including_tax, fi.unit, fi.restriction_note
    FROM flyers f
    JOIN campaigns c ON f.id = c.flyer_id
    JOIN campaign_stores cs ON c.id = cs.campaign_id
    JOIN stores s ON cs.store_id = s.id
    LEFT JOIN flyer_items fi ON c.id = fi.campaign_id
    LEFT JOIN products p ON fi.product_id = p.id
    WHERE s.id = ?1
    ORDER BY f.created_at DESC, f.rowid DESC, p.name ASC, fi.rowid ASC";

fn campaign_date(stored: Option<String>) -> String {
    format_campaign_date(stored.as_deref().and_then(parse_campaign_date))
}

fn flyer_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FlyerRow> {
    let item = match row.get::<_, Option<String>>(12)? {
        Some(name) => Some(FlyerItemInfo {
            product: ProductInfo {
                name,
                category: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
            },
            price_excluding_tax: row.get::<_, Option<i64>>(14)?.unwrap_or_default(),
            price_including_tax: row.get::<_, Option<i64>>(15)?.unwrap_or_default(),
            unit: row.get::<_, Option<String>>(16)?.unwrap_or_default(),
            restriction_note: row.get::<_, Option<String>>(17)?.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(FlyerRow {
        flyer_id: row.get(0)?,
        image_data: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
        store_id: row.get(4)?,
        store: StoreInfo {
            name: row.get(5)?,
            prefecture: row.get(6)?,
            city: row.get(7)?,
            street: row.get(8)?,
        },
        campaign: CampaignInfo {
            name: row.get(9)?,
            start_date: campaign_date(row.get(10)?),
            end_date: campaign_date(row.get(11)?),
        },
        item,
    })
}

fn store_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get(0)?,
        name: row.get(1)?,
        prefecture: row.get(2)?,
        city: row.get(3)?,
        street: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

impl Repository for SqliteRepository {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Flyer operations

    fn save_flyer(&self, image_data: &[u8], analysis: &FlyerAnalysis) -> Result<SavedFlyer> {
        let campaign = &analysis.campaign;
        let start_date = self.date_policy.parse("start_date", &campaign.start_date)?;
        let end_date = self.date_policy.parse("end_date", &campaign.end_date)?;

        let mut conn = self.conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(Error::TransactionStart)?;

        let now = Utc::now();
        let stamp = format_datetime(&now);

        let flyer = Flyer {
            id: Uuid::new_v4().to_string(),
            image_data: image_data.to_vec(),
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO flyers (id, image_data, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![flyer.id, flyer.image_data, stamp],
        )
        .map_err(Error::write(WriteStep::InsertFlyer))?;

        let store_id = find_or_create_store(&tx, &analysis.store, &stamp)?;

        let campaign_row = Campaign {
            id: Uuid::new_v4().to_string(),
            flyer_id: flyer.id.clone(),
            name: campaign.name.clone(),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        };
        insert_campaign(&tx, &campaign_row)?;

        link_campaign_store(
            &tx,
            &CampaignStore {
                campaign_id: campaign_row.id.clone(),
                store_id: store_id.clone(),
            },
        )?;

        for item in &analysis.items {
            let product_id = find_or_create_product(&tx, &item.product, &stamp)?;

            insert_flyer_item(
                &tx,
                &FlyerItem {
                    id: Uuid::new_v4().to_string(),
                    campaign_id: campaign_row.id.clone(),
                    product_id,
                    price_excluding_tax: item.price_excluding_tax,
                    price_including_tax: item.price_including_tax,
                    unit: item.unit.clone(),
                    restriction_note: item.restriction_note.clone(),
                    created_at: now,
                    updated_at: now,
                },
            )?;
        }

        tx.commit().map_err(|e| {
            tracing::error!("Transaction commit failed for flyer {}: {}", flyer.id, e);
            Error::Commit(e)
        })?;

        tracing::info!(
            "Saved flyer {} for store {} with {} items",
            flyer.id,
            store_id,
            analysis.items.len()
        );

        Ok(SavedFlyer { flyer, store_id })
    }

    fn get_flyer_by_store_id(&self, store_id: &str) -> Result<Option<StoredFlyer>> {
        tracing::debug!("Loading flyer for store {}", store_id);

        let conn = self.conn();
        let mut stmt = conn.prepare(FLYER_BY_STORE).map_err(Error::Query)?;
        let rows = stmt
            .query_map(params![store_id], flyer_row)
            .map_err(Error::Query)?;

        fold_rows(rows).map_err(Error::Query)
    }

    // Store operations

    fn create_store(&self, info: &StoreInfo) -> Result<Store> {
        let now = Utc::now();
        let store = Store {
            id: Uuid::new_v4().to_string(),
            name: info.name.clone(),
            prefecture: info.prefecture.clone(),
            city: info.city.clone(),
            street: info.street.clone(),
            created_at: now,
            updated_at: now,
        };

        let result = self.conn().execute(
            "INSERT INTO stores (id, name, prefecture, city, street, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                store.id,
                store.name,
                store.prefecture,
                store.city,
                store.street,
                format_datetime(&now),
            ],
        );

        match result {
            Ok(_) => {
                tracing::info!("Created store '{}' ({})", store.name, store.id);
                Ok(store)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::write(WriteStep::InsertStore)(e)),
        }
    }

    fn get_store(&self, id: &str) -> Result<Option<Store>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, prefecture, city, street, created_at, updated_at
             FROM stores WHERE id = ?1",
            params![id],
            store_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_store_by_name(&self, name: &str) -> Result<Option<Store>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, prefecture, city, street, created_at, updated_at
             FROM stores WHERE name = ?1",
            params![name],
            store_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_stores(&self) -> Result<Vec<Store>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, prefecture, city, street, created_at, updated_at
             FROM stores ORDER BY name",
        )?;

        let rows = stmt.query_map([], store_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Product operations

    fn get_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, category, created_at, updated_at FROM products WHERE name = ?1",
            params![name],
            |row| {
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }
}

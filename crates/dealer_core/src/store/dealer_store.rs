//! Dealer store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/get_all/save/update over the `Dealer` table.
//! - Map rows to `Dealer` explicitly, column by column.
//!
//! # Invariants
//! - Reads use a replica connection; update's prior-row lookup and all
//!   writes use the master.
//! - `save` only accepts dealers without an id.
//! - Write paths run `pre_save()`/`pre_update()` then `is_valid()` before SQL.
//! - An update must touch exactly one row.

use crate::model::app_error::{AppError, AppResult};
use crate::model::dealer::{Dealer, DealerUpdate};
use crate::store::query::SelectBuilder;
use crate::store::SqlStore;
use log::{debug, warn};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;

pub const DEALER_TABLE: &str = "Dealer";

// Column order is relied on by `read_dealer_row`.
const DEALER_COLUMNS: [&str; 12] = [
    "d.Id",
    "d.CreateAt",
    "d.UpdateAt",
    "d.DeleteAt",
    "d.Name",
    "d.PhoneNumber",
    "d.Address",
    "d.City",
    "d.Province",
    "d.Country",
    "d.PostalCode",
    "d.Brands",
];

/// Repository interface for dealer persistence.
pub trait DealerStore {
    /// Fetches one dealer by id; a missing row is a not-found error.
    fn get(&self, id: &str) -> AppResult<Dealer>;
    /// Fetches every dealer ordered by name ascending.
    fn get_all(&self) -> AppResult<Vec<Dealer>>;
    /// Inserts a new dealer and returns it with id and timestamps assigned.
    fn save(&self, dealer: Dealer) -> AppResult<Dealer>;
    /// Updates an existing dealer and returns the before/after snapshots.
    ///
    /// Unless `trusted_update_data` is set, descriptive fields are reloaded
    /// from the stored row so only `delete_at` and `brands` change.
    fn update(&self, dealer: Dealer, trusted_update_data: bool) -> AppResult<DealerUpdate>;
}

/// SQLite-backed dealer store.
pub struct SqlDealerStore<'store> {
    store: &'store SqlStore,
    // Starting point for every query returning dealers.
    dealers_query: SelectBuilder,
}

impl<'store> SqlDealerStore<'store> {
    /// Constructs a store over a migrated `SqlStore`.
    ///
    /// # Errors
    /// - Returns an internal error when the `Dealer` table is missing.
    pub fn try_new(store: &'store SqlStore) -> AppResult<Self> {
        ensure_dealer_table(store.get_master())?;
        Ok(Self {
            store,
            dealers_query: SelectBuilder::select(DEALER_COLUMNS)
                .from(format!("{DEALER_TABLE} d")),
        })
    }

    fn find_by_id(
        &self,
        conn: &Connection,
        id: &str,
        location: &'static str,
        error_id: &str,
    ) -> AppResult<Option<Dealer>> {
        let (sql, args) = self
            .dealers_query
            .clone()
            .where_eq("d.Id", id.to_string())
            .to_sql()
            .map_err(|err| failure(location, error_id, id, err))?;

        conn.query_row(&sql, params_from_iter(args), read_dealer_row)
            .optional()
            .map_err(|err| failure(location, error_id, id, err))
    }
}

impl DealerStore for SqlDealerStore<'_> {
    fn get(&self, id: &str) -> AppResult<Dealer> {
        const LOCATION: &str = "SqlDealerStore.Get";

        self.find_by_id(
            self.store.get_replica(),
            id,
            LOCATION,
            "store.sql_dealer.get.app_error",
        )?
        .ok_or_else(|| {
            AppError::not_found(
                LOCATION,
                "store.sql_dealer.missing.app_error",
                format!("dealer_id={id}"),
            )
        })
    }

    fn get_all(&self) -> AppResult<Vec<Dealer>> {
        const LOCATION: &str = "SqlDealerStore.GetAll";

        let (sql, args) = self
            .dealers_query
            .clone()
            .order_by("d.Name ASC")
            .to_sql()
            .map_err(|err| {
                AppError::internal(LOCATION, "store.sql_dealer.app_error", err.to_string())
                    .with_source(err)
            })?;

        let read_all = || -> rusqlite::Result<Vec<Dealer>> {
            let conn = self.store.get_replica();
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args), read_dealer_row)?;
            rows.collect()
        };

        read_all().map_err(|err| {
            AppError::internal(LOCATION, "store.sql_dealer.get.app_error", err.to_string())
                .with_source(err)
        })
    }

    fn save(&self, mut dealer: Dealer) -> AppResult<Dealer> {
        const LOCATION: &str = "SqlDealerStore.Save";

        if !dealer.id.is_empty() {
            return Err(AppError::bad_request(
                LOCATION,
                "store.sql_dealer.save.existing.app_error",
                format!("dealer_id={}", dealer.id),
            ));
        }

        dealer.pre_save();
        dealer.is_valid()?;

        let brands = encode_brands(&dealer)
            .map_err(|err| failure(LOCATION, "store.sql_dealer.save.app_error", &dealer.id, err))?;

        self.store
            .get_master()
            .execute(
                "INSERT INTO Dealer (
                    Id,
                    CreateAt,
                    UpdateAt,
                    DeleteAt,
                    Name,
                    PhoneNumber,
                    Address,
                    City,
                    Province,
                    Country,
                    PostalCode,
                    Brands
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
                params![
                    dealer.id.as_str(),
                    dealer.create_at,
                    dealer.update_at,
                    dealer.delete_at,
                    dealer.name.as_str(),
                    dealer.phone_number.as_str(),
                    dealer.address.as_str(),
                    dealer.city.as_str(),
                    dealer.province.as_str(),
                    dealer.country.as_str(),
                    dealer.postal_code.as_str(),
                    brands,
                ],
            )
            .map_err(|err| {
                warn!(
                    "event=dealer_save module=store status=error dealer_id={} error={}",
                    dealer.id, err
                );
                failure(LOCATION, "store.sql_dealer.save.app_error", &dealer.id, err)
            })?;

        debug!(
            "event=dealer_save module=store status=ok dealer_id={}",
            dealer.id
        );
        Ok(dealer)
    }

    fn update(&self, mut dealer: Dealer, trusted_update_data: bool) -> AppResult<DealerUpdate> {
        const LOCATION: &str = "SqlDealerStore.Update";

        dealer.pre_update();
        dealer.is_valid()?;

        let master = self.store.get_master();
        let old = self
            .find_by_id(
                master,
                &dealer.id,
                LOCATION,
                "store.sql_dealer.update.finding.app_error",
            )?
            .ok_or_else(|| {
                AppError::bad_request(
                    LOCATION,
                    "store.sql_dealer.update.find.app_error",
                    format!("dealer_id={}", dealer.id),
                )
            })?;

        dealer.create_at = old.create_at;
        if !trusted_update_data {
            dealer.name.clone_from(&old.name);
            dealer.phone_number.clone_from(&old.phone_number);
            dealer.address.clone_from(&old.address);
            dealer.city.clone_from(&old.city);
            dealer.province.clone_from(&old.province);
            dealer.country.clone_from(&old.country);
            dealer.postal_code.clone_from(&old.postal_code);
        }

        let brands = encode_brands(&dealer).map_err(|err| {
            failure(LOCATION, "store.sql_dealer.update.updating.app_error", &dealer.id, err)
        })?;

        let count = master
            .execute(
                "UPDATE Dealer
                 SET
                    CreateAt = ?1,
                    UpdateAt = ?2,
                    DeleteAt = ?3,
                    Name = ?4,
                    PhoneNumber = ?5,
                    Address = ?6,
                    City = ?7,
                    Province = ?8,
                    Country = ?9,
                    PostalCode = ?10,
                    Brands = ?11
                 WHERE Id = ?12;",
                params![
                    dealer.create_at,
                    dealer.update_at,
                    dealer.delete_at,
                    dealer.name.as_str(),
                    dealer.phone_number.as_str(),
                    dealer.address.as_str(),
                    dealer.city.as_str(),
                    dealer.province.as_str(),
                    dealer.country.as_str(),
                    dealer.postal_code.as_str(),
                    brands,
                    dealer.id.as_str(),
                ],
            )
            .map_err(|err| {
                failure(LOCATION, "store.sql_dealer.update.updating.app_error", &dealer.id, err)
            })?;

        if count != 1 {
            warn!(
                "event=dealer_update module=store status=error dealer_id={} count={}",
                dealer.id, count
            );
            return Err(AppError::internal(
                LOCATION,
                "store.sql_dealer.update.app_error",
                format!("dealer_id={}, count={count}", dealer.id),
            ));
        }

        debug!(
            "event=dealer_update module=store status=ok dealer_id={} trusted={}",
            dealer.id, trusted_update_data
        );
        Ok(DealerUpdate { old, new: dealer })
    }
}

fn failure(
    location: &'static str,
    error_id: &str,
    dealer_id: &str,
    err: impl Error + Send + Sync + 'static,
) -> AppError {
    AppError::internal(location, error_id, format!("dealer_id={dealer_id}, {err}")).with_source(err)
}

fn ensure_dealer_table(conn: &Connection) -> AppResult<()> {
    const LOCATION: &str = "SqlDealerStore.TryNew";

    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [DEALER_TABLE],
            |row| row.get(0),
        )
        .map_err(|err| {
            AppError::internal(LOCATION, "store.sql_dealer.app_error", err.to_string())
                .with_source(err)
        })?;

    if !exists {
        return Err(AppError::internal(
            LOCATION,
            "store.sql_dealer.missing_table.app_error",
            format!("table {DEALER_TABLE} does not exist"),
        ));
    }
    Ok(())
}

fn encode_brands(dealer: &Dealer) -> serde_json::Result<String> {
    serde_json::to_string(&dealer.brands)
}

fn read_dealer_row(row: &Row<'_>) -> rusqlite::Result<Dealer> {
    let brands_text: String = row.get(11)?;
    let brands = serde_json::from_str::<Option<Vec<String>>>(&brands_text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(err)))?
        .unwrap_or_default();

    Ok(Dealer {
        id: row.get(0)?,
        create_at: row.get(1)?,
        update_at: row.get(2)?,
        delete_at: row.get(3)?,
        name: row.get(4)?,
        phone_number: row.get(5)?,
        address: row.get(6)?,
        city: row.get(7)?,
        province: row.get(8)?,
        country: row.get(9)?,
        postal_code: row.get(10)?,
        brands,
    })
}

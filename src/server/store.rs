//! DuckDB-backed account store
//!
//! Filterable attributes are kept in their own columns next to the full
//! attributes record, so listing never has to look inside the JSON.

use crate::error::{Error, Result};
use crate::pagination::{FilterDimension, PageDescriptor, MAX_ROWS};
use crate::types::{AccountAttributes, AccountResource, NewAccount, ACCOUNT_TYPE};
use chrono::Utc;
use duckdb::{params, params_from_iter, Connection, OptionalExt};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// DuckDB location meaning "no file"
pub const IN_MEMORY: &str = ":memory:";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS account (
    id VARCHAR PRIMARY KEY,
    organisation_id VARCHAR NOT NULL,
    version BIGINT NOT NULL DEFAULT 0,
    account_number VARCHAR,
    bank_id VARCHAR,
    bank_id_code VARCHAR,
    country VARCHAR NOT NULL,
    customer_id VARCHAR,
    iban VARCHAR,
    created_on VARCHAR NOT NULL,
    modified_on VARCHAR,
    record VARCHAR NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT id, organisation_id, version, record FROM account";

/// Outcome of a versioned delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// The account exists with another version
    VersionMismatch,
}

/// Account persistence.
///
/// DuckDB calls are blocking; every operation runs on the blocking pool with
/// the connection held behind a mutex.
#[derive(Clone)]
pub struct AccountStore {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl AccountStore {
    /// Open a store at `location`, or in memory for [`IN_MEMORY`]
    pub fn open(location: &str) -> Result<Self> {
        if location == IN_MEMORY {
            return Self::in_memory();
        }
        let conn = Connection::open(Path::new(location))
            .map_err(|e| Error::store(format!("Failed to open DuckDB at '{location}': {e}")))?;
        Self::init(conn, location)
    }

    /// Open a fresh in-memory store
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::store(format!("Failed to create DuckDB connection: {e}")))?;
        Self::init(conn, IN_MEMORY)
    }

    fn init(conn: Connection, location: &str) -> Result<Self> {
        conn.execute_batch(CREATE_TABLE)?;
        debug!("Account store ready at {}", location);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: location.to_string(),
        })
    }

    /// Where the data lives
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Insert a new account at version 0.
    ///
    /// Fails with [`Error::AccountExists`] if the id is taken.
    pub async fn insert(&self, account: NewAccount) -> Result<AccountResource> {
        self.with_conn(move |conn| {
            let exists: i64 = conn.query_row(
                "SELECT COUNT(*) FROM account WHERE id = ?",
                params![account.id],
                |row| row.get(0),
            )?;
            if exists > 0 {
                return Err(Error::AccountExists { id: account.id });
            }

            let attrs = &account.attributes;
            let record = serde_json::to_string(attrs)?;
            let now = Utc::now().to_rfc3339();

            let filter_columns: Vec<&str> =
                FilterDimension::ALL.iter().map(|d| d.field()).collect();
            let sql = format!(
                "INSERT INTO account (id, organisation_id, version, {}, created_on, modified_on, \
                 record) VALUES (?, ?, 0, {}, ?, ?, ?)",
                filter_columns.join(", "),
                vec!["?"; filter_columns.len()].join(", ")
            );

            let mut values: Vec<Option<&str>> =
                vec![Some(account.id.as_str()), Some(account.organisation_id.as_str())];
            values.extend(FilterDimension::ALL.iter().map(|d| attrs.filter_value(*d)));
            values.extend([Some(now.as_str()), Some(now.as_str()), Some(record.as_str())]);
            conn.execute(&sql, params_from_iter(values))?;

            debug!(id = %account.id, "Inserted account");
            Ok(AccountResource {
                resource_type: ACCOUNT_TYPE.to_string(),
                id: account.id,
                organisation_id: account.organisation_id,
                version: 0,
                attributes: Some(account.attributes),
            })
        })
        .await
    }

    /// Look up one account
    pub async fn get(&self, id: &str) -> Result<Option<AccountResource>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?"),
                    params![id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;

            row.map(|(id, org, version, record)| to_resource(id, org, version, &record))
                .transpose()
        })
        .await
    }

    /// One page of accounts ordered by id.
    ///
    /// Values within a filter dimension are alternatives; dimensions must
    /// all match.
    pub async fn list(&self, page: &PageDescriptor) -> Result<Vec<AccountResource>> {
        let page = page.clone();
        self.with_conn(move |conn| {
            let mut sql = SELECT_COLUMNS.to_string();
            let mut clauses = Vec::new();
            let mut values: Vec<String> = Vec::new();

            for dimension in FilterDimension::ALL {
                let wanted = page.filter.values(dimension);
                if wanted.is_empty() {
                    continue;
                }
                let placeholders = vec!["?"; wanted.len()].join(", ");
                clauses.push(format!("{} IN ({placeholders})", dimension.field()));
                values.extend(wanted.iter().cloned());
            }

            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(&format!(
                " ORDER BY id LIMIT {} OFFSET {}",
                page.effective_page_size().min(MAX_ROWS),
                page.offset().min(MAX_ROWS)
            ));

            debug!("Executing query: {}", sql);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?;

            let mut accounts = Vec::new();
            for row in rows {
                let (id, org, version, record) = row?;
                accounts.push(to_resource(id, org, version, &record)?);
            }
            Ok(accounts)
        })
        .await
    }

    /// Delete an account if it is at `version`
    pub async fn delete(&self, id: &str, version: i64) -> Result<DeleteOutcome> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let current: Option<i64> = conn
                .query_row(
                    "SELECT version FROM account WHERE id = ?",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;

            match current {
                None => Ok(DeleteOutcome::NotFound),
                Some(current) if current != version => Ok(DeleteOutcome::VersionMismatch),
                Some(_) => {
                    conn.execute(
                        "DELETE FROM account WHERE id = ? AND version = ?",
                        params![id, version],
                    )?;
                    debug!(id = %id, version, "Deleted account");
                    Ok(DeleteOutcome::Deleted)
                }
            }
        })
        .await
    }

    /// Number of stored accounts
    pub async fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM account", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::store("Account store lock poisoned"))?;
            f(&guard)
        })
        .await
        .map_err(|e| Error::store(format!("Store task failed: {e}")))?
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

fn to_resource(
    id: String,
    organisation_id: String,
    version: i64,
    record: &str,
) -> Result<AccountResource> {
    let attributes: AccountAttributes = serde_json::from_str(record)
        .map_err(|e| Error::store(format!("Corrupt record for account {id}: {e}")))?;
    Ok(AccountResource {
        resource_type: ACCOUNT_TYPE.to_string(),
        id,
        organisation_id,
        version,
        attributes: Some(attributes),
    })
}

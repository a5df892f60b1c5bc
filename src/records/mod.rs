//! Record accessors: list, create, update, delete and count for each farm
//! table, always on behalf of an explicit session.

mod filter;
mod profile;

pub use filter::ListFilter;
pub use profile::Profiles;
pub use coopbook_postgrest::SortOrder;

use coopbook_postgrest::{PostgrestClient, PostgrestError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{ClientOptions, CoopBookConfig};
use crate::error::{Error, Result};
use crate::models::*;
use crate::session::SessionContext;

/// A row type stored in one table.
pub trait Record: DeserializeOwned + Serialize + Send + Sync {
    const TABLE: &'static str;

    /// Ordering used when the filter does not name one.
    const DEFAULT_ORDER: (&'static str, SortOrder);

    /// Column holding the owning user's id. Owned tables are filtered by it
    /// on every read and write, and it is filled from the session on create.
    const OWNER_COLUMN: Option<&'static str> = None;

    type Draft: Draft;

    fn id(&self) -> Uuid;
}

impl Record for Coop {
    const TABLE: &'static str = "coops";
    const DEFAULT_ORDER: (&'static str, SortOrder) = ("created_at", SortOrder::Descending);
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");
    type Draft = CoopDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Chicken {
    const TABLE: &'static str = "chickens";
    const DEFAULT_ORDER: (&'static str, SortOrder) = ("created_at", SortOrder::Descending);
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");
    type Draft = ChickenDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for EggProduction {
    const TABLE: &'static str = "egg_production";
    const DEFAULT_ORDER: (&'static str, SortOrder) = ("date", SortOrder::Descending);
    type Draft = EggProductionDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Feed {
    const TABLE: &'static str = "feed";
    const DEFAULT_ORDER: (&'static str, SortOrder) = ("date", SortOrder::Descending);
    type Draft = FeedDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for HealthRecord {
    const TABLE: &'static str = "health_records";
    const DEFAULT_ORDER: (&'static str, SortOrder) = ("date", SortOrder::Descending);
    type Draft = HealthRecordDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Sale {
    const TABLE: &'static str = "sales";
    const DEFAULT_ORDER: (&'static str, SortOrder) = ("date", SortOrder::Descending);
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");
    type Draft = SaleDraft;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Everything needed to build a request against the project's REST API.
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    base_url: String,
    anon_key: String,
    db_schema: String,
    http_client: reqwest::Client,
}

impl Connection {
    pub(crate) fn new(
        config: &CoopBookConfig,
        options: &ClientOptions,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            anon_key: config.anon_key.clone(),
            db_schema: options.db_schema.clone(),
            http_client,
        }
    }

    /// Request builder for `table` without a user token.
    pub(crate) fn anonymous(&self, table: &str) -> PostgrestClient {
        PostgrestClient::new(
            &self.base_url,
            &self.anon_key,
            table,
            self.http_client.clone(),
        )
    }

    /// Request builder for `table` carrying the session's access token.
    pub(crate) fn table(&self, table: &str, session: &SessionContext) -> Result<PostgrestClient> {
        let client = self.anonymous(table).with_auth(session.bearer()?);
        if self.db_schema == "public" {
            Ok(client)
        } else {
            Ok(client.schema(&self.db_schema)?)
        }
    }
}

/// Log a failed remote call once and turn it into an application error.
pub(crate) fn remote_failure(
    table: &'static str,
    operation: &'static str,
    err: PostgrestError,
) -> Error {
    error!(table, operation, error = %err, "remote call failed");
    Error::Database(err)
}

/// CRUD access to one table
pub struct Records<R: Record> {
    conn: Connection,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for Records<R> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Records<R> {
    pub(crate) fn new(conn: Connection) -> Self {
        Self {
            conn,
            _record: PhantomData,
        }
    }

    /// Table query scoped to the session's user where the table is owned.
    fn scoped(&self, session: &SessionContext) -> Result<PostgrestClient> {
        let query = self.conn.table(R::TABLE, session)?;
        Ok(match R::OWNER_COLUMN {
            Some(column) => query.eq(column, &session.user_id().to_string()),
            None => query,
        })
    }

    /// Rows visible to the session's user. No matching rows is an empty list.
    pub async fn list(&self, session: &SessionContext, filter: &ListFilter) -> Result<Vec<R>> {
        let query = filter.apply(self.scoped(session)?, R::DEFAULT_ORDER);
        debug!(table = R::TABLE, "listing records");

        let rows = query
            .execute::<R>()
            .await
            .map_err(|e| remote_failure(R::TABLE, "list", e))?;

        debug!(table = R::TABLE, count = rows.len(), "listed records");
        Ok(rows)
    }

    pub async fn get(&self, session: &SessionContext, id: Uuid) -> Result<Option<R>> {
        let rows = self
            .scoped(session)?
            .select("*")
            .eq("id", &id.to_string())
            .limit(1)
            .execute::<R>()
            .await
            .map_err(|e| remote_failure(R::TABLE, "get", e))?;
        Ok(rows.into_iter().next())
    }

    /// Exact number of matching rows; ordering and limit are ignored.
    pub async fn count(&self, session: &SessionContext, filter: &ListFilter) -> Result<u64> {
        let query = filter.apply_conditions(self.scoped(session)?);
        let total = query
            .count()
            .await
            .map_err(|e| remote_failure(R::TABLE, "count", e))?;
        debug!(table = R::TABLE, total, "counted records");
        Ok(total)
    }

    /// Validate and insert `draft`, returning the stored row.
    pub async fn create(&self, session: &SessionContext, draft: &R::Draft) -> Result<R> {
        draft.validate()?;

        let mut body = serde_json::to_value(draft)?;
        if let (Some(column), Value::Object(fields)) = (R::OWNER_COLUMN, &mut body) {
            fields.insert(column.to_string(), Value::String(session.user_id().to_string()));
        }

        let rows = self
            .conn
            .table(R::TABLE, session)?
            .insert::<Value, R>(&body)
            .await
            .map_err(|e| remote_failure(R::TABLE, "create", e))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            remote_failure(
                R::TABLE,
                "create",
                PostgrestError::DeserializationError("insert returned no row".to_string()),
            )
        })?;
        info!(table = R::TABLE, id = %row.id(), "created record");
        Ok(row)
    }

    /// Validate and apply `draft` to row `id`, returning the updated row.
    ///
    /// A row that does not exist, or belongs to someone else, is `NotFound`.
    pub async fn update(
        &self,
        session: &SessionContext,
        id: Uuid,
        draft: &R::Draft,
    ) -> Result<R> {
        draft.validate()?;

        let mut body = serde_json::to_value(draft)?;
        if let (Some(column), Value::Object(fields)) = (R::OWNER_COLUMN, &mut body) {
            fields.remove(column);
        }

        let rows = self
            .scoped(session)?
            .eq("id", &id.to_string())
            .update::<Value, R>(&body)
            .await
            .map_err(|e| remote_failure(R::TABLE, "update", e))?;

        let row = rows.into_iter().next().ok_or_else(|| Error::NotFound {
            table: R::TABLE,
            id: id.to_string(),
        })?;
        info!(table = R::TABLE, %id, "updated record");
        Ok(row)
    }

    /// Delete row `id`. Deleting a row that is already gone succeeds.
    ///
    /// Rows still referenced by other records (a batch with production or
    /// health rows, a coop with feed rows) are refused with `StillReferenced`.
    pub async fn delete(&self, session: &SessionContext, id: Uuid) -> Result<()> {
        let result = self
            .scoped(session)?
            .eq("id", &id.to_string())
            .delete::<Value>()
            .await;

        match result {
            Ok(deleted) => {
                info!(table = R::TABLE, %id, rows = deleted.len(), "deleted record");
                Ok(())
            }
            Err(e) if e.is_foreign_key_violation() => {
                info!(table = R::TABLE, %id, "delete refused, row is still referenced");
                Err(Error::StillReferenced {
                    table: R::TABLE,
                    id: id.to_string(),
                })
            }
            Err(e) => Err(remote_failure(R::TABLE, "delete", e)),
        }
    }
}

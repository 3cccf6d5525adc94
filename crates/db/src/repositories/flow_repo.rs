//! Repository for the `flows` table.
//!
//! Flows are saved whole: nodes, edges, name, keywords and the active flag
//! are written together on every explicit save. There is no partial graph
//! update and no versioning.

use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use wabiz_core::flow::{disambiguated_name, FlowDraft};
use wabiz_core::types::{DbId, OwnerId, Timestamp};

use crate::is_unique_violation;
use crate::models::flow::{Flow, FlowSummary, SaveOutcome, SavedFlow};

/// Column list for `flows` queries.
const COLUMNS: &str = "\
    id, owner_id, name, nodes, edges, trigger_keywords, is_active, \
    created_at, updated_at";

/// Unique constraint on `(owner_id, name)`.
pub const NAME_CONSTRAINT: &str = "uq_flows_owner_name";

/// Row returned by the name-keyed upsert, flagging whether it inserted.
#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    flow: Flow,
    inserted: bool,
}

/// Provides data access for flow documents.
pub struct FlowRepo;

impl FlowRepo {
    /// Find one of the owner's flows by id.
    pub async fn find_by_id(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
    ) -> Result<Option<Flow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flows WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Flow>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Find one of the owner's flows by exact name.
    pub async fn find_by_name(
        pool: &PgPool,
        owner_id: OwnerId,
        name: &str,
    ) -> Result<Option<Flow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flows WHERE owner_id = $1 AND name = $2");
        sqlx::query_as::<_, Flow>(&query)
            .bind(owner_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List the owner's flows, most recently edited first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: OwnerId,
    ) -> Result<Vec<FlowSummary>, sqlx::Error> {
        sqlx::query_as::<_, FlowSummary>(
            "SELECT id, name, trigger_keywords, is_active, \
                    jsonb_array_length(nodes) AS node_count, updated_at \
             FROM flows WHERE owner_id = $1 \
             ORDER BY updated_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Insert a new document, or update the owner's document of the same
    /// name (`ON CONFLICT ON CONSTRAINT uq_flows_owner_name`).
    ///
    /// Returns the row and whether it was freshly inserted.
    pub async fn upsert_by_name(
        pool: &PgPool,
        owner_id: OwnerId,
        draft: &FlowDraft,
    ) -> Result<(Flow, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO flows (owner_id, name, nodes, edges, trigger_keywords, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT {NAME_CONSTRAINT} DO UPDATE SET \
                 nodes            = EXCLUDED.nodes, \
                 edges            = EXCLUDED.edges, \
                 trigger_keywords = EXCLUDED.trigger_keywords, \
                 is_active        = EXCLUDED.is_active \
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        let row = sqlx::query_as::<_, UpsertRow>(&query)
            .bind(owner_id)
            .bind(&draft.name)
            .bind(Json(&draft.nodes))
            .bind(Json(&draft.edges))
            .bind(&draft.trigger_keywords)
            .bind(draft.is_active)
            .fetch_one(pool)
            .await?;
        Ok((row.flow, row.inserted))
    }

    /// Overwrite a specific document (including its name).
    ///
    /// Returns `None` if the id does not exist or belongs to someone else.
    /// Fails with a unique violation on [`NAME_CONSTRAINT`] when the new
    /// name is taken by another of the owner's documents.
    pub async fn update_by_id(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
        draft: &FlowDraft,
    ) -> Result<Option<Flow>, sqlx::Error> {
        let query = format!(
            "UPDATE flows SET \
                 name             = $3, \
                 nodes            = $4, \
                 edges            = $5, \
                 trigger_keywords = $6, \
                 is_active        = $7 \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flow>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&draft.name)
            .bind(Json(&draft.nodes))
            .bind(Json(&draft.edges))
            .bind(&draft.trigger_keywords)
            .bind(draft.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Plain insert under an explicit name.
    pub async fn insert(
        pool: &PgPool,
        owner_id: OwnerId,
        name: &str,
        draft: &FlowDraft,
    ) -> Result<Flow, sqlx::Error> {
        let query = format!(
            "INSERT INTO flows (owner_id, name, nodes, edges, trigger_keywords, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flow>(&query)
            .bind(owner_id)
            .bind(name)
            .bind(Json(&draft.nodes))
            .bind(Json(&draft.edges))
            .bind(&draft.trigger_keywords)
            .bind(draft.is_active)
            .fetch_one(pool)
            .await
    }

    /// Persist a draft from the canvas.
    ///
    /// - Without an id the draft is upserted by `(owner_id, name)`.
    /// - With an id that document is updated. If the (possibly renamed)
    ///   name already belongs to a different document, a new document is
    ///   inserted under [`disambiguated_name`] instead; the other document
    ///   is left untouched.
    ///
    /// An id that does not belong to the owner yields `RowNotFound`.
    pub async fn save(
        pool: &PgPool,
        owner_id: OwnerId,
        draft: &FlowDraft,
        now: Timestamp,
    ) -> Result<SavedFlow, sqlx::Error> {
        let Some(id) = draft.id else {
            let (flow, inserted) = Self::upsert_by_name(pool, owner_id, draft).await?;
            let outcome = if inserted {
                SaveOutcome::Created
            } else {
                SaveOutcome::Updated
            };
            return Ok(SavedFlow { flow, outcome });
        };

        match Self::update_by_id(pool, owner_id, id, draft).await {
            Ok(Some(flow)) => Ok(SavedFlow {
                flow,
                outcome: SaveOutcome::Updated,
            }),
            Ok(None) => Err(sqlx::Error::RowNotFound),
            Err(err) if is_unique_violation(&err, NAME_CONSTRAINT) => {
                let fallback = disambiguated_name(&draft.name, now);
                tracing::warn!(
                    flow_id = id,
                    requested = %draft.name,
                    fallback = %fallback,
                    "Flow name taken by another document, saving under fallback name",
                );
                let flow = Self::insert(pool, owner_id, &fallback, draft).await?;
                Ok(SavedFlow {
                    flow,
                    outcome: SaveOutcome::Renamed,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Toggle whether a flow is marked active.
    pub async fn set_active(
        pool: &PgPool,
        owner_id: OwnerId,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Flow>, sqlx::Error> {
        let query = format!(
            "UPDATE flows SET is_active = $3 WHERE id = $1 AND owner_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flow>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a flow.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, owner_id: OwnerId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM flows WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::document::Document;
use super::schema::Schema;
use super::StoreError;

/// One named collection of documents, bound to its schema and the shared
/// pool. All SQL for a collection lives here; callers only see documents.
#[derive(Clone)]
pub struct Collection {
    schema: &'static Schema,
    pool: PgPool,
}

impl Collection {
    pub fn new(schema: &'static Schema, pool: PgPool) -> Self {
        Self { schema, pool }
    }

    fn table(&self) -> &'static str {
        self.schema.collection
    }

    /// All documents in the collection, oldest first.
    pub async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            r#"SELECT id, doc FROM "{}" ORDER BY created_at"#,
            self.table()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(document_from_row).collect()
    }

    /// Look up a document by its raw id as received from the client. An id
    /// that does not parse is a store error; an absent document is `None`.
    pub async fn find_by_id(&self, raw_id: &str) -> Result<Option<Document>, StoreError> {
        let id = parse_id(raw_id)?;
        let sql = format!(r#"SELECT id, doc FROM "{}" WHERE id = $1"#, self.table());
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(document_from_row).transpose()
    }

    /// All documents whose `field` equals `value` (text comparison on the
    /// JSON field), oldest first.
    pub async fn find_by_field(&self, field: &str, value: &str) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            r#"SELECT id, doc FROM "{}" WHERE doc->>$1 = $2 ORDER BY created_at"#,
            self.table()
        );
        let rows = sqlx::query(&sql)
            .bind(field)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(document_from_row).collect()
    }

    /// Validate a candidate document against the schema, assign an id and
    /// insert it. Returns the document as stored.
    pub async fn create(&self, body: Value) -> Result<Document, StoreError> {
        let fields = Document::fields_from_input(body)?;
        self.schema.validate_create(&fields)?;

        let id = Uuid::new_v4();
        let sql = format!(
            r#"INSERT INTO "{}" (id, doc) VALUES ($1, $2) RETURNING id, doc"#,
            self.table()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(fields))
            .fetch_one(&self.pool)
            .await?;
        document_from_row(row)
    }

    /// Apply a partial update, re-validating the patched fields against the
    /// schema, and return the document after the update. `None` when no
    /// document has this id.
    pub async fn find_and_update_by_id(
        &self,
        raw_id: &str,
        patch: Value,
    ) -> Result<Option<Document>, StoreError> {
        let id = parse_id(raw_id)?;
        let fields = Document::fields_from_input(patch)?;
        self.schema.validate_patch(&fields)?;

        // JSONB concatenation gives the shallow merge the contract asks for.
        let sql = format!(
            r#"UPDATE "{}" SET doc = doc || $2, updated_at = now() WHERE id = $1 RETURNING id, doc"#,
            self.table()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(fields))
            .fetch_optional(&self.pool)
            .await?;
        row.map(document_from_row).transpose()
    }

    /// Delete by raw id, returning the removed document, or `None` when the
    /// id resolved to nothing.
    pub async fn find_and_delete_by_id(&self, raw_id: &str) -> Result<Option<Document>, StoreError> {
        let id = parse_id(raw_id)?;
        let sql = format!(
            r#"DELETE FROM "{}" WHERE id = $1 RETURNING id, doc"#,
            self.table()
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(document_from_row).transpose()
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::MalformedId(raw.to_string()))
}

pub(crate) fn document_from_row(row: PgRow) -> Result<Document, StoreError> {
    let id: Uuid = row.try_get("id")?;
    let doc: Value = row.try_get("doc")?;
    match doc {
        Value::Object(fields) => Ok(Document { id, fields }),
        _ => Err(StoreError::MalformedDocument(id)),
    }
}

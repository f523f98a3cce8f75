//! Document store backed by Postgres. Collections are tables of
//! (id, JSONB document) rows; schemas and validation live on this side of
//! the boundary, the router only passes documents through.

pub mod collection;
pub mod document;
pub mod manager;
pub mod schema;

pub use collection::Collection;
pub use document::Document;

use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use schema::ValidationError;

/// Errors surfaced by the store. The router never inspects these beyond
/// rendering their message into the failure envelope.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("malformed document id \"{0}\"")]
    MalformedId(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("the \"id\" field is assigned by the store")]
    IdNotAssignable,

    #[error("stored document {0} is not a JSON object")]
    MalformedDocument(Uuid),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Handle to the two collections, built once at startup and injected into
/// handlers through router state.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
    cohorts: Collection,
    students: Collection,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self {
            cohorts: Collection::new(schema::cohorts(), pool.clone()),
            students: Collection::new(schema::students(), pool.clone()),
            pool,
        }
    }

    pub fn cohorts(&self) -> &Collection {
        &self.cohorts
    }

    pub fn students(&self) -> &Collection {
        &self.students
    }

    /// Pings the pool to ensure connectivity.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Students whose cohort reference equals the given id, each with the
    /// reference expanded into the full cohort document. The cohort itself
    /// may already be gone; affected students then carry a null cohort.
    pub async fn students_in_cohort(&self, raw_cohort_id: &str) -> Result<Vec<Value>, StoreError> {
        let cohort_id = collection::parse_id(raw_cohort_id)?;
        let students = self
            .students
            .find_by_field("cohort", &cohort_id.to_string())
            .await?;
        let cohort = self.cohorts.find_by_id(raw_cohort_id).await?;

        Ok(students
            .into_iter()
            .map(|student| student.populate("cohort", cohort.as_ref()).into_value())
            .collect())
    }
}

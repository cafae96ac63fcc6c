//! `PostgreSQL` object backend.

use super::{models::StoredObjectRow, schema::qc_objects};
use crate::retrieval::{
    domain::RetrievalRequest,
    ports::{ConnectError, ObjectBackend, RetrievalError, RetrievalResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::time::Duration;

/// `PostgreSQL` connection pool type used by the object backend.
pub type ObjectPgPool = Pool<ConnectionManager<PgConnection>>;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Builds the query for the newest version of an object, optionally
/// bounded by `as_of`.
pub(crate) fn latest_version_query<'a>(
    agent: &'a str,
    object_name: &'a str,
    as_of: Option<DateTime<Utc>>,
) -> qc_objects::BoxedQuery<'a, Pg> {
    let mut query = qc_objects::table
        .filter(qc_objects::agent.eq(agent))
        .filter(qc_objects::object_name.eq(object_name))
        .into_boxed();
    if let Some(limit) = as_of {
        query = query.filter(qc_objects::created_at.le(limit));
    }
    query.order(qc_objects::created_at.desc()).limit(1)
}

/// `PostgreSQL`-backed object backend reading the `qc_objects` table.
#[derive(Debug, Clone)]
pub struct PostgresObjectBackend {
    pool: ObjectPgPool,
}

impl PostgresObjectBackend {
    /// Creates a backend from an existing connection pool.
    #[must_use]
    pub const fn new(pool: ObjectPgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `database_url` and opens its initial connections.
    ///
    /// This blocks until the pool is ready or the connection timeout expires.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Connection`] when the database is unreachable.
    pub fn connect(database_url: &str) -> Result<Self, ConnectError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .connection_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build(manager)
            .map_err(|err| ConnectError::connection("postgres", err))?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> RetrievalResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RetrievalResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RetrievalError::connection)?;
            f(&mut connection)
        })
        .await
        .map_err(RetrievalError::backend)?
    }
}

#[async_trait]
impl ObjectBackend for PostgresObjectBackend {
    async fn retrieve(&self, request: &RetrievalRequest) -> RetrievalResult<String> {
        let agent = request.namespace().to_owned();
        let object_name = request.name().to_owned();
        let as_of = request.as_of();
        let missing = RetrievalError::not_found(request);

        self.run_blocking(move |connection| {
            let row = latest_version_query(&agent, &object_name, as_of)
                .select(StoredObjectRow::as_select())
                .get_result::<StoredObjectRow>(connection)
                .optional()
                .map_err(RetrievalError::backend)?
                .ok_or(missing)?;
            tracing::debug!(
                id = %row.id,
                agent = %row.agent,
                object_name = %row.object_name,
                created_at = %row.created_at,
                "selected stored object version"
            );
            serde_json::to_string(&row.payload).map_err(RetrievalError::decode)
        })
        .await
    }
}

//! Default connector selecting an adapter by configuration.

use super::{ccdb::CcdbObjectBackend, postgres::PostgresObjectBackend};
use crate::retrieval::{
    domain::{BackendConfig, BackendKind},
    ports::{BackendConnector, ConnectError, ObjectBackend},
};
use std::sync::Arc;

/// Connector for every configuration shape this crate supports.
///
/// Service configurations and `ccdb` database configurations resolve to
/// [`CcdbObjectBackend`]; `postgres` database configurations resolve to
/// [`PostgresObjectBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBackendConnector;

impl BackendConnector for DefaultBackendConnector {
    fn connect(&self, config: &BackendConfig) -> Result<Arc<dyn ObjectBackend>, ConnectError> {
        match config {
            BackendConfig::Service(service) => {
                Ok(Arc::new(CcdbObjectBackend::connect(service.url().clone())?))
            }
            BackendConfig::Database(database) => match database.kind() {
                BackendKind::Ccdb => Ok(Arc::new(CcdbObjectBackend::connect(
                    database.endpoint()?,
                )?)),
                BackendKind::Postgres => Ok(Arc::new(PostgresObjectBackend::connect(
                    database.endpoint()?.as_str(),
                )?)),
            },
        }
    }
}

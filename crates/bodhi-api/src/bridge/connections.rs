// Bridge connection endpoints
//
// Live connection registration and teardown, plus persistence of the
// connection configs in the backend's SQLite store.

use serde_json::json;
use tracing::debug;

use crate::bridge::client::BridgeClient;
use crate::bridge::models::{DatabaseConfigRecord, MysqlConnectionRequest, RedisConnectionRequest};
use crate::error::Error;

impl BridgeClient {
    /// Register a live MySQL connection. Returns the backend-assigned id.
    ///
    /// `add_mysql_connection` with `{host, port, username, password, database}`
    pub async fn add_mysql_connection(
        &self,
        request: &MysqlConnectionRequest,
    ) -> Result<String, Error> {
        debug!(host = %request.host, port = request.port, "registering mysql connection");
        self.invoke("add_mysql_connection", request).await
    }

    /// Register a live Redis connection. Returns the backend-assigned id.
    ///
    /// `add_redis_connection` with `{url, db}`
    pub async fn add_redis_connection(
        &self,
        request: &RedisConnectionRequest,
    ) -> Result<String, Error> {
        debug!(db = request.db, "registering redis connection");
        self.invoke("add_redis_connection", request).await
    }

    /// PostgreSQL registration. The backend has no PostgreSQL driver, so
    /// this fails locally without a round trip.
    #[allow(clippy::unused_self)]
    pub fn add_postgres_connection(&self) -> Result<String, Error> {
        Err(Error::UnsupportedOperation(
            "PostgreSQL is not yet supported in the backend",
        ))
    }

    /// Ask the backend to test an already-registered live connection.
    ///
    /// `test_database_connection` with `{id}`
    pub async fn test_connection(&self, id: &str) -> Result<bool, Error> {
        debug!(id, "testing connection");
        self.invoke("test_database_connection", &json!({ "id": id }))
            .await
    }

    /// Tear down a live connection.
    ///
    /// `remove_database_connection` with `{id}`. The backend answers with
    /// whether the connection existed; the answer is not needed here.
    pub async fn remove_connection(&self, id: &str) -> Result<(), Error> {
        debug!(id, "removing live connection");
        let _: serde_json::Value = self
            .invoke("remove_database_connection", &json!({ "id": id }))
            .await?;
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Persist a full connection config. Returns the id the backend stored
    /// it under.
    ///
    /// `save_database_config_to_db` with `{config}`
    pub async fn save_database_config(
        &self,
        config: &DatabaseConfigRecord,
    ) -> Result<String, Error> {
        debug!(id = %config.id, "persisting connection config");
        self.invoke("save_database_config_to_db", &json!({ "config": config }))
            .await
    }

    /// List every persisted connection config.
    ///
    /// `get_all_database_configs_from_db` with `{}`
    pub async fn list_database_configs(&self) -> Result<Vec<DatabaseConfigRecord>, Error> {
        debug!("listing persisted connection configs");
        self.invoke("get_all_database_configs_from_db", &json!({}))
            .await
    }

    /// Delete a persisted connection config.
    ///
    /// `delete_database_config_from_db` with `{id}`
    pub async fn delete_database_config(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting persisted connection config");
        let _: serde_json::Value = self
            .invoke("delete_database_config_from_db", &json!({ "id": id }))
            .await?;
        Ok(())
    }
}

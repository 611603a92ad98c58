// ── AppStore ──
//
// Lifecycle management for the backend connection plus the reconciling
// mutation layer. Every backend-touching operation is a `Command` routed
// through one processor task, so mutations apply in the order they were
// issued. Reads go straight to the DataStore and never wait on the channel.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bodhi_api::BridgeClient;
use bodhi_api::bridge::models::{
    MysqlConnectionRequest, NewPipelineTaskRecord, RedisConnectionRequest,
};
use bodhi_api::transport::TransportConfig;

use crate::command::{Command, CommandEnvelope, CommandResult, CreatePipelineTaskRequest};
use crate::config::BackendConfig;
use crate::convert::to_config_record;
use crate::error::CoreError;
use crate::model::{ConnectionConfig, DatabaseType, EntityId, MigrationStrategy, PipelineTask};
use crate::redis_url::{build_redis_url, parse_database_index};
use crate::store::DataStore;
use crate::stream::EntityStream;
use crate::validate::ensure_valid;

const COMMAND_CHANNEL_SIZE: usize = 64;
const MYSQL_DEFAULT_PORT: u16 = 3306;

// ── BackendState ─────────────────────────────────────────────────

/// Backend connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── AppStore ─────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<AppStoreInner>`. Owns the reactive cache and
/// the single command processor that keeps it reconciled with the backend.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<AppStoreInner>,
}

struct AppStoreInner {
    config: BackendConfig,
    store: Arc<DataStore>,
    backend_state: watch::Sender<BackendState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection. Cancelled on disconnect,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<BridgeClient>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl AppStore {
    /// Create a new AppStore with an empty cache. Does NOT connect --
    /// call [`connect()`](Self::connect) to start the command processor.
    pub fn new(config: BackendConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let (backend_state, _) = watch::channel(BackendState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(AppStoreInner {
                config,
                store,
                backend_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the backend configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the backend.
    ///
    /// Builds the bridge client, spawns the command processor, and (when
    /// `load_on_connect` is set) loads every persisted connection config.
    /// A failed initial load disconnects again and leaves the state at
    /// [`Failed`](BackendState::Failed). Connecting while already connected
    /// is a no-op.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if *self.inner.backend_state.borrow() == BackendState::Connected {
            debug!("already connected");
            return Ok(());
        }
        self.inner.backend_state.send_replace(BackendState::Connecting);

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = match BridgeClient::new(config.url.clone(), &transport) {
            Ok(client) => client,
            Err(e) => {
                self.inner.backend_state.send_replace(BackendState::Failed);
                return Err(e.into());
            }
        };
        *self.inner.client.lock().await = Some(client);

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let app = self.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(command_processor_task(app, rx, child)));
        }

        self.inner.backend_state.send_replace(BackendState::Connected);
        info!(url = %config.url, "connected to backend");

        if config.load_on_connect {
            if let Err(e) = self.load_all_connection_configs().await {
                warn!(error = %e, "initial connection config load failed");
                self.disconnect().await;
                self.inner.backend_state.send_replace(BackendState::Failed);
                return Err(e);
            }
        }

        Ok(())
    }

    /// Disconnect from the backend.
    ///
    /// Cancels the command processor, drops the client, and resets the
    /// state to [`Disconnected`](BackendState::Disconnected). The cache is
    /// left as it was.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent -- allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        *self.inner.client.lock().await = None;

        // Recreate command channel so reconnects can spawn a fresh receiver.
        // The previous receiver is consumed by the command processor task.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner.backend_state.send_replace(BackendState::Disconnected);
        debug!("disconnected");
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the backend.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.backend_state.borrow() != BackendState::Connected {
            return Err(CoreError::BackendDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::BackendDisconnected)?;

        rx.await.map_err(|_| CoreError::BackendDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: BackendConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(AppStore) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let app = AppStore::new(config);
        app.connect().await?;
        let result = f(app.clone()).await;
        app.disconnect().await;
        result
    }

    // ── Connection config operations ─────────────────────────────

    /// Register (when new) and persist a connection config, then merge the
    /// confirmed config into the cache.
    ///
    /// Returns the config as cached, carrying its backend-assigned id. On
    /// any failure the cache is untouched.
    pub async fn save_connection_config(
        &self,
        config: ConnectionConfig,
    ) -> Result<Arc<ConnectionConfig>, CoreError> {
        match self
            .execute(Command::SaveConnectionConfig(Box::new(config)))
            .await?
        {
            CommandResult::Connection(saved) => Ok(saved),
            other => Err(unexpected(&other)),
        }
    }

    /// Replace the cached connection configs with the backend's full
    /// listing. Returns how many are now cached.
    pub async fn load_all_connection_configs(&self) -> Result<usize, CoreError> {
        match self.execute(Command::LoadConnectionConfigs).await? {
            CommandResult::Loaded(count) => Ok(count),
            other => Err(unexpected(&other)),
        }
    }

    /// Look up a connection config, reloading the full listing once on a
    /// cache miss. `Ok(None)` means the backend does not know the id either.
    pub async fn get_connection_config_by_id(
        &self,
        id: &EntityId,
    ) -> Result<Option<Arc<ConnectionConfig>>, CoreError> {
        if let Some(config) = self.inner.store.connection_by_id(id) {
            return Ok(Some(config));
        }

        debug!(%id, "connection config not cached; reloading listing");
        self.load_all_connection_configs().await?;
        Ok(self.inner.store.connection_by_id(id))
    }

    /// Tear down the live connection and delete the persisted config.
    ///
    /// Both backend calls must succeed before the cache entry is dropped;
    /// if teardown fails, deletion is never attempted.
    pub async fn remove_connection_config(&self, id: &EntityId) -> Result<(), CoreError> {
        self.execute(Command::RemoveConnectionConfig { id: id.clone() })
            .await
            .map(|_| ())
    }

    /// Ask the backend whether a registered connection is reachable.
    pub async fn test_connection(&self, id: &EntityId) -> Result<bool, CoreError> {
        match self
            .execute(Command::TestConnection { id: id.clone() })
            .await?
        {
            CommandResult::ConnectionTested(ok) => Ok(ok),
            other => Err(unexpected(&other)),
        }
    }

    // ── Pipeline task operations ─────────────────────────────────

    /// Create a pipeline task and add the backend's version to the cache.
    pub async fn create_pipeline_task(
        &self,
        request: CreatePipelineTaskRequest,
    ) -> Result<Arc<PipelineTask>, CoreError> {
        match self
            .execute(Command::CreatePipelineTask(Box::new(request)))
            .await?
        {
            CommandResult::Task(task) => Ok(task),
            other => Err(unexpected(&other)),
        }
    }

    /// Start a pipeline task. The cached task is not touched; use
    /// [`refresh_pipeline_task`](Self::refresh_pipeline_task) to observe
    /// the new status.
    pub async fn start_pipeline_task(&self, id: &EntityId) -> Result<(), CoreError> {
        self.execute(Command::StartPipelineTask { id: id.clone() })
            .await
            .map(|_| ())
    }

    /// Replace the cached tasks with the backend's full listing.
    pub async fn load_all_pipeline_tasks(&self) -> Result<usize, CoreError> {
        match self.execute(Command::LoadPipelineTasks).await? {
            CommandResult::Loaded(count) => Ok(count),
            other => Err(unexpected(&other)),
        }
    }

    /// Fetch one task from the backend and merge it into the cache.
    pub async fn refresh_pipeline_task(
        &self,
        id: &EntityId,
    ) -> Result<Option<Arc<PipelineTask>>, CoreError> {
        match self
            .execute(Command::RefreshPipelineTask { id: id.clone() })
            .await?
        {
            CommandResult::TaskRefreshed(task) => Ok(task),
            other => Err(unexpected(&other)),
        }
    }

    // ── Strategies (local only) ──────────────────────────────────

    /// Seed the strategy collection. The backend has no strategy
    /// operations, so this never leaves the process.
    pub fn add_strategy(&self, strategy: MigrationStrategy) -> Arc<MigrationStrategy> {
        let strategy = Arc::new(strategy);
        self.inner.store.upsert_strategy(Arc::clone(&strategy));
        strategy
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to backend state changes.
    pub fn backend_state(&self) -> watch::Receiver<BackendState> {
        self.inner.backend_state.subscribe()
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn connections_snapshot(&self) -> Arc<Vec<Arc<ConnectionConfig>>> {
        self.inner.store.connections_snapshot()
    }

    pub fn strategies_snapshot(&self) -> Arc<Vec<Arc<MigrationStrategy>>> {
        self.inner.store.strategies_snapshot()
    }

    pub fn tasks_snapshot(&self) -> Arc<Vec<Arc<PipelineTask>>> {
        self.inner.store.tasks_snapshot()
    }

    // ── Stream accessors (delegate to DataStore) ─────────────────

    pub fn connections(&self) -> EntityStream<ConnectionConfig> {
        self.inner.store.subscribe_connections()
    }

    pub fn strategies(&self) -> EntityStream<MigrationStrategy> {
        self.inner.store.subscribe_strategies()
    }

    pub fn tasks(&self) -> EntityStream<PipelineTask> {
        self.inner.store.subscribe_tasks()
    }
}

fn unexpected(result: &CommandResult) -> CoreError {
    CoreError::Internal(format!("unexpected command result: {result:?}"))
}

// ── Command processor ────────────────────────────────────────────

/// Process commands from the mpsc channel one at a time, replying on each
/// envelope's oneshot.
async fn command_processor_task(
    app: AppStore,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&app, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to the bridge and merge the outcome into the cache.
async fn route_command(app: &AppStore, cmd: Command) -> Result<CommandResult, CoreError> {
    let store = &app.inner.store;
    let guard = app.inner.client.lock().await;
    let client = require_client(&guard)?;

    match cmd {
        // ── Connection configs ───────────────────────────────────
        Command::SaveConnectionConfig(config) => {
            let saved = save_connection(client, store, *config).await?;
            Ok(CommandResult::Connection(saved))
        }

        Command::LoadConnectionConfigs => {
            let configs = client
                .list_database_configs()
                .await?
                .into_iter()
                .map(ConnectionConfig::from)
                .collect();
            Ok(CommandResult::Loaded(store.apply_connection_listing(configs)))
        }

        Command::RemoveConnectionConfig { id } => {
            client.remove_connection(id.as_str()).await?;
            client.delete_database_config(id.as_str()).await?;
            store.remove_connection(&id);
            debug!(%id, "connection config removed");
            Ok(CommandResult::Ok)
        }

        Command::TestConnection { id } => {
            let ok = client.test_connection(id.as_str()).await?;
            Ok(CommandResult::ConnectionTested(ok))
        }

        // ── Pipeline tasks ───────────────────────────────────────
        Command::CreatePipelineTask(request) => {
            let record = client
                .create_pipeline_task(&NewPipelineTaskRecord::from(&*request))
                .await?;
            let task = Arc::new(PipelineTask::try_from(record)?);
            store.upsert_task(Arc::clone(&task));
            debug!(id = %task.id, status = %task.status, "pipeline task created");
            Ok(CommandResult::Task(task))
        }

        Command::StartPipelineTask { id } => {
            client.start_pipeline_task(id.as_str()).await?;
            Ok(CommandResult::Ok)
        }

        Command::LoadPipelineTasks => {
            let tasks = client
                .list_pipeline_tasks()
                .await?
                .into_iter()
                .map(PipelineTask::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CommandResult::Loaded(store.apply_task_listing(tasks)))
        }

        Command::RefreshPipelineTask { id } => {
            let Some(record) = client.get_pipeline_task(id.as_str()).await? else {
                debug!(%id, "backend has no such pipeline task");
                return Ok(CommandResult::TaskRefreshed(None));
            };
            let task = Arc::new(PipelineTask::try_from(record)?);
            store.upsert_task(Arc::clone(&task));
            Ok(CommandResult::TaskRefreshed(Some(task)))
        }
    }
}

// ── Reconciliation ───────────────────────────────────────────────

/// Validate, register if new, persist under the authoritative id, merge.
///
/// Nothing touches the cache until every backend call has succeeded.
async fn save_connection(
    client: &BridgeClient,
    store: &DataStore,
    config: ConnectionConfig,
) -> Result<Arc<ConnectionConfig>, CoreError> {
    if config.is_new() {
        ensure_registrable(client, &config.db_type)?;
    }
    ensure_valid(&config)?;

    let id = if config.is_new() {
        let id = register_connection(client, &config).await?;
        debug!(%id, name = %config.name, "connection registered");
        id
    } else {
        config
            .id
            .clone()
            .ok_or_else(|| CoreError::Internal("registered config without an id".into()))?
    };

    let canonical = ConnectionConfig {
        id: Some(id.clone()),
        ..config
    };

    let confirmed = client
        .save_database_config(&to_config_record(&canonical, &id))
        .await?;
    if confirmed != id.as_str() {
        warn!(
            registered = %id,
            confirmed = %confirmed,
            "backend persisted config under a different id; keeping the registration id"
        );
    }

    let canonical = Arc::new(canonical);
    let is_new = store.upsert_connection(id, Arc::clone(&canonical));
    debug!(name = %canonical.name, is_new, "connection config merged");
    Ok(canonical)
}

/// Reject types the backend cannot register before field checks run, so
/// a PostgreSQL or unknown config without host/port reports its type.
/// A blank type is left to validation.
fn ensure_registrable(client: &BridgeClient, db_type: &DatabaseType) -> Result<(), CoreError> {
    match db_type {
        DatabaseType::PostgreSql => client
            .add_postgres_connection()
            .map(drop)
            .map_err(CoreError::from),
        DatabaseType::Other(name) if !name.trim().is_empty() => Err(CoreError::UnsupportedType {
            db_type: name.clone(),
        }),
        _ => Ok(()),
    }
}

/// Open a live connection on the backend for a config it has not seen yet.
/// Returns the backend-assigned id.
async fn register_connection(
    client: &BridgeClient,
    config: &ConnectionConfig,
) -> Result<EntityId, CoreError> {
    let raw_id = match &config.db_type {
        DatabaseType::Redis => {
            let url = build_redis_url(
                config.host.as_deref(),
                config.port,
                config.username.as_deref(),
                config.password.as_ref(),
            )?;
            let db = parse_database_index(config.database.as_deref())?;
            debug!(%url, db, "redis connection url built");
            client
                .add_redis_connection(&RedisConnectionRequest {
                    url: url.expose().to_owned(),
                    db,
                })
                .await?
        }
        DatabaseType::MySql => {
            client
                .add_mysql_connection(&MysqlConnectionRequest {
                    host: config.host.clone().unwrap_or_default(),
                    port: config.port.unwrap_or(MYSQL_DEFAULT_PORT),
                    username: config.username.clone().unwrap_or_default(),
                    password: config
                        .password
                        .as_ref()
                        .map(|p| p.expose_secret().to_owned())
                        .unwrap_or_default(),
                    database: config.database.clone().unwrap_or_default(),
                })
                .await?
        }
        DatabaseType::PostgreSql => client.add_postgres_connection()?,
        DatabaseType::Other(db_type) => {
            return Err(CoreError::UnsupportedType {
                db_type: db_type.clone(),
            });
        }
    };

    if raw_id.is_empty() {
        return Err(CoreError::Backend {
            message: "backend registered the connection without returning an id".into(),
        });
    }
    Ok(EntityId::from(raw_id))
}

fn require_client<'a>(
    guard: &'a tokio::sync::MutexGuard<'_, Option<BridgeClient>>,
) -> Result<&'a BridgeClient, CoreError> {
    guard.as_ref().ok_or(CoreError::BackendDisconnected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_requires_connection() {
        let app = AppStore::new(BackendConfig::default());
        let result = app.execute(Command::LoadConnectionConfigs).await;
        assert!(matches!(result, Err(CoreError::BackendDisconnected)));
        assert_eq!(*app.backend_state().borrow(), BackendState::Disconnected);
    }

    #[tokio::test]
    async fn cached_lookup_needs_no_backend() {
        let app = AppStore::new(BackendConfig::default());
        let config = ConnectionConfig::new("cache", DatabaseType::Redis);
        let id = EntityId::from("redis-1");
        app.store().upsert_connection(id.clone(), Arc::new(config));

        let found = app.get_connection_config_by_id(&id).await;
        assert!(matches!(found, Ok(Some(c)) if c.name == "cache"));
    }

    #[test]
    fn add_strategy_is_local() {
        let app = AppStore::new(BackendConfig::default());
        let stream = app.strategies();
        app.add_strategy(MigrationStrategy {
            id: EntityId::from("full"),
            name: "Full copy".into(),
            strategy_type: crate::model::StrategyType::Full,
            batch_size: Some(1000),
            retry_count: None,
            timeout: None,
            filters: None,
            transformers: Vec::new(),
        });
        assert_eq!(app.strategies_snapshot().len(), 1);
        assert!(app.store().strategy_by_id(&EntityId::from("full")).is_some());
        assert!(stream.current().is_empty());
        assert_eq!(stream.latest().len(), 1);
    }
}

//! Connection command handlers.

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use serde::Serialize;
use tabled::Tabled;

use bodhi_core::{AppStore, ConnectionConfig, DatabaseType, EntityId};

use crate::cli::{
    ConnectionFields, ConnectionUpdate, ConnectionsArgs, ConnectionsCommand, DbTypeArg, GlobalOpts,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    db_type: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Database")]
    database: String,
}

impl From<&Arc<ConnectionConfig>> for ConnectionRow {
    fn from(c: &Arc<ConnectionConfig>) -> Self {
        Self {
            id: id_of(c),
            name: c.name.clone(),
            db_type: c.db_type.to_string(),
            host: c.host.clone().unwrap_or_default(),
            port: c.port.map(|p| p.to_string()).unwrap_or_default(),
            database: c.database.clone().unwrap_or_default(),
        }
    }
}

fn id_of(c: &ConnectionConfig) -> String {
    c.id.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn detail(c: &Arc<ConnectionConfig>) -> String {
    [
        format!("ID:       {}", id_of(c)),
        format!("Name:     {}", c.name),
        format!("Type:     {}", c.db_type),
        format!("Host:     {}", util::or_dash(c.host.as_deref())),
        format!(
            "Port:     {}",
            c.port.map_or_else(|| "-".into(), |p| p.to_string())
        ),
        format!("Username: {}", util::or_dash(c.username.as_deref())),
        format!(
            "Password: {}",
            if c.password.is_some() { "****" } else { "-" }
        ),
        format!("Database: {}", util::or_dash(c.database.as_deref())),
        format!("SSL:      {}", c.ssl.unwrap_or(false)),
        format!("Created:  {}", util::format_time(c.created_at)),
        format!("Updated:  {}", util::format_time(c.updated_at)),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct TestOutcome {
    id: String,
    reachable: bool,
}

impl From<DbTypeArg> for DatabaseType {
    fn from(arg: DbTypeArg) -> Self {
        match arg {
            DbTypeArg::Mysql => Self::MySql,
            DbTypeArg::Postgresql => Self::PostgreSql,
            DbTypeArg::Redis => Self::Redis,
        }
    }
}

// ── Field application ───────────────────────────────────────────────

fn new_config(fields: ConnectionFields) -> ConnectionConfig {
    let mut config = ConnectionConfig::new(fields.name, fields.db_type.into());
    if fields.port.is_some() {
        config.port = fields.port;
    }
    config.host = fields.host;
    config.username = fields.username;
    config.password = fields.password.map(SecretString::from);
    config.database = fields.database;
    config.ssl = fields.ssl.then_some(true);
    config
}

fn apply_update(config: &mut ConnectionConfig, update: ConnectionUpdate) {
    if let Some(name) = update.name {
        config.name = name;
    }
    if update.host.is_some() {
        config.host = update.host;
    }
    if update.port.is_some() {
        config.port = update.port;
    }
    if update.username.is_some() {
        config.username = update.username;
    }
    if let Some(password) = update.password {
        config.password = Some(SecretString::from(password));
    }
    if update.database.is_some() {
        config.database = update.database;
    }
    if update.ssl.is_some() {
        config.ssl = update.ssl;
    }
    config.updated_at = Utc::now();
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    app: &AppStore,
    args: ConnectionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ConnectionsCommand::List => {
            app.load_all_connection_configs().await?;
            let snap = app.connections_snapshot();
            let out = output::render_list(
                &global.output,
                snap.as_slice(),
                |c| ConnectionRow::from(c),
                |c| id_of(c),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::Get { id } => {
            let config = app
                .get_connection_config_by_id(&EntityId::from(id.as_str()))
                .await?
                .ok_or_else(|| util::not_found("connection", &id, "connections list"))?;
            let out = output::render_single(&global.output, &config, detail, |c| id_of(c));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::Add(fields) => {
            let saved = app.save_connection_config(new_config(fields)).await?;
            if !global.quiet {
                eprintln!("Connection '{}' registered", saved.name);
            }
            let out = output::render_single(&global.output, &saved, detail, |c| id_of(c));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::Update { id, fields } => {
            let existing = app
                .get_connection_config_by_id(&EntityId::from(id.as_str()))
                .await?
                .ok_or_else(|| util::not_found("connection", &id, "connections list"))?;
            let mut config = ConnectionConfig::clone(&existing);
            apply_update(&mut config, fields);

            let saved = app.save_connection_config(config).await?;
            if !global.quiet {
                eprintln!("Connection '{}' updated", saved.name);
            }
            let out = output::render_single(&global.output, &saved, detail, |c| id_of(c));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConnectionsCommand::Remove { id } => {
            if !util::confirm(
                &format!("Remove connection '{id}'? Its saved config is deleted too."),
                "connections remove",
                global.yes,
            )? {
                return Ok(());
            }
            app.remove_connection_config(&EntityId::from(id.as_str()))
                .await?;
            if !global.quiet {
                eprintln!("Connection removed");
            }
            Ok(())
        }

        ConnectionsCommand::Test { id } => {
            let reachable = app
                .test_connection(&EntityId::from(id.as_str()))
                .await?;
            let outcome = TestOutcome { id, reachable };
            let out = output::render_single(
                &global.output,
                &outcome,
                |o| {
                    if o.reachable {
                        format!("Connection '{}' is reachable", o.id)
                    } else {
                        format!("Connection '{}' is NOT reachable", o.id)
                    }
                },
                |o| o.reachable.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

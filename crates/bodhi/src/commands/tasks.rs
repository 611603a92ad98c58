//! Pipeline task command handlers.

use std::sync::Arc;

use tabled::Tabled;

use bodhi_core::{AppStore, CreatePipelineTaskRequest, EntityId, PipelineTask};

use crate::cli::{GlobalOpts, TasksArgs, TasksCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Strategy")]
    strategy: String,
}

impl From<&Arc<PipelineTask>> for TaskRow {
    fn from(t: &Arc<PipelineTask>) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name.clone(),
            status: t.status.to_string(),
            progress: format!("{:.0}%", t.progress),
            source: t.source_db_id.to_string(),
            target: t.target_db_id.to_string(),
            strategy: t.strategy_id.to_string(),
        }
    }
}

fn detail(t: &Arc<PipelineTask>) -> String {
    let mut lines = vec![
        format!("ID:       {}", t.id),
        format!("Name:     {}", t.name),
        format!("Status:   {}", t.status),
        format!("Progress: {:.1}%", t.progress),
        format!("Source:   {}", t.source_db_id),
        format!("Target:   {}", t.target_db_id),
        format!("Strategy: {}", t.strategy_id),
        format!(
            "Started:  {}",
            t.start_time.map_or_else(|| "-".into(), util::format_time)
        ),
        format!(
            "Ended:    {}",
            t.end_time.map_or_else(|| "-".into(), util::format_time)
        ),
    ];
    if let Some(ref error) = t.error {
        lines.push(format!("Error:    {error}"));
    }
    if !t.logs.is_empty() {
        lines.push("Logs:".into());
        for entry in &t.logs {
            lines.push(format!(
                "  {} [{}] {}",
                util::format_time(entry.timestamp),
                entry.level,
                entry.message
            ));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &AppStore, args: TasksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TasksCommand::List => {
            app.load_all_pipeline_tasks().await?;
            let snap = app.tasks_snapshot();
            let out = output::render_list(
                &global.output,
                snap.as_slice(),
                |t| TaskRow::from(t),
                |t| t.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TasksCommand::Create {
            name,
            source,
            target,
            strategy,
        } => {
            let task = app
                .create_pipeline_task(CreatePipelineTaskRequest::new(
                    name,
                    EntityId::from(source),
                    EntityId::from(target),
                    EntityId::from(strategy),
                ))
                .await?;
            if !global.quiet {
                eprintln!("Task '{}' created", task.name);
            }
            let out = output::render_single(&global.output, &task, detail, |t| t.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TasksCommand::Start { id } => {
            let task_id = EntityId::from(id.as_str());
            app.start_pipeline_task(&task_id).await?;
            if !global.quiet {
                eprintln!("Task started");
            }
            // Starting does not report the new status; ask for it.
            if let Some(task) = app.refresh_pipeline_task(&task_id).await? {
                let out =
                    output::render_single(&global.output, &task, detail, |t| t.id.to_string());
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        TasksCommand::Refresh { id } => {
            let task = app
                .refresh_pipeline_task(&EntityId::from(id.as_str()))
                .await?
                .ok_or_else(|| util::not_found("task", &id, "tasks list"))?;
            let out = output::render_single(&global.output, &task, detail, |t| t.id.to_string());
            output::print_output(&out, global.quiet);
            if let Some(hint) = follow_up_hint(&task).filter(|_| !global.quiet) {
                eprintln!("{hint}");
            }
            Ok(())
        }
    }
}

/// Nudge for tasks that have not reached a final state yet.
fn follow_up_hint(task: &PipelineTask) -> Option<String> {
    (!task.status.is_terminal()).then(|| {
        format!(
            "Task is {}; run `bodhi tasks refresh {}` again to follow it",
            task.status, task.id
        )
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use bodhi_core::TaskStatus;

    use super::*;

    fn task(status: TaskStatus) -> PipelineTask {
        PipelineTask {
            id: EntityId::from("task-1"),
            name: "nightly copy".into(),
            source_db_id: EntityId::from("mysql-1"),
            target_db_id: EntityId::from("redis-1"),
            strategy_id: EntityId::from("full"),
            status,
            progress: 40.0,
            start_time: None,
            end_time: None,
            error: None,
            logs: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn running_task_gets_a_refresh_hint() {
        let hint = follow_up_hint(&task(TaskStatus::Running)).unwrap_or_default();
        assert!(hint.contains("running"));
        assert!(hint.contains("bodhi tasks refresh task-1"));
    }

    #[test]
    fn finished_tasks_get_no_hint() {
        assert!(follow_up_hint(&task(TaskStatus::Completed)).is_none());
        assert!(follow_up_hint(&task(TaskStatus::Failed)).is_none());
        assert!(follow_up_hint(&task(TaskStatus::Paused)).is_some());
    }
}

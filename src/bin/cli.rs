use std::io::{self, Write};
use std::sync::Arc;

use polars::prelude::{AnyValue, DataFrame};
use task_planner::{
    MemoryStore, NewDeveloper, NewTask, Page, PlannerConfig, PlannerService, PlannerStore,
    ScheduleError, ScheduleResult, ServiceError, developers_frame, load_developers_from_csv,
    load_developers_from_json, load_tasks_from_csv, load_tasks_from_json, save_schedule_to_csv,
    save_schedule_to_json, tasks_frame, telemetry,
};

fn cell(av: &AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell(&av)).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_frame(frame: polars::prelude::PolarsResult<DataFrame>) {
    match frame {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Render error: {}", e),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                                        Show this help\n  tasks                                       List stored tasks\n  devs                                        List stored developers\n  add-task <external_id> <difficulty> <duration> <provider> <name...>\n                                              Create a task\n  add-dev <first> <last> <email> <capacity>   Create a developer\n  seed                                        Insert the default roster if none exists\n  import <provider> <path>                    Import a provider JSON payload\n  load-tasks <json|csv> <path>                Create tasks from a file\n  load-devs <json|csv> <path>                 Create developers from a file\n  schedule                                    Compute the weekly plan\n  show                                        Show the last computed plan\n  load                                        Show per-developer load of the last plan\n  save <json|csv> <path>                      Export the last computed plan\n  quit|exit                                   Exit"
    );
}

fn report_error(err: &ServiceError) {
    match err {
        ServiceError::Schedule(ScheduleError::Unschedulable { week, task_ids }) => println!(
            "Unschedulable: week {} placed nothing; pending task ids {:?}",
            week, task_ids
        ),
        other => println!("Error: {}", other),
    }
}

fn open_store(config: &PlannerConfig) -> anyhow::Result<Arc<dyn PlannerStore>> {
    match &config.database_path {
        #[cfg(feature = "sqlite")]
        Some(path) => Ok(Arc::new(task_planner::SqliteStore::new(path)?)),
        #[cfg(not(feature = "sqlite"))]
        Some(path) => anyhow::bail!(
            "TASK_PLANNER_DB_PATH={} requires the `sqlite` feature",
            path.display()
        ),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

fn main() -> anyhow::Result<()> {
    let config = PlannerConfig::from_env()?;
    telemetry::init_tracing_stderr(&config.log_level);

    let service = PlannerService::new(open_store(&config)?, config.scheduler)
        .with_persisted_assignments(config.persist_assignments);
    if config.seed_developers {
        service.seed_developers()?;
    }
    let mut last: Option<ScheduleResult> = None;

    println!("Task Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "tasks" => match service.list_tasks(Page::all()) {
                Ok(tasks) => print_frame(tasks_frame(&tasks)),
                Err(e) => report_error(&e),
            },
            "devs" => match service.list_developers() {
                Ok(developers) => print_frame(developers_frame(&developers)),
                Err(e) => report_error(&e),
            },
            "add-task" => {
                let ext_s = parts.next();
                let diff_s = parts.next();
                let dur_s = parts.next();
                let provider = parts.next();
                let name = parts.collect::<Vec<_>>().join(" ");
                match (ext_s, diff_s, dur_s, provider) {
                    (Some(ext_s), Some(diff_s), Some(dur_s), Some(provider)) if !name.is_empty() => {
                        let parsed = (
                            ext_s.parse::<i64>(),
                            diff_s.parse::<i64>(),
                            dur_s.parse::<i64>(),
                        );
                        let (external_id, difficulty, duration) = match parsed {
                            (Ok(e), Ok(d), Ok(u)) => (e, d, u),
                            _ => {
                                println!("external_id, difficulty and duration must be integers");
                                continue;
                            }
                        };
                        let task = NewTask::new(external_id, name, duration, difficulty, provider);
                        match service.create_task(task) {
                            Ok(created) => println!(
                                "Task {} created (externalId={}).",
                                created.id, created.external_id
                            ),
                            Err(e) => report_error(&e),
                        }
                    }
                    _ => println!(
                        "Usage: add-task <external_id> <difficulty> <duration> <provider> <name...>"
                    ),
                }
            }
            "add-dev" => {
                let fields = (parts.next(), parts.next(), parts.next(), parts.next());
                match fields {
                    (Some(first), Some(last_name), Some(email), Some(cap_s)) => {
                        let capacity: i64 = match cap_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid capacity");
                                continue;
                            }
                        };
                        let developer = NewDeveloper::new(first, last_name, email, capacity);
                        match service.create_developer(developer) {
                            Ok(created) => println!(
                                "Developer {} created ({}).",
                                created.id,
                                created.full_name()
                            ),
                            Err(e) => report_error(&e),
                        }
                    }
                    _ => println!("Usage: add-dev <first> <last> <email> <capacity>"),
                }
            }
            "seed" => match service.seed_developers() {
                Ok(0) => println!("Developers already present; nothing seeded."),
                Ok(n) => println!("Seeded {} developers.", n),
                Err(e) => report_error(&e),
            },
            "import" => match (parts.next(), parts.next()) {
                (Some(provider), Some(path)) => match std::fs::read_to_string(path) {
                    Ok(body) => match service.import_provider_payload(provider, &body) {
                        Ok(report) => println!(
                            "Imported from {}: created={}, duplicates={}, rejected={}",
                            provider, report.created, report.duplicates, report.rejected
                        ),
                        Err(e) => report_error(&e),
                    },
                    Err(e) => println!("Read error: {}", e),
                },
                _ => println!("Usage: import <provider> <path>"),
            },
            "load-tasks" => {
                let loaded = match (parts.next(), parts.next()) {
                    (Some("json"), Some(path)) => load_tasks_from_json(path),
                    (Some("csv"), Some(path)) => load_tasks_from_csv(path),
                    _ => {
                        println!("Usage: load-tasks <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(tasks) => {
                        let total = tasks.len();
                        let mut created = 0;
                        for task in tasks {
                            match service.create_task(task) {
                                Ok(_) => created += 1,
                                Err(e) => report_error(&e),
                            }
                        }
                        println!("Loaded {} of {} tasks.", created, total);
                    }
                    Err(e) => println!("Load error: {}", e),
                }
            }
            "load-devs" => {
                let loaded = match (parts.next(), parts.next()) {
                    (Some("json"), Some(path)) => load_developers_from_json(path),
                    (Some("csv"), Some(path)) => load_developers_from_csv(path),
                    _ => {
                        println!("Usage: load-devs <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(developers) => {
                        let total = developers.len();
                        let mut created = 0;
                        for developer in developers {
                            match service.create_developer(developer) {
                                Ok(_) => created += 1,
                                Err(e) => report_error(&e),
                            }
                        }
                        println!("Loaded {} of {} developers.", created, total);
                    }
                    Err(e) => println!("Load error: {}", e),
                }
            }
            "schedule" => match service.schedule_assignments() {
                Ok(result) => {
                    println!("Scheduled ({})", result.summary().to_cli_summary());
                    print_frame(result.assignments_frame());
                    last = Some(result);
                }
                Err(e) => report_error(&e),
            },
            "show" => match &last {
                Some(result) => print_frame(result.assignments_frame()),
                None => println!("No schedule computed yet; run 'schedule'."),
            },
            "load" => match &last {
                Some(result) => print_frame(result.developer_load_frame()),
                None => println!("No schedule computed yet; run 'schedule'."),
            },
            "save" => {
                let Some(result) = &last else {
                    println!("No schedule computed yet; run 'schedule'.");
                    continue;
                };
                let saved = match (parts.next(), parts.next()) {
                    (Some("json"), Some(path)) => save_schedule_to_json(result, path).map(|_| path),
                    (Some("csv"), Some(path)) => save_schedule_to_csv(result, path).map(|_| path),
                    _ => {
                        println!("Usage: save <json|csv> <path>");
                        continue;
                    }
                };
                match saved {
                    Ok(path) => println!("Schedule saved to {}", path),
                    Err(e) => println!("Save error: {}", e),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}

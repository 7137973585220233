use super::{AssignmentRecord, Page, PersistenceError, PersistenceResult, PlannerStore};
use crate::{Developer, NewDeveloper, NewTask, ScheduleResult, Task};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

const TASK_COLUMNS: &str =
    "id, external_id, name, duration, difficulty, provider, created_at, updated_at";
const DEVELOPER_COLUMNS: &str =
    "id, first_name, last_name, email, capacity, created_at, updated_at";

impl SqliteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS tb_tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                duration INTEGER NOT NULL,
                difficulty INTEGER NOT NULL,
                provider TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (external_id, provider)
            );
            CREATE TABLE IF NOT EXISTS tb_developers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                capacity INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tb_assignments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                week INTEGER NOT NULL,
                task_id INTEGER NOT NULL REFERENCES tb_tasks(id),
                developer_id INTEGER NOT NULL REFERENCES tb_developers(id),
                effective_cost REAL NOT NULL,
                created_at TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<(Task, String, String)> {
        let task = Task::new(
            row.get(0)?,
            row.get(1)?,
            row.get::<_, String>(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get::<_, String>(5)?,
        );
        Ok((task, row.get(6)?, row.get(7)?))
    }

    fn developer_from_row(row: &Row<'_>) -> rusqlite::Result<(Developer, String, String)> {
        let developer = Developer {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            capacity: row.get(4)?,
            created_at: None,
            updated_at: None,
        };
        Ok((developer, row.get(5)?, row.get(6)?))
    }

    fn with_timestamps(
        (mut task, created, updated): (Task, String, String),
    ) -> PersistenceResult<Task> {
        task.created_at = Some(parse_timestamp(&created)?);
        task.updated_at = Some(parse_timestamp(&updated)?);
        Ok(task)
    }
}

fn parse_timestamp(value: &str) -> PersistenceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| PersistenceError::InvalidData(format!("invalid timestamp '{value}': {err}")))
}

impl PlannerStore for SqliteStore {
    fn create_task(&self, task: NewTask) -> PersistenceResult<Task> {
        let conn = self.connection.lock();

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM tb_tasks WHERE external_id = ?1 AND provider = ?2 LIMIT 1",
                params![task.external_id, task.provider],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(PersistenceError::Duplicate {
                external_id: task.external_id,
                provider: task.provider,
            });
        }

        let now = Utc::now();
        let stamp = now.to_rfc3339();
        conn.execute(
            "INSERT INTO tb_tasks (external_id, name, duration, difficulty, provider, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                task.external_id,
                task.name,
                task.duration,
                task.difficulty,
                task.provider,
                stamp
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(task_id = id, external_id = task.external_id, "task row inserted");
        Ok(Task::from_new(id, task, now))
    }

    fn get_task(&self, id: i64) -> PersistenceResult<Option<Task>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {TASK_COLUMNS} FROM tb_tasks WHERE id = ?1");
        let row = conn
            .query_row(&sql, params![id], Self::task_from_row)
            .optional()?;
        row.map(Self::with_timestamps).transpose()
    }

    fn list_tasks(&self, page: Page) -> PersistenceResult<Vec<Task>> {
        let conn = self.connection.lock();
        // SQLite treats a negative LIMIT as unbounded.
        let limit: i64 = if page.limit == 0 { -1 } else { page.limit as i64 };
        let sql = format!("SELECT {TASK_COLUMNS} FROM tb_tasks ORDER BY id ASC LIMIT ?1 OFFSET ?2");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit, page.offset as i64], Self::task_from_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(Self::with_timestamps(row?)?);
        }
        Ok(tasks)
    }

    fn create_developer(&self, developer: NewDeveloper) -> PersistenceResult<Developer> {
        let conn = self.connection.lock();
        let now = Utc::now();
        let stamp = now.to_rfc3339();
        conn.execute(
            "INSERT INTO tb_developers (first_name, last_name, email, capacity, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                developer.first_name,
                developer.last_name,
                developer.email,
                developer.capacity,
                stamp
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Developer::from_new(id, developer, now))
    }

    fn list_developers(&self) -> PersistenceResult<Vec<Developer>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {DEVELOPER_COLUMNS} FROM tb_developers ORDER BY id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::developer_from_row)?;

        let mut developers = Vec::new();
        for row in rows {
            let (mut developer, created, updated) = row?;
            developer.created_at = Some(parse_timestamp(&created)?);
            developer.updated_at = Some(parse_timestamp(&updated)?);
            developers.push(developer);
        }
        Ok(developers)
    }

    fn save_assignments(&self, result: &ScheduleResult) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let stamp = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tb_assignments", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tb_assignments (week, task_id, developer_id, effective_cost, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (week, task_id, developer_id, cost) in super::assignment_rows(result) {
                stmt.execute(params![week, task_id, developer_id, cost, stamp])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn list_assignments(&self) -> PersistenceResult<Vec<AssignmentRecord>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT id, week, task_id, developer_id, effective_cost, created_at
             FROM tb_assignments ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, week, task_id, developer_id, effective_cost, created) = row?;
            records.push(AssignmentRecord {
                id,
                week,
                task_id,
                developer_id,
                effective_cost,
                created_at: parse_timestamp(&created)?,
            });
        }
        Ok(records)
    }
}

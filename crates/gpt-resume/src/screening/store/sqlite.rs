use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::screening::domain::{
    Applicant, ApplicantId, College, CollegeId, Document, DocumentId, ExperienceId, Job, JobId,
    ProfessionalExperience, Project, ProjectId, TimeDuration,
};
use crate::screening::repository::{RepositoryError, ScreeningRepository, TableCounts};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS jobs (
    u_id TEXT PRIMARY KEY,
    job_title TEXT NOT NULL,
    job_description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS applicants (
    u_id TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    resume TEXT NOT NULL,
    resume_text TEXT NOT NULL DEFAULT '',
    job_applied TEXT NOT NULL,
    relevance INTEGER NOT NULL DEFAULT 0 CHECK (relevance BETWEEN 0 AND 100),
    FOREIGN KEY (job_applied) REFERENCES jobs(u_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_applicants_job ON applicants(job_applied);

CREATE TABLE IF NOT EXISTS colleges (
    u_id TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    branch TEXT NOT NULL DEFAULT '',
    degree TEXT NOT NULL DEFAULT '',
    start_date TEXT CHECK (start_date IS NULL OR length(start_date) <= 7),
    end_date TEXT CHECK (end_date IS NULL OR length(end_date) <= 7),
    applicant TEXT NOT NULL UNIQUE,
    FOREIGN KEY (applicant) REFERENCES applicants(u_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS projects (
    u_id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    tech_stack TEXT NOT NULL DEFAULT '[]',
    time_duration TEXT NOT NULL DEFAULT '{}',
    applicant TEXT NOT NULL,
    relevance INTEGER NOT NULL DEFAULT 0 CHECK (relevance BETWEEN 0 AND 5),
    FOREIGN KEY (applicant) REFERENCES applicants(u_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_projects_applicant ON projects(applicant);

CREATE TABLE IF NOT EXISTS professional_experiences (
    u_id TEXT PRIMARY KEY,
    role TEXT NOT NULL DEFAULT '',
    organization TEXT,
    description TEXT NOT NULL DEFAULT '',
    tech_stack TEXT NOT NULL DEFAULT '[]',
    time_duration TEXT NOT NULL DEFAULT '{}',
    applicant TEXT NOT NULL,
    relevance INTEGER NOT NULL DEFAULT 0 CHECK (relevance BETWEEN 0 AND 10),
    FOREIGN KEY (applicant) REFERENCES applicants(u_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_experiences_applicant ON professional_experiences(applicant);
"#;

const APPLICANT_COLUMNS: &str = "u_id, name, email, resume, resume_text, job_applied, relevance";
const COLLEGE_COLUMNS: &str = "u_id, name, branch, degree, start_date, end_date, applicant";
const PROJECT_COLUMNS: &str =
    "u_id, title, description, tech_stack, time_duration, applicant, relevance";
const EXPERIENCE_COLUMNS: &str =
    "u_id, role, organization, description, tech_stack, time_duration, applicant, relevance";

/// SQLite-backed store. Cascades are declared in the schema and enforced with
/// `PRAGMA foreign_keys = ON`.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        info!("opening screening database: {}", path.display());
        let conn = Connection::open(path).map_err(unavailable)?;
        Self::initialise(conn)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::initialise(conn)
    }

    fn initialise(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(unavailable)?;
        conn.execute_batch(SCHEMA_SQL).map_err(unavailable)?;
        debug!("screening schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("database lock poisoned".to_string()))
    }
}

fn unavailable(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

/// Foreign key failures mean the parent row is gone; uniqueness failures are conflicts.
fn map_write_error(err: rusqlite::Error) -> RepositoryError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return RepositoryError::NotFound,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                return RepositoryError::Conflict
            }
            _ => {}
        }
    }
    unavailable(err)
}

fn expect_changed(changed: usize) -> Result<(), RepositoryError> {
    if changed == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn json_at<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|err| RepositoryError::Unavailable(format!("unable to encode column: {err}")))
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: DocumentId(row.get(0)?),
        document: row.get(1)?,
    })
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        u_id: JobId(uuid_at(row, 0)?),
        job_title: row.get(1)?,
        job_description: row.get(2)?,
    })
}

fn applicant_from_row(row: &Row<'_>) -> rusqlite::Result<Applicant> {
    Ok(Applicant {
        u_id: ApplicantId(uuid_at(row, 0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        resume: row.get(3)?,
        resume_text: row.get(4)?,
        job_applied: JobId(uuid_at(row, 5)?),
        relevance: row.get(6)?,
    })
}

fn college_from_row(row: &Row<'_>) -> rusqlite::Result<College> {
    Ok(College {
        u_id: CollegeId(uuid_at(row, 0)?),
        name: row.get(1)?,
        branch: row.get(2)?,
        degree: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        applicant: ApplicantId(uuid_at(row, 6)?),
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        u_id: ProjectId(uuid_at(row, 0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        tech_stack: json_at::<Vec<String>>(row, 3)?,
        time_duration: json_at::<TimeDuration>(row, 4)?,
        applicant: ApplicantId(uuid_at(row, 5)?),
        relevance: row.get(6)?,
    })
}

fn experience_from_row(row: &Row<'_>) -> rusqlite::Result<ProfessionalExperience> {
    Ok(ProfessionalExperience {
        u_id: ExperienceId(uuid_at(row, 0)?),
        role: row.get(1)?,
        organization: row.get(2)?,
        description: row.get(3)?,
        tech_stack: json_at::<Vec<String>>(row, 4)?,
        time_duration: json_at::<TimeDuration>(row, 5)?,
        applicant: ApplicantId(uuid_at(row, 6)?),
        relevance: row.get(7)?,
    })
}

fn collect<T, F>(
    conn: &Connection,
    sql: &str,
    key: Option<String>,
    map: F,
) -> Result<Vec<T>, RepositoryError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql).map_err(unavailable)?;
    let rows = match key {
        Some(key) => stmt.query_map(params![key], map),
        None => stmt.query_map([], map),
    }
    .map_err(unavailable)?;
    rows.collect::<rusqlite::Result<Vec<T>>>()
        .map_err(unavailable)
}

impl ScreeningRepository for SqliteRepository {
    fn insert_document(&self, path: &str) -> Result<Document, RepositoryError> {
        let conn = self.lock()?;
        conn.execute("INSERT INTO documents (document) VALUES (?1)", params![path])
            .map_err(map_write_error)?;
        Ok(Document {
            id: DocumentId(conn.last_insert_rowid()),
            document: path.to_string(),
        })
    }

    fn fetch_document(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, document FROM documents WHERE id = ?1",
            params![id.0],
            document_from_row,
        )
        .optional()
        .map_err(unavailable)
    }

    fn list_documents(&self) -> Result<Vec<Document>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            "SELECT id, document FROM documents ORDER BY id",
            None,
            document_from_row,
        )
    }

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO jobs (u_id, job_title, job_description) VALUES (?1, ?2, ?3)",
            params![job.u_id.to_string(), job.job_title, job.job_description],
        )
        .map_err(map_write_error)?;
        Ok(job)
    }

    fn update_job(&self, job: Job) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE jobs SET job_title = ?2, job_description = ?3 WHERE u_id = ?1",
                params![job.u_id.to_string(), job.job_title, job.job_description],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT u_id, job_title, job_description FROM jobs WHERE u_id = ?1",
            params![id.to_string()],
            job_from_row,
        )
        .optional()
        .map_err(unavailable)
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            "SELECT u_id, job_title, job_description FROM jobs ORDER BY rowid",
            None,
            job_from_row,
        )
    }

    fn delete_job(&self, id: &JobId) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute("DELETE FROM jobs WHERE u_id = ?1", params![id.to_string()])
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn insert_applicant(&self, applicant: Applicant) -> Result<Applicant, RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO applicants ({APPLICANT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                applicant.u_id.to_string(),
                applicant.name,
                applicant.email,
                applicant.resume,
                applicant.resume_text,
                applicant.job_applied.to_string(),
                applicant.relevance,
            ],
        )
        .map_err(map_write_error)?;
        Ok(applicant)
    }

    fn update_applicant(&self, applicant: Applicant) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE applicants SET name = ?2, email = ?3, resume = ?4, resume_text = ?5, \
                 job_applied = ?6, relevance = ?7 WHERE u_id = ?1",
                params![
                    applicant.u_id.to_string(),
                    applicant.name,
                    applicant.email,
                    applicant.resume,
                    applicant.resume_text,
                    applicant.job_applied.to_string(),
                    applicant.relevance,
                ],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn fetch_applicant(&self, id: &ApplicantId) -> Result<Option<Applicant>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {APPLICANT_COLUMNS} FROM applicants WHERE u_id = ?1"),
            params![id.to_string()],
            applicant_from_row,
        )
        .optional()
        .map_err(unavailable)
    }

    fn list_applicants(&self) -> Result<Vec<Applicant>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            &format!("SELECT {APPLICANT_COLUMNS} FROM applicants ORDER BY rowid"),
            None,
            applicant_from_row,
        )
    }

    fn applicants_for_job(&self, job: &JobId) -> Result<Vec<Applicant>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            &format!(
                "SELECT {APPLICANT_COLUMNS} FROM applicants WHERE job_applied = ?1 ORDER BY rowid"
            ),
            Some(job.to_string()),
            applicant_from_row,
        )
    }

    fn delete_applicant(&self, id: &ApplicantId) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "DELETE FROM applicants WHERE u_id = ?1",
                params![id.to_string()],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn insert_college(&self, college: College) -> Result<College, RepositoryError> {
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO colleges ({COLLEGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                college.u_id.to_string(),
                college.name,
                college.branch,
                college.degree,
                college.start_date,
                college.end_date,
                college.applicant.to_string(),
            ],
        )
        .map_err(map_write_error)?;
        Ok(college)
    }

    fn update_college(&self, college: College) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE colleges SET name = ?3, branch = ?4, degree = ?5, start_date = ?6, \
                 end_date = ?7 WHERE u_id = ?1 AND applicant = ?2",
                params![
                    college.u_id.to_string(),
                    college.applicant.to_string(),
                    college.name,
                    college.branch,
                    college.degree,
                    college.start_date,
                    college.end_date,
                ],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn college_for(&self, applicant: &ApplicantId) -> Result<Option<College>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {COLLEGE_COLUMNS} FROM colleges WHERE applicant = ?1"),
            params![applicant.to_string()],
            college_from_row,
        )
        .optional()
        .map_err(unavailable)
    }

    fn delete_college(&self, applicant: &ApplicantId) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "DELETE FROM colleges WHERE applicant = ?1",
                params![applicant.to_string()],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let tech_stack = to_json(&project.tech_stack)?;
        let time_duration = to_json(&project.time_duration)?;
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                project.u_id.to_string(),
                project.title,
                project.description,
                tech_stack,
                time_duration,
                project.applicant.to_string(),
                project.relevance,
            ],
        )
        .map_err(map_write_error)?;
        Ok(project)
    }

    fn update_project(&self, project: Project) -> Result<(), RepositoryError> {
        let tech_stack = to_json(&project.tech_stack)?;
        let time_duration = to_json(&project.time_duration)?;
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE projects SET title = ?2, description = ?3, tech_stack = ?4, \
                 time_duration = ?5, relevance = ?6 WHERE u_id = ?1",
                params![
                    project.u_id.to_string(),
                    project.title,
                    project.description,
                    tech_stack,
                    time_duration,
                    project.relevance,
                ],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE u_id = ?1"),
            params![id.to_string()],
            project_from_row,
        )
        .optional()
        .map_err(unavailable)
    }

    fn projects_for(&self, applicant: &ApplicantId) -> Result<Vec<Project>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE applicant = ?1 ORDER BY rowid"),
            Some(applicant.to_string()),
            project_from_row,
        )
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute("DELETE FROM projects WHERE u_id = ?1", params![id.to_string()])
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn insert_experience(
        &self,
        experience: ProfessionalExperience,
    ) -> Result<ProfessionalExperience, RepositoryError> {
        let tech_stack = to_json(&experience.tech_stack)?;
        let time_duration = to_json(&experience.time_duration)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO professional_experiences ({EXPERIENCE_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ),
            params![
                experience.u_id.to_string(),
                experience.role,
                experience.organization,
                experience.description,
                tech_stack,
                time_duration,
                experience.applicant.to_string(),
                experience.relevance,
            ],
        )
        .map_err(map_write_error)?;
        Ok(experience)
    }

    fn update_experience(&self, experience: ProfessionalExperience) -> Result<(), RepositoryError> {
        let tech_stack = to_json(&experience.tech_stack)?;
        let time_duration = to_json(&experience.time_duration)?;
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE professional_experiences SET role = ?2, organization = ?3, \
                 description = ?4, tech_stack = ?5, time_duration = ?6, relevance = ?7 \
                 WHERE u_id = ?1",
                params![
                    experience.u_id.to_string(),
                    experience.role,
                    experience.organization,
                    experience.description,
                    tech_stack,
                    time_duration,
                    experience.relevance,
                ],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn fetch_experience(
        &self,
        id: &ExperienceId,
    ) -> Result<Option<ProfessionalExperience>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {EXPERIENCE_COLUMNS} FROM professional_experiences WHERE u_id = ?1"),
            params![id.to_string()],
            experience_from_row,
        )
        .optional()
        .map_err(unavailable)
    }

    fn experiences_for(
        &self,
        applicant: &ApplicantId,
    ) -> Result<Vec<ProfessionalExperience>, RepositoryError> {
        let conn = self.lock()?;
        collect(
            &conn,
            &format!(
                "SELECT {EXPERIENCE_COLUMNS} FROM professional_experiences \
                 WHERE applicant = ?1 ORDER BY rowid"
            ),
            Some(applicant.to_string()),
            experience_from_row,
        )
    }

    fn delete_experience(&self, id: &ExperienceId) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "DELETE FROM professional_experiences WHERE u_id = ?1",
                params![id.to_string()],
            )
            .map_err(map_write_error)?;
        expect_changed(changed)
    }

    fn counts(&self) -> Result<TableCounts, RepositoryError> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize, RepositoryError> {
            conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|rows| rows as usize)
            .map_err(unavailable)
        };
        Ok(TableCounts {
            documents: count("documents")?,
            jobs: count("jobs")?,
            applicants: count("applicants")?,
            colleges: count("colleges")?,
            projects: count("projects")?,
            professional_experiences: count("professional_experiences")?,
        })
    }
}

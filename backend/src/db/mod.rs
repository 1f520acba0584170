//! SQLite persistence.
//!
//! `Db` only remembers where the database lives; every operation opens its
//! own `Connection`, the same way each request handler works on a short-lived
//! connection. `migrate` creates the schema at startup and is safe to re-run.
//!
//! List-shaped columns (specialties, applicants, ...) hold JSON text and are
//! read back through [`json_column`].

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::Type;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod organizations;
pub mod users;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    clinic_id TEXT,
    certificate TEXT,
    first_name TEXT,
    last_name TEXT,
    phone TEXT,
    date_of_birth TEXT,
    gender TEXT,
    health_info TEXT,
    plan_type TEXT,
    plan_activated_at TEXT,
    plan_expires_at TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clinics (
    id TEXT PRIMARY KEY,
    owner_id TEXT,
    name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    specialties TEXT NOT NULL DEFAULT '[]',
    services TEXT NOT NULL DEFAULT '[]',
    rating REAL NOT NULL DEFAULT 0,
    review_count INTEGER NOT NULL DEFAULT 0,
    location TEXT NOT NULL DEFAULT '',
    latitude REAL,
    longitude REAL,
    administrator_name TEXT,
    phone TEXT,
    license_number TEXT,
    accepted_insurance TEXT NOT NULL DEFAULT '[]',
    operating_hours TEXT NOT NULL DEFAULT '{}',
    is_verified INTEGER NOT NULL DEFAULT 0,
    trial_ends_at TEXT
);

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    doctor_id TEXT NOT NULL,
    clinic_id TEXT NOT NULL,
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    notes TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS idx_appointments_doctor ON appointments(doctor_id);
CREATE INDEX IF NOT EXISTS idx_appointments_clinic ON appointments(clinic_id);

CREATE TABLE IF NOT EXISTS tenders (
    id TEXT PRIMARY KEY,
    clinic_id TEXT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    requirements TEXT NOT NULL DEFAULT '[]',
    budget REAL,
    estimated_value REAL,
    deadline TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'open',
    applicants TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    clinic_name TEXT NOT NULL DEFAULT '',
    urgency TEXT NOT NULL DEFAULT 'medium',
    location TEXT NOT NULL DEFAULT '',
    contact_person TEXT,
    submission_deadline TEXT,
    evaluation_criteria TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS scan_documents (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    image_md5 TEXT NOT NULL,
    extracted_text TEXT NOT NULL,
    confidence REAL NOT NULL,
    latitude REAL,
    longitude REAL,
    address TEXT,
    scan_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, image_md5)
);

CREATE TABLE IF NOT EXISTS sponsored_clinics (
    clinic_id TEXT PRIMARY KEY,
    featured INTEGER NOT NULL DEFAULT 0,
    starts_at TEXT,
    ends_at TEXT,
    payment_status TEXT NOT NULL DEFAULT 'pending',
    priority INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS medicines (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0,
    pharmacy_id TEXT NOT NULL,
    sponsored INTEGER NOT NULL DEFAULT 0,
    sponsored_start TEXT,
    sponsored_end TEXT,
    payment_status TEXT NOT NULL DEFAULT 'pending',
    priority INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS inventory_logs (
    id TEXT PRIMARY KEY,
    medicine_id TEXT NOT NULL,
    pharmacy_id TEXT NOT NULL,
    action TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    message TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    meta TEXT NOT NULL DEFAULT 'null'
);

CREATE TABLE IF NOT EXISTS compliance_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    action TEXT NOT NULL,
    device_info TEXT,
    result TEXT,
    timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    logo TEXT,
    domain TEXT,
    primary_color TEXT,
    license_type TEXT,
    license_expiry TEXT,
    branding TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY,
    message TEXT NOT NULL,
    level TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    meta TEXT NOT NULL DEFAULT 'null'
);
"#;

/// Location of the SQLite database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Db {
    path: Arc<PathBuf>,
}

impl Db {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(self.path.as_path())?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    pub fn migrate(&self) -> rusqlite::Result<()> {
        self.connect()?.execute_batch(SCHEMA)
    }
}

/// Transaction for read-then-write flows. `BEGIN IMMEDIATE` takes the write
/// lock up front, so a concurrent writer waits on the busy timeout instead of
/// failing with `SQLITE_BUSY` when it upgrades from a read.
pub fn write_transaction(conn: &mut Connection) -> rusqlite::Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation)
}

pub fn to_json<T: Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Reads a JSON text column.
pub fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a text column holding one of the string enums from `common::model`.
pub fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn optional_enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        t.parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

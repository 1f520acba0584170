//! Account rows. Used by auth, profile, plans and the guards.

use chrono::{DateTime, Utc};
use common::model::user::{PlanType, User};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{enum_column, optional_enum_column};

const COLUMNS: &str = "user_id, name, email, role, clinic_id, certificate, first_name, last_name, \
     phone, date_of_birth, gender, plan_type, plan_activated_at, plan_expires_at, created_at, \
     password_hash, health_info";

/// A user as stored: the public record plus the secrets that never leave
/// the backend.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
    /// Encrypted `HealthInfo`, see `crypto::FieldCipher`.
    pub health_cipher: Option<String>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        user: User {
            user_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: enum_column(row, 3)?,
            clinic_id: row.get(4)?,
            certificate: row.get(5)?,
            first_name: row.get(6)?,
            last_name: row.get(7)?,
            phone: row.get(8)?,
            date_of_birth: row.get(9)?,
            gender: optional_enum_column(row, 10)?,
            health_info: None,
            plan_type: optional_enum_column(row, 11)?,
            plan_activated_at: row.get(12)?,
            plan_expires_at: row.get(13)?,
            created_at: row.get(14)?,
        },
        password_hash: row.get(15)?,
        health_cipher: row.get(16)?,
    })
}

pub fn find(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<UserRecord>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE user_id = ?1"),
        params![user_id],
        map_row,
    )
    .optional()
}

/// Login accepts either the user id or the e-mail address.
pub fn find_for_login(conn: &Connection, login: &str) -> rusqlite::Result<Option<UserRecord>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE user_id = ?1 OR lower(email) = lower(?1) LIMIT 1"),
        params![login],
        map_row,
    )
    .optional()
}

pub fn id_or_email_taken(conn: &Connection, user_id: &str, email: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?1 OR lower(email) = lower(?2))",
        params![user_id, email],
        |row| row.get(0),
    )
}

pub fn insert(conn: &Connection, user: &User, password_hash: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, name, email, password_hash, role, clinic_id, certificate, \
         plan_type, plan_activated_at, plan_expires_at, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            user.user_id,
            user.name,
            user.email,
            password_hash,
            user.role.as_str(),
            user.clinic_id,
            user.certificate,
            user.plan_type.map(|p| p.as_str()),
            user.plan_activated_at,
            user.plan_expires_at,
            user.created_at,
        ],
    )?;
    Ok(())
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY created_at"))?;
    let rows = stmt.query_map([], map_row)?;
    rows.map(|r| r.map(|record| record.user)).collect()
}

pub fn update_profile(
    conn: &Connection,
    user: &User,
    health_cipher: Option<&str>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET first_name = ?1, last_name = ?2, phone = ?3, date_of_birth = ?4, \
         gender = ?5, health_info = ?6 WHERE user_id = ?7",
        params![
            user.first_name,
            user.last_name,
            user.phone,
            user.date_of_birth,
            user.gender.map(|g| g.as_str()),
            health_cipher,
            user.user_id,
        ],
    )?;
    Ok(())
}

pub fn update_password(conn: &Connection, user_id: &str, password_hash: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE user_id = ?2",
        params![password_hash, user_id],
    )?;
    Ok(())
}

/// Returns the number of rows touched, zero when the user does not exist.
pub fn update_plan(
    conn: &Connection,
    user_id: &str,
    plan: PlanType,
    activated_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET plan_type = ?1, plan_activated_at = ?2, plan_expires_at = ?3 \
         WHERE user_id = ?4",
        params![plan.as_str(), activated_at, expires_at, user_id],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use common::model::user::Role;
    use tempfile::TempDir;

    fn user(id: &str, email: &str) -> User {
        User {
            user_id: id.to_string(),
            name: "Amina Khelifi".into(),
            email: email.to_string(),
            role: Role::Patient,
            clinic_id: None,
            certificate: None,
            first_name: None,
            last_name: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            health_info: None,
            plan_type: None,
            plan_activated_at: None,
            plan_expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn login_lookup_matches_id_or_email() {
        let dir = TempDir::new().unwrap();
        let db = Db::new(dir.path().join("users.sqlite"));
        db.migrate().unwrap();
        let conn = db.connect().unwrap();
        insert(&conn, &user("amina", "Amina@Example.com"), "hash").unwrap();

        assert!(find_for_login(&conn, "amina").unwrap().is_some());
        assert!(find_for_login(&conn, "amina@example.com").unwrap().is_some());
        assert!(find_for_login(&conn, "nobody").unwrap().is_none());
        assert!(id_or_email_taken(&conn, "other", "AMINA@example.com").unwrap());
        assert!(!id_or_email_taken(&conn, "other", "other@example.com").unwrap());
    }

    #[test]
    fn update_plan_reports_missing_user() {
        let dir = TempDir::new().unwrap();
        let db = Db::new(dir.path().join("users.sqlite"));
        db.migrate().unwrap();
        let conn = db.connect().unwrap();
        let touched = update_plan(&conn, "ghost", PlanType::Pro, Utc::now(), None).unwrap();
        assert_eq!(touched, 0);
    }
}

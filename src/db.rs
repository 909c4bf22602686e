use crate::roll::Roll;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub roll: Roll,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub present_rolls: Vec<Roll>,
    pub absent_rolls: Vec<Roll>,
}

pub fn open_db(path: &Path) -> anyhow::Result<Connection> {
    if path != Path::new(":memory:") {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;

    // No UNIQUE constraints: uniqueness of email and (user_id, roll) is
    // enforced by lookups in the handlers only.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            roll_key TEXT NOT NULL,
            roll_json TEXT NOT NULL,
            name TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_user_roll ON students(user_id, roll_key)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,
            present_rolls TEXT NOT NULL,
            absent_rolls TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_user ON attendance(user_id)",
        [],
    )?;

    Ok(conn)
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, email, password_hash FROM users WHERE email = ? ORDER BY rowid LIMIT 1",
            [email],
            |r| {
                Ok(User {
                    id: r.get(0)?,
                    email: r.get(1)?,
                    password_hash: r.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn insert_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users(id, email, password_hash) VALUES(?, ?, ?)",
        (&user.id, &user.email, &user.password_hash),
    )?;
    Ok(())
}

pub fn student_exists(conn: &Connection, user_id: &str, roll: &Roll) -> anyhow::Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM students WHERE user_id = ? AND roll_key = ? LIMIT 1",
            (user_id, roll.key()),
            |r| r.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn insert_student(conn: &Connection, student: &Student) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO students(id, user_id, roll_key, roll_json, name) VALUES(?, ?, ?, ?, ?)",
        (
            &student.id,
            &student.user_id,
            student.roll.key(),
            student.roll.to_json()?,
            &student.name,
        ),
    )?;
    Ok(())
}

pub fn list_students(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, roll_json, user_id
         FROM students
         WHERE user_id = ?
         ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([user_id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, name, roll_json, user_id)| -> anyhow::Result<Student> {
            Ok(Student {
                id,
                name,
                roll: Roll::from_json(&roll_json)?,
                user_id,
            })
        })
        .collect()
}

/// Every roll on the user's roster, in storage order.
pub fn roster_rolls(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Roll>> {
    Ok(list_students(conn, user_id)?
        .into_iter()
        .map(|s| s.roll)
        .collect())
}

/// Removes at most one matching student. Returns the number removed.
pub fn delete_student(conn: &Connection, user_id: &str, roll: &Roll) -> anyhow::Result<usize> {
    let n = conn.execute(
        "DELETE FROM students WHERE id = (
            SELECT id FROM students WHERE user_id = ? AND roll_key = ? ORDER BY rowid LIMIT 1
        )",
        (user_id, roll.key()),
    )?;
    Ok(n)
}

pub fn insert_attendance(conn: &Connection, record: &AttendanceRecord) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO attendance(id, user_id, date, present_rolls, absent_rolls)
         VALUES(?, ?, ?, ?, ?)",
        (
            &record.id,
            &record.user_id,
            &record.date,
            serde_json::to_string(&record.present_rolls)?,
            serde_json::to_string(&record.absent_rolls)?,
        ),
    )?;
    Ok(())
}

pub fn list_attendance(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<AttendanceRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, date, present_rolls, absent_rolls
         FROM attendance
         WHERE user_id = ?
         ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([user_id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, user_id, date, present, absent)| -> anyhow::Result<AttendanceRecord> {
            Ok(AttendanceRecord {
                id,
                user_id,
                date,
                present_rolls: serde_json::from_str(&present)?,
                absent_rolls: serde_json::from_str(&absent)?,
            })
        })
        .collect()
}

pub fn delete_attendance(conn: &Connection, user_id: &str, id: &str) -> anyhow::Result<usize> {
    let n = conn.execute(
        "DELETE FROM attendance WHERE id = ? AND user_id = ?",
        (id, user_id),
    )?;
    Ok(n)
}

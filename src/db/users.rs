use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Lowercase hex SHA-256 of the password. Deterministic and unsalted so the
/// stored value can be compared directly in SQL.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Store a new username/password pair. The UNIQUE constraint on `username`
/// is the duplicate check; nothing is written when it fires.
pub fn register_user(conn: &Connection, username: &str, password: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO users (username, password) VALUES (?1, ?2)",
        params![username, hash_password(password)],
    )
    .map_err(|err| map_unique_constraint(err, username))?;
    Ok(())
}

/// True iff a stored row matches both the username and the password hash.
pub fn authenticate(conn: &Connection, username: &str, password: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM users WHERE username = ?1 AND password = ?2",
            params![username, hash_password(password)],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn map_unique_constraint(err: SqlError, username: &str) -> Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        Error::UsernameTaken(username.to_string())
    } else {
        err.into()
    }
}

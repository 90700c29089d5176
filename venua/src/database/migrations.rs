//! Database schema management and migrations.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_BOOKING_DATE_INDEX, CREATE_BOOKING_STATE_INDEX, CREATE_BOOKING_TABLE,
    CREATE_BOOKING_USER_INDEX, CREATE_CALENDAR_DATE_TABLE, CREATE_METADATA_TABLE,
    CREATE_PAYMENT_BOOKING_INDEX, CREATE_PAYMENT_TABLE, CURRENT_SCHEMA_VERSION,
    INSERT_SCHEMA_VERSION, SELECT_SCHEMA_VERSION,
};

/// Initializes the database schema on a fresh database.
///
/// # Errors
///
/// Returns an error if any SQL statement fails to execute.
///
/// # Examples
///
/// ```
/// use rusqlite::Connection;
/// use venua::database::migrations::initialize_schema;
///
/// let conn = Connection::open_in_memory().unwrap();
/// initialize_schema(&conn).unwrap();
/// ```
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;
    conn.execute(CREATE_CALENDAR_DATE_TABLE, [])?;
    conn.execute(CREATE_BOOKING_TABLE, [])?;
    conn.execute(CREATE_PAYMENT_TABLE, [])?;

    conn.execute(CREATE_BOOKING_DATE_INDEX, [])?;
    conn.execute(CREATE_BOOKING_USER_INDEX, [])?;
    conn.execute(CREATE_BOOKING_STATE_INDEX, [])?;
    conn.execute(CREATE_PAYMENT_BOOKING_INDEX, [])?;

    conn.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION])?;

    Ok(())
}

/// Gets the current schema version from the database.
///
/// Returns 0 for a database without a metadata table or version row, which
/// signals that initialization is needed.
///
/// # Errors
///
/// Returns an error for database failures other than a missing table or
/// missing row.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    match conn.query_row(SELECT_SCHEMA_VERSION, [], |row| {
        let value: String = row.get(0)?;
        value
            .parse::<i32>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => {
            if let rusqlite::Error::SqliteFailure(ref sqlite_err, _) = e {
                if sqlite_err.code == rusqlite::ErrorCode::Unknown {
                    // Table doesn't exist yet
                    return Ok(0);
                }
            }
            Err(e.into())
        }
    }
}

/// Checks schema compatibility and initializes if needed.
///
/// Version 0 initializes a fresh schema; an older version means a migration
/// is required; a newer version means this client is too old. Both mismatch
/// cases are errors.
///
/// # Errors
///
/// Returns an error on version mismatch or initialization failure.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        initialize_schema(conn)?;
        return Ok(());
    }

    if version != CURRENT_SCHEMA_VERSION {
        return Err(Error::Conflict {
            details: format!(
                "unsupported schema version: expected {CURRENT_SCHEMA_VERSION}, found {version}"
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_fresh_schema() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);

        // All three entity tables exist.
        for table in ["calendar_date", "booking", "payment"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn test_version_zero_for_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_check_compatibility_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        check_schema_compatibility(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);

        // A second check is a no-op.
        check_schema_compatibility(&conn).unwrap();
    }

    #[test]
    fn test_check_compatibility_rejects_newer_version() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION + 1])
            .unwrap();

        let result = check_schema_compatibility(&conn);
        assert!(result.is_err());
    }
}

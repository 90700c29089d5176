//! Database schema definitions and SQL constants.

/// Current schema version for the database.
///
/// Stored in the metadata table and checked on every open to ensure
/// compatibility between the database and the application.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the calendar date table.
///
/// The UNIQUE constraint on `day` is what makes lazy date creation
/// idempotent under concurrent calls: the loser of a racing insert gets a
/// constraint violation and re-fetches the winner's row.
pub const CREATE_CALENDAR_DATE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS calendar_date (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        day TEXT NOT NULL UNIQUE,
        state TEXT NOT NULL DEFAULT 'available',
        price REAL NOT NULL DEFAULT 0.0
    )";

/// SQL statement to create the booking table.
///
/// Bookings reference their calendar date and owning user. Historical
/// (cancelled/archived) bookings may share a `date_id`, so active-booking
/// uniqueness is enforced by the engine under the per-date lock, not here.
pub const CREATE_BOOKING_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS booking (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date_id INTEGER NOT NULL REFERENCES calendar_date(id),
        user_id INTEGER NOT NULL,
        state TEXT NOT NULL DEFAULT 'pending',
        rental_price REAL NOT NULL DEFAULT 0.0,
        created_at INTEGER NOT NULL,
        expires_at INTEGER,
        acceptance_ip TEXT,
        accepted_at INTEGER,
        contract_version TEXT NOT NULL DEFAULT '1.0'
    )";

/// SQL statement to create the payment table.
///
/// ON DELETE RESTRICT backs the business rule that a booking with recorded
/// payments can never be hard-deleted.
pub const CREATE_PAYMENT_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS payment (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        booking_id INTEGER NOT NULL REFERENCES booking(id) ON DELETE RESTRICT,
        amount REAL NOT NULL,
        paid_at INTEGER NOT NULL
    )";

/// Index for booking lookups by date.
pub const CREATE_BOOKING_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_booking_date ON booking(date_id)";

/// Index for booking lookups by user.
pub const CREATE_BOOKING_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_booking_user ON booking(user_id)";

/// Index for state-filtered booking scans (expiry sweep).
pub const CREATE_BOOKING_STATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_booking_state ON booking(state)";

/// Index for payment lookups by booking.
pub const CREATE_PAYMENT_BOOKING_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_payment_booking ON payment(booking_id)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

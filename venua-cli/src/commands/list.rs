//! List command implementation.
//!
//! Displays bookings in table, JSON, or CSV formats.

use crate::error::CliError;
use crate::utils::{format_optional_timestamp, format_timestamp, open_database, GlobalOptions, Services};
use clap::{Args, ValueEnum};
use std::io::Write;
use venua::Booking;

/// Column headers for CSV output.
const COLUMN_HEADERS: [&str; 7] = [
    "id",
    "user_id",
    "date_id",
    "state",
    "rental_price",
    "created_at",
    "expires_at",
];

/// List bookings.
#[derive(Args)]
pub struct ListCommand {
    /// Output format
    #[arg(
        long,
        value_enum,
        default_value = "table",
        env = "VENUA_OUTPUT_FORMAT",
        ignore_case = true
    )]
    pub format: OutputFormat,

    /// Filter by owning user
    #[arg(long, value_name = "USER_ID")]
    pub user: Option<i64>,

    /// Filter by state (pending, confirmed, cancelled, archived)
    #[arg(long, value_name = "STATE")]
    pub state: Option<String>,
}

/// Output format for list commands.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated table format (human-readable)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let services = Services::new()?;

        let mut bookings = match self.user {
            Some(user_id) => services.engine.list_for_user(&db, user_id)?,
            None => services.engine.list(&db)?,
        };

        if let Some(ref state) = self.state {
            let wanted: venua::BookingState = state
                .parse()
                .map_err(|e: String| CliError::InvalidArguments(e))?;
            bookings.retain(|b| b.state == wanted);
        }

        match self.format {
            OutputFormat::Table => format_as_table(&bookings)?,
            OutputFormat::Json => format_as_json(&bookings)?,
            OutputFormat::Csv => format_as_csv(&bookings)?,
        }

        Ok(())
    }
}

/// Format bookings as a human-readable table.
fn format_as_table(bookings: &[Booking]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let header_line = COLUMN_HEADERS
        .iter()
        .map(|s| s.to_uppercase())
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(handle, "{header_line}")?;

    for booking in bookings {
        writeln!(
            handle,
            "{}\t{}\t{}\t{}\t{:.2}\t{}\t{}",
            booking.id,
            booking.user_id,
            booking.date_id,
            booking.state,
            booking.rental_price,
            format_timestamp(booking.created_at),
            format_optional_timestamp(booking.expires_at),
        )?;
    }

    Ok(())
}

/// Format bookings as JSON.
fn format_as_json(bookings: &[Booking]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    serde_json::to_writer_pretty(&mut handle, bookings)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    writeln!(handle)?;
    Ok(())
}

/// Format bookings as CSV.
fn format_as_csv(bookings: &[Booking]) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());

    writer
        .write_record(COLUMN_HEADERS)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;

    for booking in bookings {
        writer
            .write_record([
                booking.id.to_string(),
                booking.user_id.to_string(),
                booking.date_id.to_string(),
                booking.state.to_string(),
                format!("{:.2}", booking.rental_price),
                format_timestamp(booking.created_at),
                format_optional_timestamp(booking.expires_at),
            ])
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    }

    writer.flush()?;
    Ok(())
}

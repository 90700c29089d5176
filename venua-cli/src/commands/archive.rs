//! Archive command implementation.

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions, Services};
use clap::Args;

/// Archive a booking.
///
/// Archiving is the terminal, history-preserving state: payments stay in
/// place and the date is released if the booking still held it.
#[derive(Args)]
pub struct ArchiveCommand {
    /// The booking to archive
    #[arg(value_name = "BOOKING_ID")]
    pub booking: i64,
}

impl ArchiveCommand {
    /// Execute the archive command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let services = Services::new()?;

        let booking = services.engine.archive(&mut db, self.booking)?;

        if !global.quiet {
            println!("Booking {} archived", booking.id);
        }
        Ok(())
    }
}

//! Cancel command implementation.

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions, Services};
use clap::Args;

/// Cancel a booking and release its date.
#[derive(Args)]
pub struct CancelCommand {
    /// The booking to cancel
    #[arg(value_name = "BOOKING_ID")]
    pub booking: i64,
}

impl CancelCommand {
    /// Execute the cancel command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let services = Services::new()?;

        let booking = services.engine.cancel(&mut db, self.booking)?;

        if !global.quiet {
            println!("Booking {} cancelled", booking.id);
        }
        Ok(())
    }
}

//! Confirm command implementation.

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions, Services};
use clap::Args;

/// Confirm a pending booking, reserving its date.
#[derive(Args)]
pub struct ConfirmCommand {
    /// The booking to confirm
    #[arg(value_name = "BOOKING_ID")]
    pub booking: i64,
}

impl ConfirmCommand {
    /// Execute the confirm command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let services = Services::new()?;

        let booking = services.engine.approve(&mut db, self.booking)?;

        if !global.quiet {
            println!("Booking {} confirmed", booking.id);
        }
        Ok(())
    }
}

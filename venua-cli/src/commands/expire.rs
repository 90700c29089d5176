//! Expire command implementation.

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions, Services};
use chrono::Utc;
use clap::Args;
use venua::SweepOperations;

/// Cancel overdue pending bookings, releasing their dates.
#[derive(Args)]
pub struct ExpireCommand {
    /// Report what would be cancelled without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl ExpireCommand {
    /// Execute the expire command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let services = Services::new()?;

        let result =
            SweepOperations::expire_overdue(&mut db, &services.engine, Utc::now(), self.dry_run)?;

        if !global.quiet {
            if self.dry_run {
                println!("Would cancel {} overdue booking(s)", result.expired_count);
            } else {
                println!("Cancelled {} overdue booking(s)", result.expired_count);
            }
            for booking in &result.expired_bookings {
                println!("  booking {} (user {})", booking.id, booking.user_id);
            }
        }
        Ok(())
    }
}

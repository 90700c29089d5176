//! Pay command implementation.

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions, Services};
use clap::Args;

/// Record a payment against a booking.
///
/// The amount must be positive and no larger than the remaining balance.
#[derive(Args)]
pub struct PayCommand {
    /// The booking to pay against
    #[arg(value_name = "BOOKING_ID")]
    pub booking: i64,

    /// The payment amount
    #[arg(long, value_name = "AMOUNT")]
    pub amount: f64,
}

impl PayCommand {
    /// Execute the pay command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut db = open_database(global)?;
        let services = Services::new()?;

        let payment = services.ledger.record(&mut db, self.booking, self.amount)?;
        let balance = services.ledger.remaining_balance(&db, self.booking)?;

        if !global.quiet {
            println!(
                "Recorded payment {} of {:.2}; remaining balance {:.2}",
                payment.id, payment.amount, balance
            );
        }
        Ok(())
    }
}

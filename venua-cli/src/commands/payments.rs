//! Payments command implementation.

use crate::error::CliError;
use crate::utils::{format_timestamp, open_database, GlobalOptions, Services};
use clap::Args;
use std::io::Write;

/// List the payments recorded for a booking.
#[derive(Args)]
pub struct PaymentsCommand {
    /// The booking to list payments for
    #[arg(value_name = "BOOKING_ID")]
    pub booking: i64,

    /// Emit JSON instead of the table form
    #[arg(long)]
    pub json: bool,
}

impl PaymentsCommand {
    /// Execute the payments command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let services = Services::new()?;

        let payments = services.ledger.payments(&db, self.booking)?;
        let balance = services.ledger.remaining_balance(&db, self.booking)?;

        if self.json {
            let value = serde_json::json!({
                "payments": payments,
                "remaining_balance": balance,
            });
            println!("{}", serde_json::to_string_pretty(&value).unwrap());
            return Ok(());
        }

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "ID\tAMOUNT\tPAID_AT")?;
        for payment in &payments {
            writeln!(
                handle,
                "{}\t{:.2}\t{}",
                payment.id,
                payment.amount,
                format_timestamp(payment.paid_at)
            )?;
        }
        writeln!(handle, "remaining balance: {balance:.2}")?;

        Ok(())
    }
}

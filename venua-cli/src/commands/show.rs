//! Show command implementation.

use crate::error::CliError;
use crate::utils::{format_timestamp, open_database, GlobalOptions, Services};
use clap::Args;
use venua::Error;

/// Show one booking with its payments and derived balance.
#[derive(Args)]
pub struct ShowCommand {
    /// The booking to show
    #[arg(value_name = "BOOKING_ID")]
    pub booking: i64,

    /// Emit JSON instead of the human-readable form
    #[arg(long)]
    pub json: bool,
}

impl ShowCommand {
    /// Execute the show command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let services = Services::new()?;

        let booking = services
            .engine
            .find(&db, self.booking)?
            .ok_or_else(|| {
                CliError::Library(Error::NotFound {
                    resource: format!("booking {}", self.booking),
                })
            })?;
        let date = db.get_date(booking.date_id)?;
        let payments = services.ledger.payments(&db, booking.id)?;
        let balance = services.ledger.remaining_balance(&db, booking.id)?;

        if self.json {
            let value = serde_json::json!({
                "booking": booking,
                "day": date.as_ref().map(|d| d.day),
                "payments": payments,
                "remaining_balance": balance,
            });
            println!("{}", serde_json::to_string_pretty(&value).unwrap());
            return Ok(());
        }

        println!("Booking {}", booking.id);
        if let Some(date) = date {
            println!("  day:              {} ({})", date.day, date.state);
        }
        println!("  user:             {}", booking.user_id);
        println!("  state:            {}", booking.state);
        println!("  rental price:     {:.2}", booking.rental_price);
        println!("  created:          {}", format_timestamp(booking.created_at));
        println!("  contract version: {}", booking.contract_version);
        if let Some(ip) = &booking.acceptance_ip {
            println!("  accepted from:    {ip}");
        }
        println!("  payments:         {}", payments.len());
        for payment in &payments {
            println!(
                "    #{} {:.2} at {}",
                payment.id,
                payment.amount,
                format_timestamp(payment.paid_at)
            );
        }
        println!("  remaining:        {balance:.2}");

        Ok(())
    }
}

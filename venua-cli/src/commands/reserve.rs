//! Reserve command implementation.

use crate::error::CliError;
use crate::utils::{open_database, parse_day_arg, GlobalOptions, Services};
use chrono::Utc;
use clap::Args;
use venua::engine::CreateBookingOptions;
use venua::BookingState;

/// Reserve a date for a user.
///
/// The calendar date is created lazily if the day has never been referenced
/// before. By default the booking starts pending; `--confirmed` creates it
/// confirmed (reserving the date outright).
#[derive(Args)]
pub struct ReserveCommand {
    /// The day to reserve (YYYY-MM-DD)
    #[arg(long, value_name = "DAY")]
    pub day: String,

    /// The user the booking belongs to
    #[arg(long, value_name = "USER_ID")]
    pub user: i64,

    /// Create the booking already confirmed
    #[arg(long)]
    pub confirmed: bool,

    /// Rental price (defaults to the date's estimated price)
    #[arg(long, value_name = "AMOUNT")]
    pub price: Option<f64>,

    /// Expiry deadline for a pending booking (YYYY-MM-DD)
    #[arg(long, value_name = "DAY")]
    pub expires: Option<String>,

    /// IP address the contract was accepted from
    #[arg(long, value_name = "IP")]
    pub ip: Option<String>,

    /// Contract version to stamp on the booking
    #[arg(long, value_name = "VERSION")]
    pub contract_version: Option<String>,
}

impl ReserveCommand {
    /// Execute the reserve command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let day = parse_day_arg(&self.day)?;
        let expires_at = self
            .expires
            .as_deref()
            .map(parse_day_arg)
            .transpose()?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());

        let mut db = open_database(global)?;
        let services = Services::new()?;

        let date = services.dates.get_or_create(&mut db, day)?;

        let state = if self.confirmed {
            BookingState::Confirmed
        } else {
            BookingState::Pending
        };

        // Pending bookings without an explicit deadline pick up the
        // configured implicit one, so the expiry sweep can reclaim them.
        let expires_at = match expires_at {
            Some(at) => Some(at),
            None if state == BookingState::Pending => services
                .config
                .pending_expiry_days
                .map(|days| Utc::now() + chrono::Duration::days(i64::from(days))),
            None => None,
        };

        let contract_version = self
            .contract_version
            .unwrap_or_else(|| services.config.effective_contract_version());

        let options = CreateBookingOptions::new(self.user, date.id)
            .with_state(state)
            .with_rental_price(self.price)
            .with_expires_at(expires_at)
            .with_acceptance_ip(self.ip)
            .with_accepted_at(Some(Utc::now()))
            .with_contract_version(Some(contract_version));

        let booking = services.engine.create(&mut db, options)?;

        if !global.quiet {
            println!(
                "Booked {} for user {} (booking {}, {})",
                day, booking.user_id, booking.id, booking.state
            );
        }
        Ok(())
    }
}

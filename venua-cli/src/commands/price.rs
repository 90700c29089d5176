//! Price command implementation.

use crate::error::CliError;
use crate::utils::{open_database, parse_day_arg, GlobalOptions, Services};
use clap::Args;

/// Set the estimated price for a date.
///
/// The date is created lazily if the day has never been referenced.
#[derive(Args)]
pub struct PriceCommand {
    /// The day to price (YYYY-MM-DD)
    #[arg(long, value_name = "DAY")]
    pub day: String,

    /// The estimated price
    #[arg(long, value_name = "AMOUNT")]
    pub value: f64,
}

impl PriceCommand {
    /// Execute the price command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let day = parse_day_arg(&self.day)?;

        let mut db = open_database(global)?;
        let services = Services::new()?;

        let date = services.dates.get_or_create(&mut db, day)?;
        let updated = services.dates.update_price(&mut db, date.id, self.value)?;

        if !global.quiet {
            println!("Priced {} at {:.2}", updated.day, updated.price);
        }
        Ok(())
    }
}

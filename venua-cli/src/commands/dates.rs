//! Dates command implementation.

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions, Services};
use clap::Args;
use std::io::Write;

/// List calendar dates and their availability.
#[derive(Args)]
pub struct DatesCommand {
    /// Emit JSON instead of the table form
    #[arg(long)]
    pub json: bool,

    /// Only show dates in this state (available, pending, reserved)
    #[arg(long, value_name = "STATE")]
    pub state: Option<String>,
}

impl DatesCommand {
    /// Execute the dates command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let services = Services::new()?;

        let mut dates = services.dates.list(&db)?;

        if let Some(ref state) = self.state {
            let wanted: venua::DateState = state
                .parse()
                .map_err(|e: String| CliError::InvalidArguments(e))?;
            dates.retain(|d| d.state == wanted);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&dates).unwrap());
            return Ok(());
        }

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "ID\tDAY\tSTATE\tPRICE")?;
        for date in &dates {
            writeln!(
                handle,
                "{}\t{}\t{}\t{:.2}",
                date.id, date.day, date.state, date.price
            )?;
        }

        Ok(())
    }
}

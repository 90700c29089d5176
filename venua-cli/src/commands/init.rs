//! Init command implementation.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use venua::{Database, DatabaseConfig};

/// Initialize the data directory and database.
#[derive(Args)]
pub struct InitCommand {}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let data_dir = match &global.data_dir {
            Some(dir) => dir.clone(),
            None => venua::database::default_data_dir()
                .map_err(|e| CliError::Config(e.to_string()))?,
        };

        let db_path = data_dir.join("venua.db");
        let already_existed = db_path.exists();

        Database::open(DatabaseConfig::new(&db_path))?;

        if !global.quiet {
            if already_existed {
                println!("Database already initialized at {}", db_path.display());
            } else {
                println!("Initialized database at {}", db_path.display());
            }
        }
        Ok(())
    }
}

//! Remove-payment command implementation.

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions, Services};
use clap::Args;
use venua::MasterCredential;

/// Remove a payment.
///
/// Removal is gated on the master key: the supplied value must match the
/// `VENUA_MASTER_KEY` environment variable. The balance needs no patching
/// afterward, since it is always recomputed from the remaining payments.
#[derive(Args)]
pub struct RemovePaymentCommand {
    /// The payment to remove
    #[arg(value_name = "PAYMENT_ID")]
    pub payment: i64,

    /// Master key authorizing the removal
    #[arg(long, value_name = "KEY")]
    pub master_key: String,
}

impl RemovePaymentCommand {
    /// Execute the remove-payment command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // The credential check is the CLI's job as the auth boundary; the
        // library only demands the issued token.
        let expected = std::env::var("VENUA_MASTER_KEY")
            .map_err(|_| CliError::Config("VENUA_MASTER_KEY is not configured".to_string()))?;
        if self.master_key != expected {
            return Err(CliError::InvalidArguments(
                "master key does not match".to_string(),
            ));
        }
        let credential = MasterCredential::issue();

        let mut db = open_database(global)?;
        let services = Services::new()?;

        let removed = services.ledger.remove(&mut db, self.payment, &credential)?;

        if !global.quiet {
            if removed {
                println!("Payment {} removed", self.payment);
            } else {
                println!("Payment {} not found", self.payment);
            }
        }
        Ok(())
    }
}

//! CLI command implementations.
//!
//! One module per subcommand:
//! - `init`: initialize the data directory and database
//! - `reserve`: reserve a date for a user
//! - `confirm` / `cancel` / `archive`: booking state transitions
//! - `list` / `show`: booking queries
//! - `dates` / `price`: calendar management
//! - `pay` / `payments` / `remove_payment`: the payment ledger
//! - `expire`: cancel overdue pending bookings
//! - `completions`: shell completion generation

pub mod archive;
pub mod cancel;
pub mod completions;
pub mod confirm;
pub mod dates;
pub mod expire;
pub mod init;
pub mod list;
pub mod pay;
pub mod payments;
pub mod price;
pub mod remove_payment;
pub mod reserve;
pub mod show;

pub use archive::ArchiveCommand;
pub use cancel::CancelCommand;
pub use completions::CompletionsCommand;
pub use confirm::ConfirmCommand;
pub use dates::DatesCommand;
pub use expire::ExpireCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use pay::PayCommand;
pub use payments::PaymentsCommand;
pub use price::PriceCommand;
pub use remove_payment::RemovePaymentCommand;
pub use reserve::ReserveCommand;
pub use show::ShowCommand;

//! CLI structure and command definitions.
//!
//! Defines the main CLI structure using clap's derive macros, including
//! global options and subcommands.

use crate::commands::{
    ArchiveCommand, CancelCommand, CompletionsCommand, ConfirmCommand, DatesCommand,
    ExpireCommand, InitCommand, ListCommand, PayCommand, PaymentsCommand, PriceCommand,
    RemovePaymentCommand, ReserveCommand, ShowCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for managing venue date reservations.
#[derive(Parser)]
#[command(name = "venua")]
#[command(version, about = "Manage venue date reservations and payments", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "VENUA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "VENUA_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    /// Disable automatic database initialization
    #[arg(long, global = true, env = "VENUA_DISABLE_AUTOINIT")]
    pub disable_autoinit: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the data directory and database
    Init(InitCommand),

    /// Reserve a date for a user
    Reserve(ReserveCommand),

    /// Confirm a pending booking
    Confirm(ConfirmCommand),

    /// Cancel a booking and release its date
    Cancel(CancelCommand),

    /// Archive a booking, preserving its history
    Archive(ArchiveCommand),

    /// List bookings
    List(ListCommand),

    /// Show one booking with its payments and balance
    Show(ShowCommand),

    /// List calendar dates and their availability
    Dates(DatesCommand),

    /// Set the estimated price for a date
    Price(PriceCommand),

    /// Record a payment against a booking
    Pay(PayCommand),

    /// List the payments recorded for a booking
    Payments(PaymentsCommand),

    /// Remove a payment (master key required)
    RemovePayment(RemovePaymentCommand),

    /// Cancel overdue pending bookings
    Expire(ExpireCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

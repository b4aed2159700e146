//! Command-line interface for the parlour binary.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "parlour", about = "Salon booking backend", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Recompute fees and refunds for cancelled bookings that are not yet settled
    FixCancelledRefunds {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Send the owed refund for one cancelled booking to Razorpay
    ProcessRefund {
        /// Booking ID
        booking_id: String,
    },
    /// Create an admin API key and print it once
    CreateAdminKey {
        /// Who or what the key is for
        #[arg(long)]
        label: String,
    },
}

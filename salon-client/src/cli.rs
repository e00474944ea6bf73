//! Command-line argument parsing for the salon client
//!
//! Uses clap for argument parsing with derive macros.

use clap::Parser;

/// salon - line-oriented chat client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server host to connect to
    #[arg(long, default_value = "127.0.0.1", env = "SALON_HOST")]
    pub host: String,

    /// Server port
    #[arg(long, short = 'p', default_value_t = salon_protocol::DEFAULT_PORT, env = "SALON_PORT")]
    pub port: u16,

    /// Pseudo to send automatically once connected
    ///
    /// Without it, the server's prompt is answered interactively.
    #[arg(long)]
    pub pseudo: Option<String>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! salon - interactive chat client

mod cli;
mod connection;

use salon_utils::{init_logging_with_config, LogConfig, Result};

use cli::Args;
use connection::Connection;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging_with_config(LogConfig::client())?;
    let args = Args::parse_args();

    let conn = Connection::connect(&args.host, args.port).await?;
    conn.run(args.pseudo).await
}

//! Socket wiring for the interactive client
//!
//! The server's output is not strictly line-framed (the pseudo prompt has no
//! terminator), so received bytes are forwarded to stdout as they arrive
//! rather than through a line decoder.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use salon_utils::{Result, SalonError};

/// Client connection to the salon server
pub struct Connection {
    stream: TcpStream,
}

impl Connection {
    /// Connect to the server
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&addr).await.map_err(|e| {
            SalonError::Connection(format!("failed to connect to {}: {}", addr, e))
        })?;
        debug!("Connected to {}", addr);
        Ok(Self { stream })
    }

    /// Pipe stdin lines to the server and server bytes to stdout until
    /// either side closes
    pub async fn run(mut self, pseudo: Option<String>) -> Result<()> {
        let (mut read_half, mut write_half) = self.stream.split();

        if let Some(pseudo) = pseudo {
            write_half
                .write_all(format!("{}\n", pseudo).as_bytes())
                .await?;
        }

        let mut input_lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        let mut buf = [0u8; 4096];

        loop {
            tokio::select! {
                read = read_half.read(&mut buf) => match read? {
                    0 => {
                        debug!("Server closed the connection");
                        break;
                    }
                    n => {
                        stdout.write_all(&buf[..n]).await?;
                        stdout.flush().await?;
                    }
                },
                line = input_lines.next_line() => match line? {
                    Some(line) => {
                        write_half
                            .write_all(format!("{}\n", line).as_bytes())
                            .await
                            .map_err(|_| SalonError::ConnectionClosed)?;
                    }
                    None => {
                        debug!("stdin closed");
                        break;
                    }
                },
            }
        }

        Ok(())
    }
}

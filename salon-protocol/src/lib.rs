//! salon-protocol: Shared wire definitions for client-server communication
//!
//! This crate defines the newline-delimited text protocol spoken between the
//! salon client and server over TCP: the line codec, the server-to-client
//! message catalog, and client command parsing.

pub mod codec;
pub mod command;
pub mod messages;

// Re-export main types at crate root
pub use codec::{CodecError, ServerCodec};
pub use command::{Command, CommandError};
pub use messages::ServerText;

/// Default TCP port the server listens on
pub const DEFAULT_PORT: u16 = 6667;

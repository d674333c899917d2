//! # iec104_link
//!
//! IEC 60870-5-104 connection engine for tokio.
//!
//! The crate runs the link layer of the telecontrol protocol commonly used
//! in power systems and SCADA: APDU framing, the k/w sequence window, the
//! t1/t2/t3 timers and the STARTDT/STOPDT/TESTFR handshakes, plus a codec
//! for ASDUs and their information elements.
//!
//! ## Features
//!
//! - **Any byte stream**: a [`Connection`] runs over anything that is
//!   `AsyncRead + AsyncWrite`, TCP in production
//! - **Ordered callbacks**: events reach the listener one at a time, in order
//! - **Full type table**: all standard type identifications, plus hooks for
//!   private types
//! - **Configurable widths**: 1 or 2 octet COT and common address, 1 to 3
//!   octet object addresses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use iec104_link::{ConnectionEvent, ConnectionSettings, Iec104Client, QOI_STATION};
//!
//! #[tokio::main]
//! async fn main() -> iec104_link::Result<()> {
//!     let client = Iec104Client::new(ConnectionSettings::default());
//!     let (tx, mut events) = tokio::sync::mpsc::unbounded_channel();
//!     let connection = client.connect_and_start("192.168.1.100:2404", Arc::new(tx)).await?;
//!
//!     // Request general interrogation
//!     connection.interrogation(1, QOI_STATION).await?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             ConnectionEvent::Asdu(asdu) => println!("{asdu}"),
//!             ConnectionEvent::Closed(cause) => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol Overview
//!
//! IEC 60870-5-104 uses TCP/IP for communication (default port 2404).
//! The protocol defines three frame types:
//!
//! - **I-frame**: Information transfer (contains ASDU)
//! - **S-frame**: Supervisory (acknowledgment)
//! - **U-frame**: Unnumbered (control: STARTDT, STOPDT, TESTFR)
//!
//! ### APDU Structure
//!
//! ```text
//! APCI (6 bytes):
//! +--------+--------+--------+--------+--------+--------+
//! | 0x68   | Length | Control Field (4 bytes)           |
//! +--------+--------+--------+--------+--------+--------+
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod client;
pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod sequence;
pub mod server;
pub mod timer;
pub mod types;

// Re-export main types
pub use client::Iec104Client;
pub use codec::{Apdu, Iec104Codec};
pub use commands::{
    CommandOptions, DirectoryEntry, QCC_GENERAL_REQUEST, QOI_STATION, QRP_GENERAL_RESET,
};
pub use config::{ConnectionSettings, DEFAULT_PORT};
pub use connection::{Connection, ConnectionId, ConnectionIdGenerator, LinkState};
pub use dispatch::{ConnectionEvent, ConnectionEventListener};
pub use error::{Iec104Error, Result, TimeoutKind, TransportErrorKind};
pub use server::{Iec104Server, ServerConnection};
pub use types::*;

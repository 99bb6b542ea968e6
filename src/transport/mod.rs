// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

//! Platform boundary for MIDI output.
//!
//! Everything that talks to the operating system or a driver library
//! lives behind the [`Transport`] trait. Device bookkeeping is written
//! once against this trait.

use std::borrow::Cow;

use thiserror::Error;

pub mod memory;

#[cfg(feature = "midir")]
pub mod midir;

#[cfg(all(windows, feature = "winmm"))]
pub mod winmm;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no output port named \"{name}\"")]
    PortNotFound { name: String },

    #[error("no output port with index {index}")]
    InvalidIndex { index: usize },

    #[error("init: {msg}")]
    Init { msg: Cow<'static, str> },

    #[error("connect: {msg}")]
    Connect { msg: Cow<'static, str> },

    #[error("send: {msg}")]
    Send { msg: Cow<'static, str> },

    /// A system call returned a non-zero result code.
    #[error("{function} failed with code {code}")]
    Os { function: &'static str, code: u32 },

    #[error("library: {msg}")]
    Library { msg: Cow<'static, str> },
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Addresses an output port for opening.
///
/// Carries both the display name and the ordinal index from the
/// enumeration. Backends that open ports by name ignore the index
/// and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPortRef<'a> {
    pub name: &'a str,
    pub index: usize,
}

/// Enumerate, open, send to, and close MIDI output ports.
pub trait Transport {
    /// Opaque handle of an opened output port
    type Handle;

    /// Display names of all currently visible output ports.
    ///
    /// The position of each name is its ordinal index.
    #[must_use]
    fn list_output_devices(&self) -> Vec<String>;

    fn open_output(&self, port: &OutputPortRef<'_>) -> TransportResult<Self::Handle>;

    fn send(&self, handle: &mut Self::Handle, message: &[u8]) -> TransportResult<()>;

    fn close_output(&self, handle: Self::Handle) -> TransportResult<()>;
}

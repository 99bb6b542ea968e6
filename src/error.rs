// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

use crate::TransportError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no MIDI output device matching \"{pattern}\"")]
    NotFound { pattern: String },

    #[error("failed to open MIDI output device \"{name}\"")]
    OpenFailed {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to send to MIDI output device \"{name}\"")]
    SendFailed {
        name: String,
        #[source]
        source: TransportError,
    },

    /// The device has been removed from the registry nevertheless.
    #[error("failed to close MIDI output device \"{name}\"")]
    CloseFailed {
        name: String,
        #[source]
        source: TransportError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

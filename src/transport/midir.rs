// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use std::borrow::Cow;

use midir::{
    ConnectError, InitError, MidiOutput, MidiOutputConnection, MidiOutputPort, SendError,
};

use super::{OutputPortRef, Transport, TransportError, TransportResult};

const DEFAULT_CLIENT_NAME: &str = "midiout";

impl From<InitError> for TransportError {
    fn from(err: InitError) -> Self {
        TransportError::Init {
            msg: err.to_string().into(),
        }
    }
}

impl From<ConnectError<MidiOutput>> for TransportError {
    fn from(err: ConnectError<MidiOutput>) -> Self {
        TransportError::Connect {
            msg: err.to_string().into(),
        }
    }
}

impl From<SendError> for TransportError {
    fn from(err: SendError) -> Self {
        TransportError::Send {
            msg: err.to_string().into(),
        }
    }
}

/// Output ports driven by [`midir`].
///
/// Ports are opened by name.
#[allow(missing_debug_implementations)]
pub struct MidirTransport {
    client_name: Cow<'static, str>,
    output: MidiOutput,
}

impl MidirTransport {
    pub fn new() -> TransportResult<Self> {
        Self::with_client_name(DEFAULT_CLIENT_NAME)
    }

    /// The client name is announced to the MIDI subsystem of the
    /// operating system for every opened connection.
    pub fn with_client_name(client_name: impl Into<Cow<'static, str>>) -> TransportResult<Self> {
        let client_name = client_name.into();
        let output = MidiOutput::new(&format!("{client_name} output port watcher"))?;
        Ok(Self {
            client_name,
            output,
        })
    }

    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    fn find_output_port(&self, port_name: &str) -> Option<MidiOutputPort> {
        self.output.ports().into_iter().find(|port| {
            self.output
                .port_name(port)
                .is_ok_and(|name| name == port_name)
        })
    }
}

impl Transport for MidirTransport {
    type Handle = MidiOutputConnection;

    fn list_output_devices(&self) -> Vec<String> {
        self.output
            .ports()
            .iter()
            .filter_map(|port| match self.output.port_name(port) {
                Ok(port_name) => Some(port_name),
                Err(err) => {
                    log::warn!("Skipping output port without name: {err}");
                    None
                }
            })
            .collect()
    }

    fn open_output(&self, port: &OutputPortRef<'_>) -> TransportResult<Self::Handle> {
        let OutputPortRef { name, index: _ } = *port;
        let Some(output_port) = self.find_output_port(name) else {
            return Err(TransportError::PortNotFound {
                name: name.to_owned(),
            });
        };
        let output = MidiOutput::new(&self.client_name)?;
        output.connect(&output_port, name).map_err(Into::into)
    }

    fn send(&self, handle: &mut Self::Handle, message: &[u8]) -> TransportResult<()> {
        handle.send(message).map_err(Into::into)
    }

    fn close_output(&self, handle: Self::Handle) -> TransportResult<()> {
        // Closing a midir connection cannot fail.
        let _output = handle.close();
        Ok(())
    }
}

// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

//! In-process output ports.
//!
//! Nothing is sent anywhere. All operations are recorded and can be
//! inspected afterwards, failures can be injected on demand.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{OutputPortRef, Transport, TransportError, TransportResult};
use crate::ChannelVoiceMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryEvent {
    Opened { name: String },
    Sent { name: String, message: Vec<u8> },
    Closed { name: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureInjection {
    pub open: bool,
    pub send: bool,
    pub close: bool,
}

/// Opened in-process port
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryHandle {
    id: u64,
    name: String,
}

impl MemoryHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default)]
struct State {
    devices: Vec<String>,
    failures: FailureInjection,
    next_handle_id: u64,
    open_handle_ids: Vec<u64>,
    events: Vec<MemoryEvent>,
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new<S>(devices: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        let state = State {
            devices: devices.into_iter().map(Into::into).collect(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the visible devices, e.g. to simulate unplugging.
    pub fn set_devices<S>(&self, devices: impl IntoIterator<Item = S>)
    where
        S: Into<String>,
    {
        self.lock().devices = devices.into_iter().map(Into::into).collect();
    }

    pub fn set_failures(&self, failures: FailureInjection) {
        self.lock().failures = failures;
    }

    #[must_use]
    pub fn events(&self) -> Vec<MemoryEvent> {
        self.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.lock().events.clear();
    }

    /// All messages that have been sent to the named device.
    #[must_use]
    pub fn sent_messages(&self, name: &str) -> Vec<ChannelVoiceMessage> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                MemoryEvent::Sent {
                    name: sent_to,
                    message,
                } if sent_to == name => ChannelVoiceMessage::try_from(message.as_slice()).ok(),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn open_count(&self, name: &str) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|event| matches!(event, MemoryEvent::Opened { name: opened } if opened == name))
            .count()
    }

    /// Number of handles that have been opened and not yet closed.
    #[must_use]
    pub fn open_handle_count(&self) -> usize {
        self.lock().open_handle_ids.len()
    }
}

impl Transport for MemoryTransport {
    type Handle = MemoryHandle;

    fn list_output_devices(&self) -> Vec<String> {
        self.lock().devices.clone()
    }

    fn open_output(&self, port: &OutputPortRef<'_>) -> TransportResult<Self::Handle> {
        let mut state = self.lock();
        if !state.devices.iter().any(|name| name == port.name) {
            return Err(TransportError::PortNotFound {
                name: port.name.to_owned(),
            });
        }
        if state.failures.open {
            return Err(TransportError::Connect {
                msg: "injected failure".into(),
            });
        }
        let id = state.next_handle_id;
        state.next_handle_id += 1;
        state.open_handle_ids.push(id);
        state.events.push(MemoryEvent::Opened {
            name: port.name.to_owned(),
        });
        Ok(MemoryHandle {
            id,
            name: port.name.to_owned(),
        })
    }

    fn send(&self, handle: &mut Self::Handle, message: &[u8]) -> TransportResult<()> {
        let mut state = self.lock();
        if !state.open_handle_ids.contains(&handle.id) {
            return Err(TransportError::Send {
                msg: "invalid handle".into(),
            });
        }
        if state.failures.send {
            return Err(TransportError::Send {
                msg: "injected failure".into(),
            });
        }
        state.events.push(MemoryEvent::Sent {
            name: handle.name.clone(),
            message: message.to_vec(),
        });
        Ok(())
    }

    fn close_output(&self, handle: Self::Handle) -> TransportResult<()> {
        let mut state = self.lock();
        // The handle is consumed and invalid afterwards, even on failure.
        state.open_handle_ids.retain(|&id| id != handle.id);
        if state.failures.close {
            return Err(TransportError::Os {
                function: "close_output",
                code: 1,
            });
        }
        state.events.push(MemoryEvent::Closed { name: handle.name });
        Ok(())
    }
}

// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    ChannelVoiceMessage, Error, OutputPortRef, Registry, ResolvedDevice, Result, Transport,
};

/// Resolved MIDI output device
///
/// Sends notes through the handle that is registered under its name
/// and keeps track of all notes that are currently on. Closing the
/// device turns all these notes off.
///
/// Note messages are only sent while the device is open. Otherwise
/// [`Device::note_on()`] and [`Device::note_off()`] silently do nothing.
#[allow(missing_debug_implementations)]
pub struct Device<T: Transport> {
    registry: Arc<Registry<T>>,
    name: String,
    index: usize,
    // note -> channel of the most recent note on
    notes_on: BTreeMap<u8, u8>,
}

impl<T: Transport> Device<T> {
    /// Resolve a device by (partial) name.
    ///
    /// See also: [`resolve()`](crate::resolve())
    pub fn new(registry: Arc<Registry<T>>, pattern: &str) -> Result<Self> {
        let resolved = registry.resolve(pattern)?;
        Ok(Self::from_resolved(registry, resolved))
    }

    #[must_use]
    pub fn from_resolved(registry: Arc<Registry<T>>, resolved: ResolvedDevice) -> Self {
        let ResolvedDevice { name, index } = resolved;
        Self {
            registry,
            name,
            index,
            notes_on: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry<T>> {
        &self.registry
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.registry.contains(&self.name)
    }

    #[must_use]
    pub fn is_note_on(&self, note: u8) -> bool {
        self.notes_on.contains_key(&note)
    }

    /// All notes that are currently on in ascending order.
    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.notes_on.keys().copied()
    }

    /// Open the device.
    ///
    /// Does nothing if a device with the same name is already open.
    pub fn open(&self) -> Result<()> {
        let port = OutputPortRef {
            name: &self.name,
            index: self.index,
        };
        match self.registry.open(&port) {
            Ok(true) => {
                log::debug!("Opened \"{name}\"", name = self.name);
                Ok(())
            }
            Ok(false) => {
                log::debug!("Already open \"{name}\"", name = self.name);
                Ok(())
            }
            Err(source) => {
                log::debug!("Failed to open \"{name}\": {source}", name = self.name);
                Err(Error::OpenFailed {
                    name: self.name.clone(),
                    source,
                })
            }
        }
    }

    /// Send a note on message.
    ///
    /// Values are masked into their valid range. Does nothing if the
    /// device is not open.
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<()> {
        let message = ChannelVoiceMessage::note_on(channel, note, velocity);
        if !self.send(&message)? {
            return Ok(());
        }
        self.notes_on.insert(message.note(), message.channel());
        Ok(())
    }

    /// Send a note off message.
    ///
    /// Values are masked into their valid range. Does nothing if the
    /// device is not open.
    pub fn note_off(&mut self, channel: u8, note: u8) -> Result<()> {
        let message = ChannelVoiceMessage::note_off(channel, note);
        if !self.send(&message)? {
            return Ok(());
        }
        self.notes_on.remove(&message.note());
        Ok(())
    }

    // Returns `false` if the device is not open.
    fn send(&self, message: &ChannelVoiceMessage) -> Result<bool> {
        let Some(result) = self.registry.send(&self.name, message.as_bytes()) else {
            log::debug!(
                "Not sending {kind} {message} to \"{name}\": not open",
                kind = message.kind(),
                name = self.name
            );
            return Ok(false);
        };
        if let Err(source) = result {
            log::debug!("Failed to send {message} to \"{name}\": {source}", name = self.name);
            return Err(Error::SendFailed {
                name: self.name.clone(),
                source,
            });
        }
        log::trace!(
            "[{name}] {kind} {channel} {note} {velocity}",
            name = self.name,
            kind = message.kind(),
            channel = message.channel(),
            note = message.note(),
            velocity = message.velocity(),
        );
        Ok(true)
    }

    /// Turn off all notes that are on and close the device.
    ///
    /// The device is unregistered even if closing the underlying
    /// handle fails. Does nothing if the device is not open.
    pub fn close(&mut self) -> Result<()> {
        for (note, channel) in std::mem::take(&mut self.notes_on) {
            if let Err(err) = self.note_off(channel, note) {
                log::warn!("Failed to turn off note {note} on channel {channel}: {err}");
            }
        }
        let Some(result) = self.registry.close(&self.name) else {
            return Ok(());
        };
        match result {
            Ok(()) => {
                log::debug!("Closed \"{name}\"", name = self.name);
                Ok(())
            }
            Err(source) => Err(Error::CloseFailed {
                name: self.name.clone(),
                source,
            }),
        }
    }
}

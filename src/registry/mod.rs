// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Mutex, MutexGuard},
};

use crate::{resolve, OutputPortRef, ResolvedDevice, Result, Transport, TransportResult};

/// Open output devices by name
///
/// Owns the [`Transport`] and all handles opened through it. Every
/// operation is serialized by a single lock that is shared by all
/// devices. At most one handle is open per device name.
///
/// Usually shared between [`Device`](crate::Device)s through an `Arc`.
#[allow(missing_debug_implementations)]
pub struct Registry<T: Transport> {
    transport: T,
    open_devices: Mutex<HashMap<String, T::Handle>>,
}

impl<T: Transport> Registry<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            open_devices: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, T::Handle>> {
        self.open_devices.lock().unwrap_or_else(|err| {
            log::warn!("Recovering open devices after a panic");
            err.into_inner()
        })
    }

    /// Names of all visible output devices, ordered by their index.
    #[must_use]
    pub fn output_devices(&self) -> Vec<String> {
        self.transport.list_output_devices()
    }

    /// Find the first output device with a name that contains `pattern`.
    ///
    /// See also: [`resolve()`]
    pub fn resolve(&self, pattern: &str) -> Result<ResolvedDevice> {
        resolve(&self.transport, pattern)
    }

    /// Register an opened handle.
    ///
    /// The handle is given back if the name is already occupied.
    pub fn insert(
        &self,
        name: impl Into<String>,
        handle: T::Handle,
    ) -> std::result::Result<(), T::Handle> {
        match self.lock().entry(name.into()) {
            Entry::Occupied(_) => Err(handle),
            Entry::Vacant(entry) => {
                entry.insert(handle);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Access the handle of an open device while holding the lock.
    ///
    /// Returns `None` if the device is not open.
    pub fn with_handle<R>(
        &self,
        name: &str,
        f: impl FnOnce(&T, &mut T::Handle) -> R,
    ) -> Option<R> {
        let mut open_devices = self.lock();
        let handle = open_devices.get_mut(name)?;
        Some(f(&self.transport, handle))
    }

    /// Unregister a handle without closing it.
    pub fn remove(&self, name: &str) -> Option<T::Handle> {
        self.lock().remove(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Names of all open devices in no particular order.
    #[must_use]
    pub fn open_device_names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Close all open devices.
    ///
    /// Failures are logged and otherwise ignored. The registry is
    /// empty afterwards. Returns the number of devices that have
    /// been closed successfully.
    pub fn close_all(&self) -> usize {
        let mut open_devices = self.lock();
        let mut closed_count = 0;
        for (name, handle) in open_devices.drain() {
            match self.transport.close_output(handle) {
                Ok(()) => {
                    log::debug!("Closed \"{name}\"");
                    closed_count += 1;
                }
                Err(err) => {
                    log::warn!("Failed to close \"{name}\": {err}");
                }
            }
        }
        debug_assert!(open_devices.is_empty());
        closed_count
    }

    /// Open a device unless it is already open.
    ///
    /// Returns `true` if the device has been opened by this call.
    pub(crate) fn open(&self, port: &OutputPortRef<'_>) -> TransportResult<bool> {
        let mut open_devices = self.lock();
        if open_devices.contains_key(port.name) {
            return Ok(false);
        }
        let handle = self.transport.open_output(port)?;
        open_devices.insert(port.name.to_owned(), handle);
        Ok(true)
    }

    /// Send a message to an open device.
    ///
    /// Returns `None` if the device is not open.
    pub(crate) fn send(&self, name: &str, message: &[u8]) -> Option<TransportResult<()>> {
        self.with_handle(name, |transport, handle| transport.send(handle, message))
    }

    /// Unregister and close a device.
    ///
    /// The handle is unregistered before closing it and will not be
    /// reused even if closing fails. The device cannot be reopened
    /// until its handle has been closed. Returns `None` if the device
    /// is not open.
    pub(crate) fn close(&self, name: &str) -> Option<TransportResult<()>> {
        let mut open_devices = self.lock();
        let handle = open_devices.remove(name)?;
        Some(self.transport.close_output(handle))
    }
}

#[cfg(test)]
mod tests;

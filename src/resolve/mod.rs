// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use crate::{Error, Result, Transport};

/// Output device found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDevice {
    /// Exact display name
    pub name: String,

    /// Position in the enumeration at the time of resolution
    pub index: usize,
}

/// Find the first name that contains `pattern`, ignoring case.
#[must_use]
pub fn find_device<S>(names: &[S], pattern: &str) -> Option<ResolvedDevice>
where
    S: AsRef<str>,
{
    let pattern = pattern.to_lowercase();
    names
        .iter()
        .map(AsRef::<str>::as_ref)
        .enumerate()
        .find(|(_, name)| name.to_lowercase().contains(&pattern))
        .map(|(index, name)| ResolvedDevice {
            name: name.to_owned(),
            index,
        })
}

/// Find the first output device with a name that contains `pattern`, ignoring case.
pub fn resolve<T>(transport: &T, pattern: &str) -> Result<ResolvedDevice>
where
    T: Transport + ?Sized,
{
    let names = transport.list_output_devices();
    let Some(device) = find_device(&names, pattern) else {
        log::debug!(
            "No output device matching \"{pattern}\" among {count} device(s)",
            count = names.len()
        );
        return Err(Error::NotFound {
            pattern: pattern.to_owned(),
        });
    };
    log::debug!(
        "Resolved \"{pattern}\" to output device #{index} \"{name}\"",
        index = device.index,
        name = device.name
    );
    Ok(device)
}

#[cfg(test)]
mod tests;

// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use super::*;
use crate::transport::memory::MemoryTransport;

const NAMES: &[&str] = &["USB MIDI 1", "Loopback"];

#[test]
fn resolve_first_match_ignoring_case() {
    let transport = MemoryTransport::new(NAMES.iter().copied());
    let device = resolve(&transport, "usb").unwrap();
    assert_eq!("USB MIDI 1", device.name);
    assert_eq!(0, device.index);

    let device = resolve(&transport, "LOOP").unwrap();
    assert_eq!("Loopback", device.name);
    assert_eq!(1, device.index);
}

#[test]
fn resolve_not_found() {
    let transport = MemoryTransport::new(NAMES.iter().copied());
    assert!(matches!(
        resolve(&transport, "xyz"),
        Err(Error::NotFound { pattern }) if pattern == "xyz"
    ));
}

#[test]
fn resolve_empty_pattern() {
    let transport = MemoryTransport::new(NAMES.iter().copied());
    assert_eq!(
        Some(ResolvedDevice {
            name: "USB MIDI 1".to_owned(),
            index: 0,
        }),
        resolve(&transport, "").ok()
    );

    let transport = MemoryTransport::new(Vec::<String>::new());
    assert!(matches!(
        resolve(&transport, ""),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn find_device_returns_first_of_multiple_matches() {
    let names = ["Midi Through Port-0", "USB MIDI 1", "USB MIDI 2"];
    assert_eq!(
        Some(ResolvedDevice {
            name: "USB MIDI 1".to_owned(),
            index: 1,
        }),
        find_device(&names, "usb midi")
    );
    assert_eq!(
        Some(0),
        find_device(&names, "midi").map(|device| device.index)
    );
}

#[test]
fn find_device_matches_are_contained() {
    let names = ["Arturia KeyStep 37", "Digitakt", "loopMIDI Port"];
    for pattern in ["key", "STEP", "akt", "midi port", "t", "Port", "none", "37x"] {
        match find_device(&names, pattern) {
            Some(device) => {
                assert_eq!(names[device.index], device.name);
                assert!(device
                    .name
                    .to_lowercase()
                    .contains(&pattern.to_lowercase()));
                // No earlier name matches
                assert!(names[..device.index]
                    .iter()
                    .all(|name| !name.to_lowercase().contains(&pattern.to_lowercase())));
            }
            None => {
                assert!(names
                    .iter()
                    .all(|name| !name.to_lowercase().contains(&pattern.to_lowercase())));
            }
        }
    }
}

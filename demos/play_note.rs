// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use std::{sync::Arc, thread::sleep, time::Duration};

use midiout::{Device, PlatformTransport, Registry};

const DEFAULT_PATTERN: &str = "USB MIDI";

fn main() {
    pretty_env_logger::init();
    match run() {
        Ok(()) => (),
        Err(err) => println!("Error: {err:#}"),
    }
}

fn run() -> anyhow::Result<()> {
    let pattern = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PATTERN.to_owned());

    let registry = Arc::new(Registry::new(PlatformTransport::new()?));
    let names = registry.output_devices();
    println!("Found {count} output device(s)", count = names.len());
    for (index, name) in names.iter().enumerate() {
        println!("{index}: {name}");
    }
    if names.is_empty() {
        return Ok(());
    }

    let mut device = Device::new(Arc::clone(&registry), &pattern)?;
    println!(
        "Playing on device #{index}: {name}",
        index = device.index(),
        name = device.name()
    );
    device.open()?;

    device.note_on(0, 72, 100)?;
    sleep(Duration::from_secs(1));
    device.note_off(0, 72)?;
    sleep(Duration::from_secs(1));

    // Left on intentionally, turned off when closing.
    device.note_on(0, 76, 100)?;
    sleep(Duration::from_secs(1));
    device.close()?;

    registry.close_all();
    Ok(())
}

// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use super::*;
use crate::transport::memory::{FailureInjection, MemoryEvent, MemoryTransport};

fn new_registry() -> Registry<MemoryTransport> {
    Registry::new(MemoryTransport::new(["USB MIDI 1", "Loopback", "Synth"]))
}

fn port(name: &str) -> OutputPortRef<'_> {
    OutputPortRef { name, index: 0 }
}

#[test]
fn open_is_idempotent() {
    let registry = new_registry();
    assert!(registry.open(&port("Loopback")).unwrap());
    assert!(!registry.open(&port("Loopback")).unwrap());
    assert_eq!(1, registry.len());
    assert_eq!(1, registry.transport().open_count("Loopback"));
}

#[test]
fn open_unknown_device_leaves_registry_unchanged() {
    let registry = new_registry();
    assert!(registry.open(&port("Unknown")).is_err());
    assert!(registry.is_empty());
    assert!(registry.transport().events().is_empty());
}

#[test]
fn insert_does_not_replace() {
    let transport = MemoryTransport::new(["Synth"]);
    let first = transport.open_output(&port("Synth")).unwrap();
    let second = transport.open_output(&port("Synth")).unwrap();
    let registry = Registry::new(transport);
    assert!(registry.insert("Synth", first).is_ok());
    let rejected = registry.insert("Synth", second).unwrap_err();
    assert_eq!("Synth", rejected.name());
    assert_eq!(1, registry.len());
}

#[test]
fn lookup_and_remove() {
    let registry = new_registry();
    assert!(!registry.contains("Synth"));
    assert_eq!(None, registry.with_handle("Synth", |_, _| ()));
    registry.open(&port("Synth")).unwrap();
    assert!(registry.contains("Synth"));
    assert_eq!(
        Some("Synth".to_owned()),
        registry.with_handle("Synth", |_, handle| handle.name().to_owned())
    );
    let handle = registry.remove("Synth").unwrap();
    assert_eq!("Synth", handle.name());
    assert!(!registry.contains("Synth"));
    assert!(registry.remove("Synth").is_none());
}

#[test]
fn send_requires_open_device() {
    let registry = new_registry();
    assert!(registry.send("Synth", &[0x90, 60, 100]).is_none());
    registry.open(&port("Synth")).unwrap();
    assert!(matches!(registry.send("Synth", &[0x90, 60, 100]), Some(Ok(()))));
}

#[test]
fn close_removes_entry_even_on_failure() {
    let registry = new_registry();
    registry.open(&port("Synth")).unwrap();
    registry.transport().set_failures(FailureInjection {
        close: true,
        ..Default::default()
    });
    assert!(matches!(registry.close("Synth"), Some(Err(_))));
    assert!(!registry.contains("Synth"));
    assert_eq!(0, registry.transport().open_handle_count());
    assert!(registry.close("Synth").is_none());
}

#[test]
fn close_all() {
    let registry = new_registry();
    for name in ["USB MIDI 1", "Loopback", "Synth"] {
        registry.open(&port(name)).unwrap();
    }
    let mut names = registry.open_device_names();
    names.sort();
    assert_eq!(vec!["Loopback", "Synth", "USB MIDI 1"], names);

    assert_eq!(3, registry.close_all());
    assert!(registry.is_empty());
    assert_eq!(0, registry.transport().open_handle_count());
    let closed_count = registry
        .transport()
        .events()
        .iter()
        .filter(|event| matches!(event, MemoryEvent::Closed { .. }))
        .count();
    assert_eq!(3, closed_count);
}

#[test]
fn close_all_ignores_failures() {
    let registry = new_registry();
    registry.open(&port("USB MIDI 1")).unwrap();
    registry.open(&port("Loopback")).unwrap();
    registry.transport().set_failures(FailureInjection {
        close: true,
        ..Default::default()
    });
    assert_eq!(0, registry.close_all());
    assert!(registry.is_empty());

    // Nothing left to close
    assert_eq!(0, registry.close_all());
}

#[test]
fn reopen_after_close() {
    let registry = new_registry();
    registry.open(&port("Synth")).unwrap();
    registry.close("Synth").unwrap().unwrap();
    assert!(registry.open(&port("Synth")).unwrap());
    assert_eq!(2, registry.transport().open_count("Synth"));
}

#[test]
fn output_devices() {
    let registry = new_registry();
    assert_eq!(
        vec!["USB MIDI 1", "Loopback", "Synth"],
        registry.output_devices()
    );
    assert_eq!(2, registry.resolve("synth").unwrap().index);
}

#[test]
fn concurrent_open_creates_single_handle() {
    let registry = std::sync::Arc::new(new_registry());
    let threads = (0..8)
        .map(|_| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || registry.open(&port("Synth")).unwrap())
        })
        .collect::<Vec<_>>();
    let opened_count = threads
        .into_iter()
        .map(|thread| thread.join().unwrap())
        .filter(|&opened| opened)
        .count();
    assert_eq!(1, opened_count);
    assert_eq!(1, registry.transport().open_count("Synth"));
    assert_eq!(1, registry.transport().open_handle_count());
}

/// Blocks inside `close_output()` until released.
struct BlockingCloseTransport {
    inner: MemoryTransport,
    closing_tx: std::sync::Mutex<std::sync::mpsc::Sender<()>>,
    release_rx: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    max_open_handle_count: std::sync::atomic::AtomicUsize,
}

impl Transport for BlockingCloseTransport {
    type Handle = <MemoryTransport as Transport>::Handle;

    fn list_output_devices(&self) -> Vec<String> {
        self.inner.list_output_devices()
    }

    fn open_output(&self, port: &OutputPortRef<'_>) -> TransportResult<Self::Handle> {
        let handle = self.inner.open_output(port)?;
        self.max_open_handle_count.fetch_max(
            self.inner.open_handle_count(),
            std::sync::atomic::Ordering::SeqCst,
        );
        Ok(handle)
    }

    fn send(&self, handle: &mut Self::Handle, message: &[u8]) -> TransportResult<()> {
        self.inner.send(handle, message)
    }

    fn close_output(&self, handle: Self::Handle) -> TransportResult<()> {
        self.closing_tx.lock().unwrap().send(()).unwrap();
        self.release_rx.lock().unwrap().recv().unwrap();
        self.inner.close_output(handle)
    }
}

#[test]
fn reopen_waits_until_handle_is_closed() {
    let (closing_tx, closing_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel();
    let registry = std::sync::Arc::new(Registry::new(BlockingCloseTransport {
        inner: MemoryTransport::new(["Synth"]),
        closing_tx: std::sync::Mutex::new(closing_tx),
        release_rx: std::sync::Mutex::new(release_rx),
        max_open_handle_count: Default::default(),
    }));
    assert!(registry.open(&port("Synth")).unwrap());

    let closing = {
        let registry = std::sync::Arc::clone(&registry);
        std::thread::spawn(move || registry.close("Synth"))
    };
    closing_rx.recv().unwrap();

    let reopening = {
        let registry = std::sync::Arc::clone(&registry);
        std::thread::spawn(move || registry.open(&port("Synth")).unwrap())
    };
    std::thread::sleep(std::time::Duration::from_millis(50));
    // Still closing the first handle
    assert_eq!(1, registry.transport().inner.open_handle_count());
    assert_eq!(1, registry.transport().inner.open_count("Synth"));

    release_tx.send(()).unwrap();
    assert!(matches!(closing.join().unwrap(), Some(Ok(()))));
    assert!(reopening.join().unwrap());

    assert!(registry.contains("Synth"));
    assert_eq!(2, registry.transport().inner.open_count("Synth"));
    assert_eq!(
        1,
        registry
            .transport()
            .max_open_handle_count
            .load(std::sync::atomic::Ordering::SeqCst)
    );
}

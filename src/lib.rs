// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

#![allow(rustdoc::invalid_rust_codeblocks)]
#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(rustdoc::broken_intra_doc_links)]
// Repetitions of module/type names occur frequently when using many
// modules for keeping the size of the source files handy. Often
// types have the same name as their parent module.
#![allow(clippy::module_name_repetitions)]

mod device;
pub use self::device::Device;

mod error;
pub use self::error::{Error, Result};

mod message;
pub use self::message::{ChannelVoiceMessage, InvalidMessage, MessageKind};

mod registry;
pub use self::registry::Registry;

mod resolve;
pub use self::resolve::{find_device, resolve, ResolvedDevice};

pub mod transport;
pub use self::transport::{OutputPortRef, Transport, TransportError, TransportResult};

/// The native transport of the target platform
#[cfg(all(windows, feature = "winmm"))]
pub type PlatformTransport = transport::winmm::WinmmTransport;

/// The native transport of the target platform
#[cfg(all(feature = "midir", not(all(windows, feature = "winmm"))))]
pub type PlatformTransport = transport::midir::MidirTransport;

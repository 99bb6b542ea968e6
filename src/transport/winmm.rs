// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

//! Windows multimedia API, bound dynamically from `winmm.dll`.
//!
//! Ports are opened by their ordinal index.

#![allow(unsafe_code)]

use std::mem::size_of;

use libloading::Library;

use crate::ChannelVoiceMessage;

use super::{OutputPortRef, Transport, TransportError, TransportResult};

const LIBRARY_NAME: &str = "winmm.dll";

const MMSYSERR_NOERROR: u32 = 0;

const CALLBACK_NULL: u32 = 0;

const MAXPNAMELEN: usize = 32;

/// Substitute for ports that fail to report their capabilities.
///
/// Keeps the positions of all other ports aligned with their index.
const UNKNOWN_PORT_NAME: &str = "Failed to get capabilities";

#[repr(C)]
#[derive(Debug)]
#[allow(dead_code)] // layout of MIDIOUTCAPSW
struct MidiOutCapsW {
    w_mid: u16,
    w_pid: u16,
    v_driver_version: u32,
    sz_pname: [u16; MAXPNAMELEN],
    w_technology: u16,
    w_voices: u16,
    w_notes: u16,
    w_channel_mask: u16,
    dw_support: u32,
}

impl MidiOutCapsW {
    const fn zeroed() -> Self {
        Self {
            w_mid: 0,
            w_pid: 0,
            v_driver_version: 0,
            sz_pname: [0; MAXPNAMELEN],
            w_technology: 0,
            w_voices: 0,
            w_notes: 0,
            w_channel_mask: 0,
            dw_support: 0,
        }
    }

    fn port_name(&self) -> String {
        let len = self
            .sz_pname
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(MAXPNAMELEN);
        String::from_utf16_lossy(&self.sz_pname[..len])
    }
}

// HMIDIOUT is pointer-sized and only ever passed back to the API.
type RawHandle = usize;

type MidiOutGetNumDevs = unsafe extern "system" fn() -> u32;
type MidiOutGetDevCapsW = unsafe extern "system" fn(usize, *mut MidiOutCapsW, u32) -> u32;
type MidiOutOpen = unsafe extern "system" fn(*mut RawHandle, u32, usize, usize, u32) -> u32;
type MidiOutShortMsg = unsafe extern "system" fn(RawHandle, u32) -> u32;
type MidiOutClose = unsafe extern "system" fn(RawHandle) -> u32;

/// Opened output port
#[derive(Debug)]
pub struct WinmmHandle {
    raw: RawHandle,
}

fn check(function: &'static str, code: u32) -> TransportResult<()> {
    if code == MMSYSERR_NOERROR {
        Ok(())
    } else {
        Err(TransportError::Os { function, code })
    }
}

fn load_symbol<T: Copy>(library: &Library, symbol: &'static [u8]) -> TransportResult<T> {
    let symbol = unsafe { library.get::<T>(symbol) }.map_err(|err| TransportError::Library {
        msg: err.to_string().into(),
    })?;
    Ok(*symbol)
}

/// Output ports of the Windows multimedia API.
#[allow(missing_debug_implementations)]
pub struct WinmmTransport {
    midi_out_get_num_devs: MidiOutGetNumDevs,
    midi_out_get_dev_caps: MidiOutGetDevCapsW,
    midi_out_open: MidiOutOpen,
    midi_out_short_msg: MidiOutShortMsg,
    midi_out_close: MidiOutClose,
    // Must outlive the function pointers above.
    _library: Library,
}

impl WinmmTransport {
    pub fn new() -> TransportResult<Self> {
        let library = unsafe { Library::new(LIBRARY_NAME) }.map_err(|err| {
            TransportError::Library {
                msg: format!("failed to load {LIBRARY_NAME}: {err}").into(),
            }
        })?;
        log::debug!("Loaded {LIBRARY_NAME}");
        Ok(Self {
            midi_out_get_num_devs: load_symbol(&library, b"midiOutGetNumDevs\0")?,
            midi_out_get_dev_caps: load_symbol(&library, b"midiOutGetDevCapsW\0")?,
            midi_out_open: load_symbol(&library, b"midiOutOpen\0")?,
            midi_out_short_msg: load_symbol(&library, b"midiOutShortMsg\0")?,
            midi_out_close: load_symbol(&library, b"midiOutClose\0")?,
            _library: library,
        })
    }

    fn num_devs(&self) -> u32 {
        unsafe { (self.midi_out_get_num_devs)() }
    }

    fn port_name(&self, index: u32) -> TransportResult<String> {
        let mut caps = MidiOutCapsW::zeroed();
        #[allow(clippy::cast_possible_truncation)]
        let caps_size = size_of::<MidiOutCapsW>() as u32;
        let code = unsafe { (self.midi_out_get_dev_caps)(index as usize, &mut caps, caps_size) };
        check("midiOutGetDevCapsW", code)?;
        Ok(caps.port_name())
    }
}

impl Transport for WinmmTransport {
    type Handle = WinmmHandle;

    fn list_output_devices(&self) -> Vec<String> {
        (0..self.num_devs())
            .map(|index| {
                self.port_name(index).unwrap_or_else(|err| {
                    log::warn!("Output port #{index}: {err}");
                    UNKNOWN_PORT_NAME.to_owned()
                })
            })
            .collect()
    }

    fn open_output(&self, port: &OutputPortRef<'_>) -> TransportResult<Self::Handle> {
        let OutputPortRef { name, index } = *port;
        let device_id = u32::try_from(index)
            .ok()
            .filter(|&device_id| device_id < self.num_devs())
            .ok_or(TransportError::InvalidIndex { index })?;
        log::debug!("Opening output port #{device_id} \"{name}\"");
        let mut raw: RawHandle = 0;
        let code = unsafe { (self.midi_out_open)(&mut raw, device_id, 0, 0, CALLBACK_NULL) };
        check("midiOutOpen", code)?;
        Ok(WinmmHandle { raw })
    }

    fn send(&self, handle: &mut Self::Handle, message: &[u8]) -> TransportResult<()> {
        let short_message = ChannelVoiceMessage::try_from(message)
            .map_err(|err| TransportError::Send {
                msg: format!("{err}: {message:02x?}").into(),
            })?
            .to_short_message();
        let code = unsafe { (self.midi_out_short_msg)(handle.raw, short_message) };
        check("midiOutShortMsg", code)
    }

    fn close_output(&self, handle: Self::Handle) -> TransportResult<()> {
        let WinmmHandle { raw } = handle;
        let code = unsafe { (self.midi_out_close)(raw) };
        check("midiOutClose", code)
    }
}

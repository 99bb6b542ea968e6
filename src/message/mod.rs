// SPDX-FileCopyrightText: The midiout authors
// SPDX-License-Identifier: MPL-2.0

use strum::FromRepr;

const CHANNEL_MASK: u8 = 0x0f;
const DATA_MASK: u8 = 0x7f;

/// Status nibble of the supported channel-voice messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, strum::Display)]
#[repr(u8)]
pub enum MessageKind {
    NoteOff = 0x80,
    NoteOn = 0x90,
}

/// 3-byte MIDI channel-voice message
///
/// Channel, note and velocity are masked into their valid range
/// instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("{_0:02x?}")]
pub struct ChannelVoiceMessage([u8; 3]);

impl ChannelVoiceMessage {
    #[must_use]
    pub const fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(MessageKind::NoteOn, channel, note, velocity)
    }

    /// Note-off with release velocity 0.
    #[must_use]
    pub const fn note_off(channel: u8, note: u8) -> Self {
        Self::new(MessageKind::NoteOff, channel, note, 0)
    }

    #[must_use]
    const fn new(kind: MessageKind, channel: u8, data1: u8, data2: u8) -> Self {
        Self([
            kind as u8 | (channel & CHANNEL_MASK),
            data1 & DATA_MASK,
            data2 & DATA_MASK,
        ])
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        if self.0[0] & !CHANNEL_MASK == MessageKind::NoteOn as u8 {
            MessageKind::NoteOn
        } else {
            MessageKind::NoteOff
        }
    }

    #[must_use]
    pub const fn channel(&self) -> u8 {
        self.0[0] & CHANNEL_MASK
    }

    #[must_use]
    pub const fn note(&self) -> u8 {
        self.0[1]
    }

    #[must_use]
    pub const fn velocity(&self) -> u8 {
        self.0[2]
    }

    /// Pack into a "short message" word.
    ///
    /// The status byte occupies the lowest byte, followed by the
    /// first and second data byte. The highest byte is unused.
    #[must_use]
    pub const fn to_short_message(&self) -> u32 {
        let [status, data1, data2] = self.0;
        u32::from_le_bytes([status, data1, data2, 0])
    }
}

impl TryFrom<&[u8]> for ChannelVoiceMessage {
    type Error = InvalidMessage;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let &[status, data1, data2] = bytes else {
            return Err(InvalidMessage);
        };
        let kind = MessageKind::from_repr(status & !CHANNEL_MASK).ok_or(InvalidMessage)?;
        if data1 > DATA_MASK || data2 > DATA_MASK {
            return Err(InvalidMessage);
        }
        Ok(Self::new(kind, status, data1, data2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not a note-on/note-off message")]
pub struct InvalidMessage;

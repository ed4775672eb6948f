//! Scale frame decoding.
//!
//! The scale exposes the same readings through two incompatible byte layouts:
//! GATT notifications carrying a `0x1D 0x02` header with a message-type byte,
//! and BLE advertisement manufacturer data with fixed little/big-endian fields.
//! The two cannot be told apart reliably from the bytes alone, so the caller
//! always names the [`FrameLayout`] it received.

use crate::bytes::{FieldError, read_uint_be, read_uint_le};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Header bytes opening every GATT notification frame.
pub const NOTIFICATION_HEADER: [u8; 2] = [0x1D, 0x02];

/// Minimum length of a GATT notification frame.
pub const NOTIFICATION_MIN_LEN: usize = 17;

/// Minimum length of an advertisement payload (the unit flag sits at offset 15).
pub const ADVERTISEMENT_MIN_LEN: usize = 16;

/// Historic frames are only stored readings when this byte is set at offset 7.
const HISTORIC_STORED_FLAG: u8 = 0x80;
const HISTORIC_FLAG_OFFSET: usize = 7;

/// Notification weights occupy the low 18 bits of a 24-bit field.
const NOTIFICATION_WEIGHT_MASK: u32 = 0x3FFFF;

/// Grams per notification weight unit.
const NOTIFICATION_WEIGHT_DIVISOR: f64 = 1000.0;

/// Advertisement weights are in units of 10 g.
const ADVERTISEMENT_WEIGHT_DIVISOR: f64 = 100.0;

/// Errors returned when a payload cannot be decoded into a [`RawFrame`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty frame")]
    EmptyFrame,
    #[error("Frame too short: {len} bytes (need at least {min})")]
    FrameTooShort { len: usize, min: usize },
    #[error("Unrecognized header: {:02X} {:02X}", .0[0], .0[1])]
    UnrecognizedHeader([u8; 2]),
    #[error("Unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),
    /// A historic frame that only echoes a real-time reading. Callers drop it silently.
    #[error("Skipped real-time duplicate")]
    SkippedRealtimeDuplicate,
    #[error("Field out of range: {0}")]
    OutOfRange(#[from] FieldError),
}

impl DecodeError {
    /// `true` for errors that mean "ignore this frame" rather than "bad frame".
    pub fn is_skippable(&self) -> bool {
        matches!(self, DecodeError::SkippedRealtimeDuplicate)
    }
}

/// Which transport delivered the payload, and therefore which layout to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FrameLayout {
    /// Manufacturer-data payload from a BLE advertisement
    #[default]
    Advertisement,
    /// GATT notification / characteristic read with the `0x1D 0x02` header
    Notification,
}

impl std::fmt::Display for FrameLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameLayout::Advertisement => write!(f, "advertisement"),
            FrameLayout::Notification => write!(f, "notification"),
        }
    }
}

/// Message-type discriminator at offset 2 of a notification frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Historic,
    RealtimeWeight,
    RealtimeImpedance,
    Unknown(u8),
}

impl From<u8> for MessageType {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => MessageType::Historic,
            0x80 => MessageType::RealtimeWeight,
            0x01 => MessageType::RealtimeImpedance,
            other => MessageType::Unknown(other),
        }
    }
}

/// Raw fields extracted from a single frame, before any unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFrame {
    /// Stored reading replayed by the scale, with the time it was taken.
    Historic {
        timestamp: u32,
        weight_raw: u32,
        impedance_raw: u16,
    },
    RealtimeWeight {
        weight_raw: u32,
    },
    RealtimeImpedance {
        impedance_raw: u16,
    },
    Advertisement {
        weight_raw: u16,
        impedance_raw: u16,
        unit_flag: u8,
    },
}

impl RawFrame {
    /// Layout this frame was decoded from.
    pub fn layout(&self) -> FrameLayout {
        match self {
            RawFrame::Advertisement { .. } => FrameLayout::Advertisement,
            _ => FrameLayout::Notification,
        }
    }

    /// Weight in kilograms, if the frame carries one.
    pub fn weight_kg(&self) -> Option<f64> {
        match *self {
            RawFrame::Historic { weight_raw, .. } | RawFrame::RealtimeWeight { weight_raw } => {
                Some(f64::from(weight_raw) / NOTIFICATION_WEIGHT_DIVISOR)
            }
            RawFrame::Advertisement { weight_raw, .. } => {
                Some(f64::from(weight_raw) / ADVERTISEMENT_WEIGHT_DIVISOR)
            }
            RawFrame::RealtimeImpedance { .. } => None,
        }
    }

    pub fn impedance_raw(&self) -> Option<u16> {
        match *self {
            RawFrame::Historic { impedance_raw, .. }
            | RawFrame::RealtimeImpedance { impedance_raw }
            | RawFrame::Advertisement { impedance_raw, .. } => Some(impedance_raw),
            RawFrame::RealtimeWeight { .. } => None,
        }
    }

    /// Display-unit flag; only advertisements carry one.
    pub fn unit_flag(&self) -> Option<u8> {
        match *self {
            RawFrame::Advertisement { unit_flag, .. } => Some(unit_flag),
            _ => None,
        }
    }

    /// Time of a historic reading. `None` for live frames.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match *self {
            RawFrame::Historic { timestamp, .. } => {
                DateTime::from_timestamp(i64::from(timestamp), 0)
            }
            _ => None,
        }
    }
}

/// Decode `raw` using the layout the caller received it through.
pub fn decode(layout: FrameLayout, raw: &[u8]) -> Result<RawFrame, DecodeError> {
    match layout {
        FrameLayout::Advertisement => decode_advertisement(raw),
        FrameLayout::Notification => decode_notification(raw),
    }
}

fn check_len(raw: &[u8], min: usize) -> Result<(), DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::EmptyFrame);
    }
    if raw.len() < min {
        return Err(DecodeError::FrameTooShort {
            len: raw.len(),
            min,
        });
    }
    Ok(())
}

fn read_weight_24(raw: &[u8], offset: usize) -> Result<u32, DecodeError> {
    // A 24-bit read always fits in u32.
    let weight = read_uint_be(raw, offset, 3)? as u32;
    Ok(weight & NOTIFICATION_WEIGHT_MASK)
}

fn read_u16_be(raw: &[u8], offset: usize) -> Result<u16, DecodeError> {
    Ok(read_uint_be(raw, offset, 2)? as u16)
}

/// Decode a GATT notification frame.
///
/// Validation fails fast in order: empty buffer, short buffer, header,
/// then message type.
pub fn decode_notification(raw: &[u8]) -> Result<RawFrame, DecodeError> {
    check_len(raw, NOTIFICATION_MIN_LEN)?;

    let header = [raw[0], raw[1]];
    if header != NOTIFICATION_HEADER {
        return Err(DecodeError::UnrecognizedHeader(header));
    }

    let message_type = MessageType::from(raw[2]);
    tracing::trace!(?message_type, len = raw.len(), "decoding notification frame");

    match message_type {
        MessageType::Historic => {
            if raw[HISTORIC_FLAG_OFFSET] != HISTORIC_STORED_FLAG {
                return Err(DecodeError::SkippedRealtimeDuplicate);
            }
            Ok(RawFrame::Historic {
                timestamp: read_uint_be(raw, 3, 4)? as u32,
                weight_raw: read_weight_24(raw, 8)?,
                impedance_raw: read_u16_be(raw, 15)?,
            })
        }
        MessageType::RealtimeWeight => Ok(RawFrame::RealtimeWeight {
            weight_raw: read_weight_24(raw, 3)?,
        }),
        MessageType::RealtimeImpedance => Ok(RawFrame::RealtimeImpedance {
            impedance_raw: read_u16_be(raw, 4)?,
        }),
        MessageType::Unknown(byte) => Err(DecodeError::UnknownMessageType(byte)),
    }
}

/// Decode an advertisement manufacturer-data payload.
///
/// Weight is little-endian at offsets 9..11 in units of 10 g, impedance is
/// big-endian at offsets 4..6 and the unit flag is the byte at offset 15.
pub fn decode_advertisement(raw: &[u8]) -> Result<RawFrame, DecodeError> {
    check_len(raw, ADVERTISEMENT_MIN_LEN)?;

    let frame = RawFrame::Advertisement {
        weight_raw: read_uint_le(raw, 9, 2)? as u16,
        impedance_raw: read_u16_be(raw, 4)?,
        unit_flag: raw[15],
    };
    tracing::trace!(?frame, "decoded advertisement payload");
    Ok(frame)
}

use crate::frame::NOTIFICATION_HEADER;
use crate::profile::{ActivityClass, Sex, UserProfile};

/// Male, 38 years, 171 cm: the profile used for golden-value checks.
pub fn reference_profile() -> UserProfile {
    UserProfile::new(Sex::Male, 38, 171.0, ActivityClass::Medium).unwrap()
}

/// A 17-byte notification frame with the given message type and zeroed fields.
pub fn notification_frame(message_type: u8) -> Vec<u8> {
    let mut raw = vec![0u8; 17];
    raw[..2].copy_from_slice(&NOTIFICATION_HEADER);
    raw[2] = message_type;
    raw
}

/// A stored historic reading (`0x00` message type with the `0x80` flag set).
pub fn historic_frame(timestamp: u32, weight_raw: u32, impedance_raw: u16) -> Vec<u8> {
    let mut raw = notification_frame(0x00);
    raw[3..7].copy_from_slice(&timestamp.to_be_bytes());
    raw[7] = 0x80;
    raw[8..11].copy_from_slice(&weight_raw.to_be_bytes()[1..]);
    raw[15..17].copy_from_slice(&impedance_raw.to_be_bytes());
    raw
}

/// A 16-byte advertisement payload carrying weight (10 g units), impedance and unit flag.
pub fn advertisement_payload(weight_raw: u16, impedance_raw: u16, unit_flag: u8) -> Vec<u8> {
    let mut raw = vec![0u8; 16];
    raw[4..6].copy_from_slice(&impedance_raw.to_be_bytes());
    raw[9..11].copy_from_slice(&weight_raw.to_le_bytes());
    raw[15] = unit_flag;
    raw
}

//! Beacon manufacturer-data frame
//!
//! Pure assembly of the fixed-layout byte sequence broadcast inside the
//! manufacturer-specific AD structure:
//!
//! | offset | size | field |
//! |--------|------|-------------------------------------------|
//! | 0      | 1    | device type tag (0x02 = beacon)           |
//! | 1      | 1    | length of the remainder (0x15 = 21)       |
//! | 2      | 16   | proprietary UUID                          |
//! | 18     | 2    | major, big-endian                         |
//! | 20     | 2    | minor, big-endian                         |
//! | 22     | 1    | measured RSSI at 1 meter (signed dBm)     |
//!
//! Major and minor go out most-significant-byte first regardless of host
//! byte order. The frame is immutable once built.

use defmt::Format;

use crate::config::BeaconConfig;

/// Total length of the beacon frame.
pub const BEACON_INFO_LEN: usize = 23;

/// Length of the section following the two header bytes.
pub const ADV_DATA_LEN: u8 = 0x15;

/// Device type tag identifying a beacon frame.
pub const DEVICE_TYPE_BEACON: u8 = 0x02;

const UUID_LEN: usize = 16;

// The declared lengths must match the encoded field sizes.
const _: () = assert!(ADV_DATA_LEN as usize == UUID_LEN + 2 + 2 + 1);
const _: () = assert!(BEACON_INFO_LEN == 2 + ADV_DATA_LEN as usize);

/// The assembled 23-byte beacon frame.
///
/// Built once at startup and handed to the advertising driver; never
/// mutated afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Format)]
pub struct BeaconInfo {
    bytes: [u8; BEACON_INFO_LEN],
}

impl BeaconInfo {
    /// Assemble the frame from the configuration constants.
    ///
    /// Deterministic and infallible: layout mismatches are compile-time
    /// assertions, not runtime errors.
    pub fn build(config: &BeaconConfig) -> Self {
        let mut bytes = [0u8; BEACON_INFO_LEN];
        bytes[0] = config.device_type;
        bytes[1] = ADV_DATA_LEN;
        bytes[2..18].copy_from_slice(&config.uuid);
        bytes[18..20].copy_from_slice(&config.major.to_be_bytes());
        bytes[20..22].copy_from_slice(&config.minor.to_be_bytes());
        bytes[22] = config.measured_rssi as u8;
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; BEACON_INFO_LEN] {
        &self.bytes
    }
}

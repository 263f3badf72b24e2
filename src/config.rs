//! Beacon configuration surface
//!
//! All identity and radio parameters live in one explicit struct handed to
//! the advertising driver at startup; nothing reads ambient globals. The
//! major/minor pair can optionally come from a persisted word through the
//! [`MajorMinorSource`] trait instead of the compiled-in constants.

use nrf_softdevice::ble::TxPower;

/// Proprietary 128-bit namespace identifier carried in every beacon frame.
pub const BEACON_UUID: [u8; 16] = [
    0x01, 0x12, 0x23, 0x34, 0x45, 0x56, 0x67, 0x78, 0x89, 0x9a, 0xab, 0xbc, 0xcd, 0xde, 0xef, 0xf0,
];

/// Company identifier for Apple Inc. as per www.bluetooth.org.
pub const COMPANY_IDENTIFIER: u16 = 0x004C;

/// Advertising flags: BR/EDR not supported.
pub const ADV_FLAG_BR_EDR_NOT_SUPPORTED: u8 = 0x04;

/// Beacon configuration, owned by the advertising driver for the lifetime
/// of the program. Installed once into the SoftDevice and never revisited.
pub struct BeaconConfig {
    /// GAP device name (never carried in the advertisement itself).
    pub device_name: &'static str,
    /// Radio TX power, one of the SoftDevice's supported dBm steps.
    pub tx_power: TxPower,
    /// Advertising interval in milliseconds.
    pub adv_interval_ms: u32,
    /// One-byte advertising capability flags.
    pub flags: u8,
    /// 16-bit company identifier for the manufacturer-specific AD structure.
    pub company_id: u16,
    /// Device type tag, first byte of the beacon frame.
    pub device_type: u8,
    /// 128-bit namespace UUID.
    pub uuid: [u8; 16],
    /// Operator-assigned group identifier.
    pub major: u16,
    /// Operator-assigned instance identifier.
    pub minor: u16,
    /// Calibration constant: expected RSSI at 1 meter, in dBm.
    pub measured_rssi: i8,
}

impl BeaconConfig {
    /// Reference beacon configuration: 100 ms interval, +4 dBm, −66 dBm
    /// measured RSSI, major 0x0102 / minor 0x0304.
    pub const fn default_beacon() -> Self {
        Self {
            device_name: "nrf-beacon",
            tx_power: TxPower::Plus4dBm,
            adv_interval_ms: 100,
            flags: ADV_FLAG_BR_EDR_NOT_SUPPORTED,
            company_id: COMPANY_IDENTIFIER,
            device_type: crate::payload::DEVICE_TYPE_BEACON,
            uuid: BEACON_UUID,
            major: 0x0102,
            minor: 0x0304,
            measured_rssi: -66,
        }
    }

    /// Replace major/minor with values from an external source.
    pub fn with_major_minor(mut self, source: &impl MajorMinorSource) -> Self {
        let (major, minor) = source.major_minor();
        self.major = major;
        self.minor = minor;
        self
    }
}

/// Provider of the operator-assigned (major, minor) identifier pair.
///
/// Values are host-order integers; the payload builder applies the
/// big-endian transform when encoding, whatever the source.
pub trait MajorMinorSource {
    fn major_minor(&self) -> (u16, u16);
}

/// Compiled-in major/minor constants.
pub struct Fixed {
    pub major: u16,
    pub minor: u16,
}

impl MajorMinorSource for Fixed {
    fn major_minor(&self) -> (u16, u16) {
        (self.major, self.minor)
    }
}

/// One persisted 32-bit word: upper half is major, lower half is minor.
pub struct PackedWord(pub u32);

impl PackedWord {
    /// Read the reserved UICR customer word the provisioning tool writes.
    #[cfg(feature = "uicr-config")]
    pub fn from_uicr() -> Self {
        const UICR_CUSTOMER_WORD: *const u32 = 0x1000_1080 as *const u32;
        Self(unsafe { core::ptr::read_volatile(UICR_CUSTOMER_WORD) })
    }
}

impl MajorMinorSource for PackedWord {
    fn major_minor(&self) -> (u16, u16) {
        ((self.0 >> 16) as u16, self.0 as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_word_split() {
        let word = PackedWord(0xabcd_0102);
        assert_eq!(word.major_minor(), (0xabcd, 0x0102));
    }

    #[test]
    fn test_fixed_source() {
        let fixed = Fixed {
            major: 7,
            minor: 9,
        };
        assert_eq!(fixed.major_minor(), (7, 9));
    }

    #[test]
    fn test_with_major_minor_overrides_constants() {
        let config = BeaconConfig::default_beacon().with_major_minor(&PackedWord(0x1111_2222));
        assert_eq!(config.major, 0x1111);
        assert_eq!(config.minor, 0x2222);
        // Everything else stays untouched.
        assert_eq!(config.company_id, COMPANY_IDENTIFIER);
        assert_eq!(config.uuid, BEACON_UUID);
    }
}

//! On-target tests for the beacon frame builder
//!
//! These tests run on the target hardware using defmt-test

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

use nrf_beacon_firmware::config::BeaconConfig;
use nrf_beacon_firmware::payload::{BeaconInfo, BEACON_INFO_LEN};

#[defmt_test::tests]
mod tests {
    use super::*;
    use defmt::assert_eq;

    #[test]
    fn test_reference_frame_bytes() {
        let info = BeaconInfo::build(&BeaconConfig::default_beacon());

        let expected: [u8; BEACON_INFO_LEN] = [
            0x02, 0x15, 0x01, 0x12, 0x23, 0x34, 0x45, 0x56, 0x67, 0x78, 0x89, 0x9a, 0xab, 0xbc,
            0xcd, 0xde, 0xef, 0xf0, 0x01, 0x02, 0x03, 0x04, 0xbe,
        ];
        assert_eq!(info.as_bytes(), &expected);
    }

    #[test]
    fn test_major_minor_transmitted_msb_first() {
        let mut config = BeaconConfig::default_beacon();
        config.major = 0xabcd;
        config.minor = 0x1234;

        let info = BeaconInfo::build(&config);
        let bytes = info.as_bytes();

        assert_eq!(bytes[18], 0xab);
        assert_eq!(bytes[19], 0xcd);
        assert_eq!(bytes[20], 0x12);
        assert_eq!(bytes[21], 0x34);
    }

    #[test]
    fn test_builder_is_pure() {
        let config = BeaconConfig::default_beacon();
        let first = BeaconInfo::build(&config);
        let second = BeaconInfo::build(&config);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}

//! Beacon advertising driver
//!
//! Sequences GAP identity and advertising configuration in the order the
//! SoftDevice expects: identity first, then the individual advertising
//! fields are staged, then a single `update` commits them into the legacy
//! advertising payload, and only a committed driver may start
//! transmission. Skipped or misordered steps surface as [`AdvError`]
//! before the radio ever starts.

use defmt::{debug, error, info, Format};
use embassy_time::{Duration, Timer};
use heapless::Vec;
use nrf_softdevice::{
    ble::{
        peripheral::{self, Config as PeripheralConfig, FilterPolicy, NonconnectableAdvertisement},
        Phy,
    },
    raw, RawError, Softdevice,
};

use crate::{
    config::BeaconConfig,
    payload::{BeaconInfo, BEACON_INFO_LEN},
};

/// Maximum legacy advertising data length (BLE specification).
pub const MAX_ADV_DATA_LEN: usize = 31;

/// AD structure type: advertising flags.
const AD_TYPE_FLAGS: u8 = 0x01;

/// AD structure type: manufacturer-specific data.
const AD_TYPE_MANUFACTURER_DATA: u8 = 0xff;

/// Advertising driver error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum AdvError {
    /// Assembled advertising data would exceed the legacy PDU limit.
    DataOverflow,
    /// `update` was called before the manufacturer data was staged.
    NotStaged,
    /// `start` was requested before `update` committed the staged fields.
    NotCommitted,
    /// The SoftDevice rejected a GAP call.
    Raw(RawError),
}

impl From<RawError> for AdvError {
    fn from(err: RawError) -> Self {
        Self::Raw(err)
    }
}

/// One-shot advertising configuration driver.
///
/// Constructed once at startup, fed the staged fields, committed, then
/// moved into the advertising task.
pub struct BeaconAdvertiser {
    /// Radio parameters handed to the SoftDevice on every advertise call.
    peripheral_config: PeripheralConfig,
    /// GAP device name; never carried in the advertisement itself.
    device_name: &'static str,
    flags: u8,
    company_id: u16,
    manuf_data: Option<BeaconInfo>,
    /// Committed advertising payload, valid once `committed` is set.
    adv_data: Vec<u8, MAX_ADV_DATA_LEN>,
    committed: bool,
}

impl BeaconAdvertiser {
    /// Stage the radio parameters from the configuration.
    pub fn new(config: &BeaconConfig) -> Self {
        let peripheral_config = PeripheralConfig {
            primary_phy: Phy::M1,
            secondary_phy: Phy::M1,
            tx_power: config.tx_power,
            timeout: None,
            max_events: None,
            interval: adv_interval_units(config.adv_interval_ms),
            filter_policy: FilterPolicy::Any,
        };

        Self {
            peripheral_config,
            device_name: config.device_name,
            flags: 0,
            company_id: 0,
            manuf_data: None,
            adv_data: Vec::new(),
            committed: false,
        }
    }

    /// Install the GAP device name into the SoftDevice.
    ///
    /// TX power and interval were staged at construction; the name is the
    /// only identity field that needs a GAP call of its own. The beacon
    /// never includes a name AD structure, so this is visible to scanners
    /// only through GAP.
    pub fn configure_identity(&self, _sd: &Softdevice) -> Result<(), AdvError> {
        let sec_mode = raw::ble_gap_conn_sec_mode_t {
            _bitfield_1: raw::ble_gap_conn_sec_mode_t::new_bitfield_1(1, 1),
        };
        let name = self.device_name.as_bytes();
        let ret =
            unsafe { raw::sd_ble_gap_device_name_set(&sec_mode, name.as_ptr(), name.len() as u16) };
        RawError::convert(ret)?;
        debug!("GAP device name set: {}", self.device_name);
        Ok(())
    }

    /// Stage the company identifier for the manufacturer-specific field.
    pub fn set_company_identifier(&mut self, company_id: u16) {
        self.company_id = company_id;
        self.committed = false;
    }

    /// Stage the manufacturer-specific beacon frame.
    pub fn set_manuf_specific_data(&mut self, info: BeaconInfo) {
        self.manuf_data = Some(info);
        self.committed = false;
    }

    /// Stage the advertising flags byte.
    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
        self.committed = false;
    }

    /// Commit the staged fields into the advertising payload.
    ///
    /// One atomic assembly after all fields are staged; until this
    /// succeeds the driver refuses to start.
    pub fn update(&mut self) -> Result<(), AdvError> {
        let info = self.manuf_data.as_ref().ok_or(AdvError::NotStaged)?;
        self.adv_data = encode_adv_data(self.flags, self.company_id, info.as_bytes())?;
        self.committed = true;
        debug!("advertising data committed, {} bytes", self.adv_data.len());
        Ok(())
    }

    fn ensure_committed(&self) -> Result<(), AdvError> {
        if self.committed {
            Ok(())
        } else {
            Err(AdvError::NotCommitted)
        }
    }

    /// Start transmission and keep the beacon on the air.
    ///
    /// Returns early only if `update` has not committed the staged
    /// configuration; once started it never comes back.
    pub async fn run(&self, sd: &Softdevice) -> Result<(), AdvError> {
        self.ensure_committed()?;
        info!(
            "starting beacon advertising, {} byte payload",
            self.adv_data.len()
        );

        loop {
            let adv = NonconnectableAdvertisement::NonscannableUndirected {
                adv_data: &self.adv_data,
            };

            match peripheral::advertise(sd, adv, &self.peripheral_config).await {
                Ok(()) => debug!("advertising run ended, restarting"),
                Err(e) => {
                    error!("advertising failed: {:?}", defmt::Debug2Format(&e));
                    Timer::after(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Assemble the legacy advertising payload: a flags AD structure followed
/// by the manufacturer-specific AD structure. The company identifier is
/// little-endian on the air; the beacon frame goes out as built.
pub fn encode_adv_data(
    flags: u8,
    company_id: u16,
    info: &[u8; BEACON_INFO_LEN],
) -> Result<Vec<u8, MAX_ADV_DATA_LEN>, AdvError> {
    let mut data = Vec::new();

    push(&mut data, &[2, AD_TYPE_FLAGS, flags])?;

    // AD length covers the type byte, the company identifier and the frame.
    let manuf_len = (1 + 2 + info.len()) as u8;
    push(&mut data, &[manuf_len, AD_TYPE_MANUFACTURER_DATA])?;
    push(&mut data, &company_id.to_le_bytes())?;
    push(&mut data, info)?;

    Ok(data)
}

fn push<const N: usize>(buf: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), AdvError> {
    buf.extend_from_slice(bytes).map_err(|_| AdvError::DataOverflow)
}

/// Convert a millisecond interval to the SoftDevice's 0.625 ms units.
const fn adv_interval_units(ms: u32) -> u32 {
    ms * 8 / 5
}

/// Advertising task: owns the committed driver for the device's lifetime.
#[embassy_executor::task]
pub async fn beacon_task(sd: &'static Softdevice, advertiser: BeaconAdvertiser) {
    if let Err(e) = advertiser.run(sd).await {
        defmt::panic!("beacon task refused to start: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeaconConfig;

    #[test]
    fn test_encode_adv_data_layout() {
        let config = BeaconConfig::default_beacon();
        let info = BeaconInfo::build(&config);

        let data = encode_adv_data(config.flags, config.company_id, info.as_bytes()).unwrap();

        // Flags AD structure, then 26-byte manufacturer AD structure.
        assert_eq!(data.len(), 30);
        assert_eq!(&data[..3], &[0x02, 0x01, 0x04]);
        assert_eq!(&data[3..5], &[0x1a, 0xff]);
        // Company identifier 0x004c, little-endian on the air.
        assert_eq!(&data[5..7], &[0x4c, 0x00]);
        assert_eq!(&data[7..], info.as_bytes());
    }

    #[test]
    fn test_update_requires_staged_frame() {
        let config = BeaconConfig::default_beacon();
        let mut advertiser = BeaconAdvertiser::new(&config);
        advertiser.set_company_identifier(config.company_id);
        advertiser.set_flags(config.flags);

        assert_eq!(advertiser.update(), Err(AdvError::NotStaged));
        assert_eq!(advertiser.ensure_committed(), Err(AdvError::NotCommitted));
    }

    #[test]
    fn test_start_gated_on_commit() {
        let config = BeaconConfig::default_beacon();
        let mut advertiser = BeaconAdvertiser::new(&config);
        advertiser.set_company_identifier(config.company_id);
        advertiser.set_manuf_specific_data(BeaconInfo::build(&config));
        advertiser.set_flags(config.flags);

        assert_eq!(advertiser.ensure_committed(), Err(AdvError::NotCommitted));
        advertiser.update().unwrap();
        assert_eq!(advertiser.ensure_committed(), Ok(()));

        // Restaging any field invalidates the commit.
        advertiser.set_flags(0x06);
        assert_eq!(advertiser.ensure_committed(), Err(AdvError::NotCommitted));
    }

    #[test]
    fn test_interval_conversion() {
        assert_eq!(adv_interval_units(100), 160);
        assert_eq!(adv_interval_units(1000), 1600);
    }
}

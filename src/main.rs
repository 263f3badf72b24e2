#![no_std]
#![no_main]

use defmt::*;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::{config::Config, interrupt};
use embassy_time::Duration;
use nrf_softdevice::{Config as SdConfig, Softdevice};
use panic_probe as _;

use nrf_beacon_firmware::ble::advertising::{beacon_task, BeaconAdvertiser};
use nrf_beacon_firmware::blink::{blink_task, BlinkHandle};
use nrf_beacon_firmware::config::BeaconConfig;
#[cfg(feature = "uicr-config")]
use nrf_beacon_firmware::config::PackedWord;
use nrf_beacon_firmware::payload::BeaconInfo;
use nrf_beacon_firmware::timeout::TimeoutTimer;

/// Background blink sleep period.
const BLINK_PERIOD: Duration = Duration::from_millis(100);

/// Root-loop heartbeat period.
const HEARTBEAT_PERIOD: Duration = Duration::from_millis(500);

static BLINK_HANDLE: BlinkHandle = BlinkHandle::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting beacon firmware");

    // Configure nRF peripherals
    let mut nrf_config = Config::default();
    // Configure interrupt priorities to avoid SoftDevice reserved levels (0, 1, 4)
    nrf_config.gpiote_interrupt_priority = interrupt::Priority::P2;
    nrf_config.time_interrupt_priority = interrupt::Priority::P2;

    let p = embassy_nrf::init(nrf_config);

    info!("Embassy initialized, configuring SoftDevice...");

    // A broadcaster needs one advertising set and nothing else.
    let sd_config = SdConfig {
        clock: Some(nrf_softdevice::raw::nrf_clock_lf_cfg_t {
            source: nrf_softdevice::raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: nrf_softdevice::raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        gap_role_count: Some(nrf_softdevice::raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: Default::default(),
        }),
        ..Default::default()
    };

    // Fatal if the stack cannot come up; nothing below runs without it.
    let sd = Softdevice::enable(&sd_config);
    info!("SoftDevice enabled");

    let beacon_config = BeaconConfig::default_beacon();
    #[cfg(feature = "uicr-config")]
    let beacon_config = beacon_config.with_major_minor(&PackedWord::from_uicr());

    let beacon_info = BeaconInfo::build(&beacon_config);

    // GAP identity, then the staged advertising fields, then one commit.
    // All of this must succeed before any task is spawned.
    let mut advertiser = BeaconAdvertiser::new(&beacon_config);
    unwrap!(advertiser.configure_identity(sd));
    advertiser.set_company_identifier(beacon_config.company_id);
    advertiser.set_manuf_specific_data(beacon_info);
    advertiser.set_flags(beacon_config.flags);
    unwrap!(advertiser.update());

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(beacon_task(sd, advertiser)));
    unwrap!(spawner.spawn(blink_task(
        p.P0_14.into(),
        BLINK_PERIOD,
        &BLINK_HANDLE
    )));

    info!("System initialized, entering root loop");

    // Root loop: poll the heartbeat timer and toggle the second LED.
    // Runs for the device's operational lifetime; the explicit yield is
    // the only scheduling point.
    let mut led = Output::new(p.P0_15, Level::Low, OutputDrive::Standard);
    let mut heartbeat = TimeoutTimer::new();

    loop {
        if heartbeat.is_expired(HEARTBEAT_PERIOD) {
            heartbeat.reset();
            led.toggle();
        }
        yield_now().await;
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

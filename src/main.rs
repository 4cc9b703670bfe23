#![no_std]
#![no_main]

extern crate alloc;

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"), // version
    env!("CARGO_PKG_NAME"),    // project_name
    "00:00:00",                // build_time
    "2025-01-01",              // build_date
    "0.0.0",                   // idf_ver (not using IDF)
    0x10000,                   // mmu_page_size (64KB)
    0,                         // min_efuse_blk_rev_full (accept all)
    u16::MAX                   // max_efuse_blk_rev_full (accept all)
);

use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use static_cell::StaticCell;

use heartbeat_firmware::config::reporting::DEFAULT_INTERVAL_SECS;
use heartbeat_firmware::tasks::{ble_task, INTERVAL_SIGNAL, READING_CHANNEL};

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

/// Static cell for esp-radio controller (needed for 'static lifetime)
static RADIO_CONTROLLER: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialise heap allocator for BLE support (64KB - BLE requires significant heap)
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Read unique device ID from eFuse MAC address (last 3 bytes)
    let mac = esp_hal::efuse::Efuse::read_base_mac_address();
    let device_id: [u8; 3] = [mac[3], mac[4], mac[5]];

    // Initialise esp-radio for BLE support (must be after esp_rtos::start)
    let radio_controller =
        RADIO_CONTROLLER.init(esp_radio::init().expect("Failed to initialize esp-radio"));

    // Create BLE connector (ownership is passed to ExternalController)
    let ble_connector = esp_radio::ble::controller::BleConnector::new(
        radio_controller,
        peripherals.BT,
        esp_radio::ble::Config::default(),
    )
    .expect("Failed to initialize BLE connector");

    // Wrap in ExternalController for trouble-host compatibility
    let controller: trouble_host::prelude::ExternalController<_, 10> =
        trouble_host::prelude::ExternalController::new(ble_connector);

    // Create and run the embassy executor
    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(async_main(spawner, controller, device_id));
    })
}

/// Type alias for the BLE controller
type BleController = trouble_host::prelude::ExternalController<
    esp_radio::ble::controller::BleConnector<'static>,
    10,
>;

#[embassy_executor::task]
async fn async_main(spawner: Spawner, ble_controller: BleController, device_id: [u8; 3]) {
    spawner.spawn(ble_host_task(ble_controller, device_id)).unwrap();
    spawner.spawn(sampler_task()).unwrap();
}

/// Task that manages BLE connectivity
///
/// Advertises the heartbeat service, forwards interval writes and delivers
/// readings as notifications.
#[embassy_executor::task]
async fn ble_host_task(controller: BleController, device_id: [u8; 3]) {
    ble_task(controller, device_id).await;
}

/// Task that samples the heartbeat value at the configured cadence
///
/// The cadence follows the interval characteristic: the BLE task publishes
/// remotely written values through INTERVAL_SIGNAL and this task reschedules
/// itself accordingly.
#[embassy_executor::task]
async fn sampler_task() {
    let mut interval_secs = DEFAULT_INTERVAL_SECS;
    let mut reading: u32 = 0;

    loop {
        let tick = Timer::after(Duration::from_secs(interval_secs as u64));
        match select(tick, INTERVAL_SIGNAL.wait()).await {
            Either::First(()) => {
                // Sensor acquisition hooks in here; a synthetic ramp keeps
                // the reporting path exercised until then.
                reading = reading.wrapping_add(1);
                // Dropped if no connection is draining the queue
                let _ = READING_CHANNEL.try_send(reading);
            }
            Either::Second(seconds) => {
                // A zero interval would spin; clamp at one second
                interval_secs = seconds.max(1);
                log::info!("Sampler: reporting every {}s", interval_secs);
            }
        }
    }
}

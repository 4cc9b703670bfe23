//! BLE task for the heartbeat peripheral
//!
//! Implements the BLE host task that advertises the heartbeat service and
//! drives the core service state machine from connection events: link
//! tracking, interval-write dispatch and reading delivery all flow through
//! [`HeartbeatService`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::{info, warn};
use trouble_host::prelude::*;

use crate::ble::service::HeartbeatGattService;
use crate::config::advertising::DEVICE_NAME_PREFIX;
use crate::config::uuid;
use crate::gatt::bound::BoundRegistry;
use crate::gatt::{AttributeHandle, ConnectionToken};
use crate::heartbeat::{HeartbeatInit, HeartbeatService, ServiceEvent};

/// Newest reporting interval written by the central, in seconds.
///
/// The BLE task only publishes the value; interpreting it (rescheduling the
/// sampler) is the application's job.
pub static INTERVAL_SIGNAL: Signal<CriticalSectionRawMutex, u16> = Signal::new();

/// Readings queued by the sampler for delivery as notifications.
///
/// Bounded; the sampler drops readings when no connection is draining them.
pub static READING_CHANNEL: Channel<CriticalSectionRawMutex, u32, 4> = Channel::new();

/// Format device ID bytes as uppercase hex into a buffer
/// Returns the formatted string slice
fn format_device_name<'a>(buf: &'a mut [u8; 20], device_id: &[u8; 3]) -> &'a str {
    const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";
    let prefix = DEVICE_NAME_PREFIX.as_bytes();

    buf[..prefix.len()].copy_from_slice(prefix);

    let mut pos = prefix.len();
    for &byte in device_id {
        buf[pos] = HEX_CHARS[(byte >> 4) as usize];
        buf[pos + 1] = HEX_CHARS[(byte & 0x0F) as usize];
        pos += 2;
    }

    // All bytes are ASCII, so this will always succeed
    core::str::from_utf8(&buf[..pos]).unwrap_or(DEVICE_NAME_PREFIX)
}

/// Number of maximum concurrent connections
const CONNECTIONS_MAX: usize = 1;
/// Number of L2CAP channels
const L2CAP_CHANNELS_MAX: usize = 3;

/// BLE GATT Server with the heartbeat service
#[gatt_server(mutex_type = CriticalSectionRawMutex)]
struct Server {
    heartbeat: HeartbeatGattService,
}

/// Main BLE task that manages the Bluetooth stack and the one connection
///
/// This task:
/// 1. Initialises the BLE controller
/// 2. Starts advertising as "HeartBeat-XXXXXX" (unique per device)
/// 3. Feeds connection and write events into the core service
/// 4. Delivers queued readings through the core push path
pub async fn ble_task<C: Controller>(controller: C, device_id: [u8; 3]) {
    let mut device_name_buf = [0u8; 20];
    let device_name = format_device_name(&mut device_name_buf, &device_id);

    info!("BLE: starting as '{}'", device_name);

    let mut resources: HostResources<DefaultPacketPool, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX> =
        HostResources::new();

    // Build the BLE stack with address derived from device ID
    let stack = trouble_host::new(controller, &mut resources).set_random_address(
        Address::random([device_id[0], device_id[1], device_id[2], 0x9C, 0x35, 0xC2]),
    );

    let Host {
        mut peripheral,
        mut runner,
        ..
    } = stack.build();

    let gap = GapConfig::Peripheral(PeripheralConfig {
        name: device_name,
        appearance: &appearance::UNKNOWN,
    });
    let server: Server = match Server::new_with_config(gap) {
        Ok(s) => s,
        Err(_) => return,
    };

    // Run both the BLE runner and peripheral logic concurrently using select
    let runner_task = runner.run();

    let peripheral_task = async {
        let mut adv_data = [0u8; 31];
        let len = match AdStructure::encode_slice(
            &[
                AdStructure::Flags(LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED),
                AdStructure::CompleteLocalName(device_name.as_bytes()),
            ],
            &mut adv_data,
        ) {
            Ok(l) => l,
            Err(_) => return,
        };

        // Bind the core service to the handles the gatt_server macro
        // assigned; from here on the state machine is the single owner of
        // link tracking and write dispatch.
        let mut registry = BoundRegistry::new([
            (
                uuid::VALUE_CHAR,
                AttributeHandle::new(server.heartbeat.value.handle),
            ),
            (
                uuid::CONFIG_CHAR,
                AttributeHandle::new(server.heartbeat.interval_secs.handle),
            ),
        ]);
        let mut service = match HeartbeatService::register(
            &mut registry,
            &HeartbeatInit::default(),
            |seconds: u16| {
                info!("BLE: interval set to {}s", seconds);
                INTERVAL_SIGNAL.signal(seconds);
            },
        ) {
            Ok(s) => s,
            Err(_) => return,
        };

        let reading_receiver = READING_CHANNEL.receiver();
        // Stands in for the ACL connection handle, which the host stack
        // does not expose at this layer
        let mut conn_seq: u16 = 0;

        loop {
            info!("BLE: advertising...");
            let advertiser = match peripheral
                .advertise(
                    &Default::default(),
                    Advertisement::ConnectableScannableUndirected {
                        adv_data: &adv_data[..len],
                        scan_data: &[],
                    },
                )
                .await
            {
                Ok(a) => a,
                Err(_) => continue,
            };

            // Wait for connection
            let acceptor = match advertiser.accept().await {
                Ok(a) => {
                    info!("BLE: connected");
                    a
                }
                Err(_) => continue,
            };

            // Attach to attribute server (using Deref to get &AttributeServer)
            let conn = match acceptor.with_attribute_server(&*server) {
                Ok(c) => c,
                Err(_) => continue,
            };

            let token = ConnectionToken::new(conn_seq);
            conn_seq = conn_seq.wrapping_add(1);
            service.handle_event(ServiceEvent::Connected { token });

            loop {
                // Handle GATT events and queued readings concurrently
                let gatt_future = conn.next();
                let reading_future = reading_receiver.receive();

                match embassy_futures::select::select(gatt_future, reading_future).await {
                    embassy_futures::select::Either::First(gatt_event) => match gatt_event {
                        GattConnectionEvent::Disconnected { reason: _ } => {
                            info!("BLE: disconnected");
                            service.handle_event(ServiceEvent::Disconnected);
                            break;
                        }
                        GattConnectionEvent::Gatt { event } => match event {
                            GattEvent::Write(write_event) => {
                                // The core decides whether the write is the
                                // interval characteristic and validates it
                                service.handle_event(ServiceEvent::Write {
                                    handle: AttributeHandle::new(write_event.handle()),
                                    data: write_event.data(),
                                });
                                // Accept the write
                                let _ = write_event.accept();
                            }
                            GattEvent::Read(read_event) => {
                                let _ = read_event.accept();
                            }
                            GattEvent::Other(other_event) => {
                                let _ = other_event.accept();
                            }
                        },
                        _ => {}
                    },
                    embassy_futures::select::Either::Second(reading) => {
                        match service.push_reading(&mut registry, reading) {
                            Ok(()) => {
                                if let Some((_, data)) = registry.take_queued() {
                                    if let Ok(bytes) = <[u8; 4]>::try_from(&data[..]) {
                                        // Updates the stored value and
                                        // notifies if the central subscribed
                                        let value = u32::from_le_bytes(bytes);
                                        let _ =
                                            server.heartbeat.value.notify(&conn, &value).await;
                                    }
                                }
                            }
                            Err(e) => warn!("BLE: reading dropped: {:?}", e),
                        }
                    }
                }
            }
        }
    };

    embassy_futures::select::select(runner_task, peripheral_task).await;
}

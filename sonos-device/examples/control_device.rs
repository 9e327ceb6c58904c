//! # Control a single Sonos device
//!
//! Initializes one speaker from its description URL, prints what it reports,
//! reads and sets the volume, and keeps the device alive for a minute while
//! printing lifecycle events.
//!
//! ## Usage
//!
//! ```bash
//! SONOS_DEVICE_LOG_MODE=development \
//!     cargo run --example control_device -- http://192.168.1.100:1400/xml/device_description.xml [volume]
//! ```

use std::time::Duration;

use sonos_device::logging;
use sonos_device::{Device, DeviceEvent, DeviceSeed};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    let mut args = std::env::args().skip(1);
    let location = args
        .next()
        .ok_or("usage: control_device <description-url> [volume]")?;
    let volume: Option<u8> = args.next().map(|v| v.parse()).transpose()?;

    let device = Device::builder(DeviceSeed::from_location(&location)?).build()?;
    let mut events = device.subscribe();

    device.init()?;
    match events.recv().await? {
        DeviceEvent::Ready => {}
        DeviceEvent::Error(e) => return Err(e.into()),
        other => return Err(format!("unexpected event {:?}", other).into()),
    }

    println!("Device at {}", device.address());
    for key in ["roomName", "modelName", "softwareVersion", "UDN"] {
        if let Some(value) = device.attribute(key) {
            println!("  {:<16} {}", key, value);
        }
    }
    for sub in device.sub_devices() {
        println!("  sub-device {} ({} services)", sub.device_type(), sub.service_ids().len());
    }

    let current = device.get_volume().await?;
    println!("Volume: {}", current.get("CurrentVolume").unwrap_or("?"));

    if let Some(volume) = volume {
        device.set_volume(volume).await?;
        println!("Volume set to {}", volume);
    }

    let transport = device.get_transport_info().await?;
    println!(
        "Transport: {}",
        transport.get("CurrentTransportState").unwrap_or("?")
    );

    // Short window so the expiry is observable
    device.refresh_for(Duration::from_secs(20))?;
    let deadline = tokio::time::sleep(Duration::from_secs(60));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event? {
                DeviceEvent::Expired => {
                    println!("Device expired, refreshing");
                    device.refresh_for(Duration::from_secs(20))?;
                }
                event => println!("Event: {}", event.kind().as_str()),
            },
        }
    }

    Ok(())
}

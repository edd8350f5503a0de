pub use self::cec::{lock_driver, CECDriver, CECHandle, RxCallback, TxCallback};
pub use self::emulated::{EmulatedCECDriver, EmulatedCECDriverBuilder, FrameInjector};
pub use self::enums::*;
pub use self::frame::{CECFrame, CEC_MAX_FRAME_SIZE};
pub use self::session::{Session, SharedDriver};
pub use self::skeleton::CECSkeleton;
pub use self::subscription::{Subscription, WaitError};

mod cec;
mod emulated;
mod enums;
mod frame;
mod session;
mod skeleton;
mod subscription;

#[cfg(test)]
pub use self::cec::MockCECDriver;

/// Builds the driver selected by the configuration
pub fn get_cec_driver(configuration: &crate::configuration::SuiteConfiguration) -> SharedDriver {
    let device = &configuration.device;
    let driver = &configuration.driver;
    match driver.kind {
        crate::configuration::DriverKind::Skeleton => {
            log::info!("Using the skeleton CEC driver");
            std::sync::Arc::new(std::sync::Mutex::new(CECSkeleton::default()))
        }
        crate::configuration::DriverKind::Emulated => {
            log::info!(
                "Using the emulated CEC driver for {} ({:?})",
                device.name,
                device.role
            );
            let builder = driver.injected_frames.iter().fold(
                EmulatedCECDriver::builder()
                    .with_role(device.role, device.cec.device_type)
                    .with_sink_connected(device.sink_connected)
                    .with_physical_address(driver.physical_address)
                    .with_remote_devices(driver.remote_devices.clone())
                    .with_extended_statuses(device.cec.extended_enum_supported),
                |builder, injected| {
                    builder.with_injected_frame(
                        std::time::Duration::from_millis(injected.delay_ms),
                        injected.frame.clone(),
                    )
                },
            );
            std::sync::Arc::new(std::sync::Mutex::new(builder.build()))
        }
    }
}

use crate::cec::{CECError, DeviceRole, SharedDriver};
use crate::configuration::{DeviceProfile, SuiteConfiguration};

mod checks;
mod l1;
mod l2;
mod l3;

/// Everything a conformance scenario gets to run against
pub struct ConformanceContext {
    pub driver: SharedDriver,
    pub profile: DeviceProfile,
    pub receive_timeout: std::time::Duration,
}

impl ConformanceContext {
    pub fn new(driver: SharedDriver, configuration: &SuiteConfiguration) -> Self {
        ConformanceContext {
            driver,
            profile: configuration.device.clone(),
            receive_timeout: configuration.suite.receive_timeout(),
        }
    }

    /// Status a driver of this profile returns for a handle it never gave
    pub fn invalid_handle_error(&self) -> CECError {
        if self.profile.cec.extended_enum_supported {
            CECError::InvalidHandle
        } else {
            CECError::InvalidArgument
        }
    }

    /// Whether the device under test is a display
    pub fn is_sink(&self) -> bool {
        self.profile.role == DeviceRole::Sink
    }
}

/// Builds the suites applicable to the device profile
///
/// A source device without a sink can not get a logical address, so it only runs the check
/// that its driver refuses to open.
pub fn get_suites(configuration: &SuiteConfiguration) -> Vec<harness::Suite<ConformanceContext>> {
    let device = &configuration.device;
    let timeout = configuration.suite.scenario_timeout();
    let mut suites = Vec::new();

    if device.role == DeviceRole::Source && !device.sink_connected {
        let mut suite = harness::Suite::<ConformanceContext>::new("L2");
        suite
            .set_timeout(timeout)
            .add_scenarios(l2::get_disconnected_scenarios());
        suites.push(suite);
        return suites;
    }

    let mut l1 = harness::Suite::<ConformanceContext>::new("L1");
    l1.set_timeout(timeout).add_scenarios(l1::get_scenarios());
    suites.push(l1);

    let mut l2 = harness::Suite::<ConformanceContext>::new("L2");
    l2.set_timeout(timeout)
        .add_scenarios(l2::get_scenarios(device.role));
    suites.push(l2);

    if device.role == DeviceRole::Sink {
        let mut l3 = harness::Suite::<ConformanceContext>::new("L3");
        l3.set_timeout(timeout).add_scenarios(l3::get_scenarios());
        suites.push(l3);
    }

    suites
}

use std::convert::TryFrom;

use harness::{from_fn, Scenario, ScenarioError};

use super::checks::{self, expect_eq, expect_ok, expect_that};
use super::ConformanceContext;
use crate::cec::{
    CECError, CECFrame, CECLogicalAddress, CECOpcode, CECVersion, DeviceRole, Session, TxResult,
    WaitError,
};

pub fn get_scenarios(role: DeviceRole) -> Vec<Box<dyn Scenario<ConformanceContext>>> {
    let mut scenarios: Vec<Box<dyn Scenario<ConformanceContext>>> = vec![
        from_fn("default_logical_address", default_logical_address),
        from_fn("add_remove_round_trip", add_remove_round_trip),
        from_fn("broadcast_transmission", broadcast_transmission),
        from_fn("unacknowledged_transmission", unacknowledged_transmission),
        from_fn("physical_address_bounds", physical_address_bounds),
        Box::new(AsyncTransmitCompletion {}),
    ];
    if role == DeviceRole::Source {
        scenarios.push(Box::new(CECVersionExchange {}));
    }
    scenarios
}

/// Scenarios of a source device with nothing plugged to it
pub fn get_disconnected_scenarios() -> Vec<Box<dyn Scenario<ConformanceContext>>> {
    vec![from_fn("open_without_sink", open_without_sink)]
}

fn default_logical_address(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let address = expect_ok("get logical address", session.get_logical_address())?;
    if context.is_sink() {
        expect_eq(
            "default logical address of a sink",
            CECLogicalAddress::UNREGISTERED,
            address,
        )?;
    } else {
        expect_that(
            &format!("source allocated logical address {:X}", address),
            address < CECLogicalAddress::UNREGISTERED,
        )?;
    }
    checks::close(session)
}

fn add_remove_round_trip(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    checks::remove_all_addresses(&session)?;
    for address in 0..=CECLogicalAddress::UNREGISTERED {
        expect_ok(
            &format!("add logical address {:X}", address),
            session.add_logical_address(address),
        )?;
        expect_eq(
            &format!("logical address after adding {:X}", address),
            Ok(address),
            session.get_logical_address(),
        )?;
        expect_ok(
            &format!("remove logical address {:X}", address),
            session.remove_logical_address(address),
        )?;
        expect_eq(
            &format!("logical address after removing {:X}", address),
            Ok(CECLogicalAddress::UNREGISTERED),
            session.get_logical_address(),
        )?;
    }
    checks::close(session)
}

fn broadcast_transmission(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    checks::remove_all_addresses(&session)?;
    expect_eq(
        "unregistered report physical address",
        Ok(TxResult::SentAndAcked),
        session.tx(&[0x0F, 0x84, 0x00, 0x00]),
    )?;
    checks::close(session)
}

fn unacknowledged_transmission(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_eq(
        "get CEC version of a missing tuner",
        Ok(TxResult::SentButNotAcked),
        session.tx(&[0x47, 0x9F]),
    )?;
    checks::close(session)
}

fn physical_address_bounds(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let address = expect_ok("get physical address", session.get_physical_address())?;
    log::info!("Physical address of {}: {:04X}", context.profile.name, address);
    expect_that(
        &format!("physical address {:04X} below FFFF", address),
        address < 0xFFFF,
    )?;
    checks::close(session)
}

fn open_without_sink(context: &ConformanceContext) -> Result<(), ScenarioError> {
    match Session::open(&context.driver) {
        Err(CECError::LogicalAddressUnavailable) => Ok(()),
        Err(e) => Err(ScenarioError::Recoverable(format!(
            "open without sink: expected {}, got {}",
            CECError::LogicalAddressUnavailable,
            e
        ))),
        Ok(session) => {
            checks::close(session)?;
            Err(ScenarioError::Recoverable(String::from(
                "open without sink: expected an error, got success",
            )))
        }
    }
}

fn wait_error(what: &str, error: WaitError, context: &ConformanceContext) -> ScenarioError {
    match error {
        WaitError::Timeout => ScenarioError::Recoverable(format!(
            "{}: nothing received within {:?}",
            what, context.receive_timeout
        )),
        WaitError::Disconnected => {
            ScenarioError::Recoverable(format!("{}: the driver dropped the callback", what))
        }
    }
}

/// A frame queued with tx_async gets its result through the transmit callback
pub struct AsyncTransmitCompletion {}

#[async_trait::async_trait]
impl Scenario<ConformanceContext> for AsyncTransmitCompletion {
    fn get_name(&self) -> &str {
        "async_transmit_completion"
    }

    async fn run(&self, context: &ConformanceContext) -> Result<(), ScenarioError> {
        let session = checks::open(context)?;
        let mut results = expect_ok("register transmit callback", session.subscribe_tx())?;
        let frame = checks::report_physical_address(context, &session)?;
        expect_ok(&format!("queue {}", frame), session.tx_async(frame.as_bytes()))?;

        let result = results
            .recv_timeout(context.receive_timeout)
            .await
            .map_err(|e| wait_error("transmit result", e, context))?;
        expect_eq("transmit result", TxResult::SentAndAcked, result)?;

        expect_ok("clear callbacks", session.unsubscribe())?;
        checks::close(session)
    }
}

/// The TV answers a Get CEC Version from the device under test
pub struct CECVersionExchange {}

#[async_trait::async_trait]
impl Scenario<ConformanceContext> for CECVersionExchange {
    fn get_name(&self) -> &str {
        "cec_version_exchange"
    }

    async fn run(&self, context: &ConformanceContext) -> Result<(), ScenarioError> {
        let session = checks::open(context)?;
        let mut frames = expect_ok("register receive callback", session.subscribe_rx())?;
        let address = expect_ok("get logical address", session.get_logical_address())?;
        let request = expect_ok(
            "build get CEC version",
            CECFrame::new(
                address,
                CECLogicalAddress::TV.raw(),
                CECOpcode::GetCECVersion,
                &[],
            ),
        )?;
        expect_eq(
            &format!("send {}", request),
            Ok(TxResult::SentAndAcked),
            session.tx(request.as_bytes()),
        )?;

        let reply = frames
            .wait_for(context.receive_timeout, |frame| {
                frame.has_opcode(CECOpcode::CECVersion)
                    && frame.initiator() == CECLogicalAddress::TV.raw()
                    && frame.destination() == address
            })
            .await
            .map_err(|e| wait_error("CEC version of the TV", e, context))?;
        log::info!("TV replied {}", reply);
        match reply.operands() {
            [version] => {
                let version = CECVersion::try_from(*version).map_err(|v| {
                    ScenarioError::Recoverable(format!("unknown CEC version {:02X}", v))
                })?;
                log::info!("TV supports CEC {:?}", version);
            }
            operands => {
                return Err(ScenarioError::Recoverable(format!(
                    "CEC version: expected one operand, got {:02X?}",
                    operands
                )))
            }
        }

        expect_ok("clear callbacks", session.unsubscribe())?;
        checks::close(session)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use test_log::test;

    use super::*;
    use crate::cec::{CECDeviceType, CECHandle, EmulatedCECDriver, MockCECDriver, SharedDriver};
    use crate::configuration::SuiteConfiguration;

    fn context(driver: SharedDriver, role: DeviceRole) -> ConformanceContext {
        let mut configuration = SuiteConfiguration::default();
        configuration.device.role = role;
        configuration.suite.receive_timeout_secs = 1;
        ConformanceContext::new(driver, &configuration)
    }

    fn source(sink_connected: bool) -> ConformanceContext {
        let driver = EmulatedCECDriver::builder()
            .with_role(DeviceRole::Source, CECDeviceType::PlaybackDevice)
            .with_sink_connected(sink_connected)
            .build();
        context(Arc::new(Mutex::new(driver)), DeviceRole::Source)
    }

    #[test]
    fn it_passes_on_an_emulated_sink() {
        let sink = context(
            Arc::new(Mutex::new(EmulatedCECDriver::builder().build())),
            DeviceRole::Sink,
        );
        for scenario in [
            default_logical_address,
            add_remove_round_trip,
            broadcast_transmission,
            unacknowledged_transmission,
            physical_address_bounds,
        ] {
            assert_eq!(Ok(()), scenario(&sink));
        }
    }

    #[test]
    fn it_passes_on_an_emulated_source() {
        let source = source(true);
        assert_eq!(Ok(()), default_logical_address(&source));
        assert_eq!(Ok(()), add_remove_round_trip(&source));
        assert_eq!(Ok(()), broadcast_transmission(&source));
    }

    #[test]
    fn it_checks_open_without_sink() {
        assert_eq!(Ok(()), open_without_sink(&source(false)));

        match open_without_sink(&source(true)) {
            Err(ScenarioError::Recoverable(_)) => (),
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test(tokio::test)]
    async fn it_exchanges_cec_versions() {
        assert_eq!(Ok(()), CECVersionExchange {}.run(&source(true)).await);
    }

    #[test(tokio::test)]
    async fn it_completes_asynchronous_transmissions() {
        assert_eq!(Ok(()), AsyncTransmitCompletion {}.run(&source(true)).await);
    }

    #[test(tokio::test)]
    async fn it_reports_dropped_callbacks() {
        let mut mock = MockCECDriver::new();
        mock.expect_open().times(1).returning(|| Ok(CECHandle(1)));
        mock.expect_set_tx_callback()
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_get_logical_address().returning(|_| Ok(0x4));
        mock.expect_get_physical_address().returning(|_| Ok(0x1000));
        mock.expect_tx_async().times(1).returning(|_, _| Ok(()));
        mock.expect_close().times(1).returning(|_| Ok(()));
        let context = context(Arc::new(Mutex::new(mock)), DeviceRole::Source);

        let result = AsyncTransmitCompletion {}.run(&context).await;
        match result {
            Err(ScenarioError::Recoverable(msg)) => {
                assert!(msg.contains("dropped the callback"), "{}", msg)
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }
}

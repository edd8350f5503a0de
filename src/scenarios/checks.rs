use harness::ScenarioError;

use super::ConformanceContext;
use crate::cec::{
    lock_driver, CECDriver, CECError, CECFrame, CECHandle, CECLogicalAddress, CECOpcode, Session,
};

/// Opens a session, failing the whole suite if the driver can not be opened
pub fn open(context: &ConformanceContext) -> Result<Session, ScenarioError> {
    Session::open(&context.driver).map_err(|e| {
        log::error!("Failed to open the CEC driver: {}", e);
        ScenarioError::Fatal(format!("open failed: {}", e))
    })
}

/// Closes a session, failing the whole suite if the driver can not be closed
pub fn close(session: Session) -> Result<(), ScenarioError> {
    session.close().map_err(|e| {
        log::error!("Failed to close the CEC driver: {}", e);
        ScenarioError::Fatal(format!("close failed: {}", e))
    })
}

/// Calls the driver directly, to try handles the session does not hold
pub fn raw<T, F>(context: &ConformanceContext, function: F) -> Result<T, CECError>
where
    F: FnOnce(&mut (dyn CECDriver + 'static)) -> Result<T, CECError>,
{
    let mut driver = lock_driver(&context.driver)?;
    function(&mut *driver)
}

pub fn expect_ok<T>(what: &str, result: Result<T, CECError>) -> Result<T, ScenarioError> {
    result.map_err(|e| {
        log::warn!("{}: unexpected error {}", what, e);
        ScenarioError::Recoverable(format!("{}: expected success, got {}", what, e))
    })
}

pub fn expect_err<T>(
    what: &str,
    expected: CECError,
    result: Result<T, CECError>,
) -> Result<(), ScenarioError>
where
    T: std::fmt::Debug,
{
    match result {
        Err(e) if e == expected => Ok(()),
        Err(e) => Err(ScenarioError::Recoverable(format!(
            "{}: expected {}, got {}",
            what, expected, e
        ))),
        Ok(value) => Err(ScenarioError::Recoverable(format!(
            "{}: expected {}, got success ({:?})",
            what, expected, value
        ))),
    }
}

pub fn expect_eq<T>(what: &str, expected: T, actual: T) -> Result<(), ScenarioError>
where
    T: PartialEq + std::fmt::Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(ScenarioError::Recoverable(format!(
            "{}: expected {:?}, got {:?}",
            what, expected, actual
        )))
    }
}

pub fn expect_that(what: &str, condition: bool) -> Result<(), ScenarioError> {
    if condition {
        Ok(())
    } else {
        Err(ScenarioError::Recoverable(format!("{}: check failed", what)))
    }
}

/// Removes every logical address held by the device, one at a time
pub fn remove_all_addresses(session: &Session) -> Result<(), ScenarioError> {
    // 0xF is also what get_logical_address reports once nothing is held
    expect_ok(
        "remove logical address F",
        session.remove_logical_address(CECLogicalAddress::UNREGISTERED),
    )?;
    // a device can not hold more addresses than there are
    for _ in 0..=CECLogicalAddress::UNREGISTERED {
        let address = expect_ok("get logical address", session.get_logical_address())?;
        if address == CECLogicalAddress::UNREGISTERED {
            return Ok(());
        }
        log::debug!("Removing logical address {:X}", address);
        expect_ok(
            "remove logical address",
            session.remove_logical_address(address),
        )?;
    }
    Err(ScenarioError::Recoverable(String::from(
        "logical addresses keep coming back after being removed",
    )))
}

/// Broadcast announcing the physical address of the device
pub fn report_physical_address(
    context: &ConformanceContext,
    session: &Session,
) -> Result<CECFrame, ScenarioError> {
    let initiator = expect_ok("get logical address", session.get_logical_address())?;
    let physical_address = expect_ok("get physical address", session.get_physical_address())?;
    expect_ok(
        "build report physical address",
        CECFrame::new(
            initiator,
            CECLogicalAddress::Broadcast.raw(),
            CECOpcode::ReportPhysicalAddress,
            &[
                (physical_address >> 8) as u8,
                (physical_address & 0xFF) as u8,
                context.profile.cec.device_type as u8,
            ],
        ),
    )
}

/// Handle closed before use, to check calls made after close
pub fn closed_handle(context: &ConformanceContext) -> Result<CECHandle, ScenarioError> {
    let session = open(context)?;
    let handle = session.get_handle();
    close(session)?;
    Ok(handle)
}

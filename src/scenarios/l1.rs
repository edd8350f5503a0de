use harness::{from_fn, Scenario, ScenarioError};

use super::checks::{self, expect_eq, expect_err, expect_ok, expect_that};
use super::ConformanceContext;
use crate::cec::{
    CECDriver, CECError, CECHandle, CECLogicalAddress, Session, TxResult, CEC_MAX_FRAME_SIZE,
};

pub fn get_scenarios() -> Vec<Box<dyn Scenario<ConformanceContext>>> {
    vec![
        from_fn("open_close_positive", open_close_positive),
        from_fn("open_close_negative", open_close_negative),
        from_fn("set_logical_address_positive", set_logical_address_positive),
        from_fn("set_logical_address_negative", set_logical_address_negative),
        from_fn("add_logical_address_positive", add_logical_address_positive),
        from_fn("add_logical_address_negative", add_logical_address_negative),
        from_fn("remove_logical_address_positive", remove_logical_address_positive),
        from_fn("remove_logical_address_negative", remove_logical_address_negative),
        from_fn("get_logical_address_positive", get_logical_address_positive),
        from_fn("get_logical_address_negative", get_logical_address_negative),
        from_fn("get_physical_address_positive", get_physical_address_positive),
        from_fn("get_physical_address_negative", get_physical_address_negative),
        from_fn("set_rx_callback_positive", set_rx_callback_positive),
        from_fn("set_rx_callback_negative", set_rx_callback_negative),
        from_fn("set_tx_callback_positive", set_tx_callback_positive),
        from_fn("set_tx_callback_negative", set_tx_callback_negative),
        from_fn("tx_positive", tx_positive),
        from_fn("tx_negative", tx_negative),
        from_fn("tx_async_positive", tx_async_positive),
        from_fn("tx_async_negative", tx_async_negative),
    ]
}

/// Address the device is expected to be able to take
fn own_address(context: &ConformanceContext, session: &Session) -> Result<u8, ScenarioError> {
    if context.is_sink() {
        Ok(CECLogicalAddress::TV.raw())
    } else {
        expect_ok("get logical address", session.get_logical_address())
    }
}

/// Checks a call fails the expected way on a handle the driver never gave, and once closed
fn expect_rejected<T, F>(
    context: &ConformanceContext,
    what: &str,
    call: F,
) -> Result<(), ScenarioError>
where
    T: std::fmt::Debug,
    F: Fn(&mut (dyn CECDriver + 'static), CECHandle) -> Result<T, CECError>,
{
    let session = checks::open(context)?;
    let invalid = checks::raw(context, |driver| call(driver, CECHandle::INVALID));
    expect_err(
        &format!("{} with an invalid handle", what),
        context.invalid_handle_error(),
        invalid,
    )?;
    checks::close(session)?;

    let handle = checks::closed_handle(context)?;
    let closed = checks::raw(context, |driver| call(driver, handle));
    expect_err(&format!("{} after close", what), CECError::NotOpened, closed)
}

fn open_close_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_that(
        "open returns a valid handle",
        session.get_handle() != CECHandle::INVALID,
    )?;
    checks::close(session)
}

fn open_close_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_err(
        "open twice",
        CECError::AlreadyOpen,
        checks::raw(context, |driver| driver.open()),
    )?;
    expect_err(
        "close with an invalid handle",
        context.invalid_handle_error(),
        checks::raw(context, |driver| driver.close(CECHandle::INVALID)),
    )?;
    let handle = session.get_handle();
    checks::close(session)?;
    expect_err(
        "close after close",
        CECError::NotOpened,
        checks::raw(context, |driver| driver.close(handle)),
    )
}

fn set_logical_address_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let address = own_address(context, &session)?;
    expect_ok(
        "set logical address",
        session.set_logical_address(&[address]),
    )?;
    expect_eq(
        "logical address after set",
        Ok(address),
        session.get_logical_address(),
    )?;
    checks::close(session)
}

fn set_logical_address_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_err(
        "set an out of range logical address",
        CECError::InvalidArgument,
        session.set_logical_address(&[0x10]),
    )?;
    checks::close(session)?;
    expect_rejected(context, "set logical address", |driver, handle| {
        driver.set_logical_address(handle, &[CECLogicalAddress::TV.raw()])
    })
}

fn add_logical_address_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let address = own_address(context, &session)?;
    expect_ok("add logical address", session.add_logical_address(address))?;
    checks::close(session)
}

fn add_logical_address_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_err(
        "add an out of range logical address",
        CECError::InvalidArgument,
        session.add_logical_address(0x10),
    )?;
    checks::close(session)?;
    expect_rejected(context, "add logical address", |driver, handle| {
        driver.add_logical_address(handle, CECLogicalAddress::TV.raw())
    })
}

fn remove_logical_address_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let address = own_address(context, &session)?;
    expect_ok("add logical address", session.add_logical_address(address))?;
    expect_ok(
        "remove logical address",
        session.remove_logical_address(address),
    )?;
    checks::close(session)
}

fn remove_logical_address_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_err(
        "remove an out of range logical address",
        CECError::InvalidArgument,
        session.remove_logical_address(0x10),
    )?;
    checks::close(session)?;
    expect_rejected(context, "remove logical address", |driver, handle| {
        driver.remove_logical_address(handle, CECLogicalAddress::TV.raw())
    })
}

fn get_logical_address_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let address = expect_ok("get logical address", session.get_logical_address())?;
    expect_that(
        &format!("logical address {:X} is in range", address),
        address <= CECLogicalAddress::UNREGISTERED,
    )?;
    checks::close(session)
}

fn get_logical_address_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    expect_rejected(context, "get logical address", |driver, handle| {
        driver.get_logical_address(handle)
    })
}

fn get_physical_address_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let address = expect_ok("get physical address", session.get_physical_address())?;
    expect_that(
        &format!("physical address {:04X} is assigned", address),
        address < 0xFFFF,
    )?;
    checks::close(session)
}

fn get_physical_address_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    expect_rejected(context, "get physical address", |driver, handle| {
        driver.get_physical_address(handle)
    })
}

fn set_rx_callback_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_ok(
        "register receive callback",
        session.call(|driver, handle| {
            driver.set_rx_callback(handle, Some(Box::new(|_, _| ())))
        }),
    )?;
    expect_ok(
        "clear receive callback",
        session.call(|driver, handle| driver.set_rx_callback(handle, None)),
    )?;
    checks::close(session)
}

fn set_rx_callback_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    expect_rejected(context, "register receive callback", |driver, handle| {
        driver.set_rx_callback(handle, Some(Box::new(|_, _| ())))
    })
}

fn set_tx_callback_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    expect_ok(
        "register transmit callback",
        session.call(|driver, handle| {
            driver.set_tx_callback(handle, Some(Box::new(|_, _| ())))
        }),
    )?;
    expect_ok(
        "clear transmit callback",
        session.call(|driver, handle| driver.set_tx_callback(handle, None)),
    )?;
    checks::close(session)
}

fn set_tx_callback_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    expect_rejected(context, "register transmit callback", |driver, handle| {
        driver.set_tx_callback(handle, Some(Box::new(|_, _| ())))
    })
}

fn tx_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let frame = checks::report_physical_address(context, &session)?;
    expect_eq(
        &format!("send {}", frame),
        Ok(TxResult::SentAndAcked),
        session.tx(frame.as_bytes()),
    )?;
    checks::close(session)
}

/// Frames no driver should put on the bus
fn invalid_frames() -> [Vec<u8>; 2] {
    [Vec::new(), vec![0x0F; CEC_MAX_FRAME_SIZE + 1]]
}

fn tx_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    for frame in invalid_frames().iter() {
        expect_err(
            &format!("send a frame of {} bytes", frame.len()),
            CECError::InvalidArgument,
            session.tx(frame),
        )?;
    }
    checks::close(session)?;
    expect_rejected(context, "send", |driver, handle| {
        driver.tx(handle, &[0x0F, 0x36])
    })
}

fn tx_async_positive(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    let frame = checks::report_physical_address(context, &session)?;
    expect_ok(
        &format!("queue {}", frame),
        session.tx_async(frame.as_bytes()),
    )?;
    checks::close(session)
}

fn tx_async_negative(context: &ConformanceContext) -> Result<(), ScenarioError> {
    let session = checks::open(context)?;
    for frame in invalid_frames().iter() {
        expect_err(
            &format!("queue a frame of {} bytes", frame.len()),
            CECError::InvalidArgument,
            session.tx_async(frame),
        )?;
    }
    checks::close(session)?;
    expect_rejected(context, "queue", |driver, handle| {
        driver.tx_async(handle, &[0x0F, 0x36])
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cec::{EmulatedCECDriver, MockCECDriver, SharedDriver};
    use crate::configuration::SuiteConfiguration;

    fn context(driver: SharedDriver) -> ConformanceContext {
        ConformanceContext::new(driver, &SuiteConfiguration::default())
    }

    fn emulated() -> ConformanceContext {
        context(Arc::new(Mutex::new(EmulatedCECDriver::builder().build())))
    }

    #[test]
    fn it_passes_on_the_emulated_driver() {
        let context = emulated();
        for scenario in [
            open_close_positive,
            open_close_negative,
            add_logical_address_negative,
            get_physical_address_negative,
            set_rx_callback_positive,
            tx_positive,
            tx_negative,
            tx_async_negative,
        ] {
            assert_eq!(Ok(()), scenario(&context));
        }
    }

    #[test]
    fn it_fails_fatally_when_open_fails() {
        let mut mock = MockCECDriver::new();
        mock.expect_open()
            .times(1)
            .returning(|| Err(CECError::GeneralError));
        let context = context(Arc::new(Mutex::new(mock)));

        match tx_positive(&context) {
            Err(ScenarioError::Fatal(_)) => (),
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn it_fails_on_wrong_statuses_and_closes() {
        let mut mock = MockCECDriver::new();
        mock.expect_open().times(1).returning(|| Ok(CECHandle(1)));
        mock.expect_tx()
            .times(1)
            .returning(|_, _| Ok(TxResult::SentAndAcked));
        mock.expect_close().times(1).returning(|_| Ok(()));
        let context = context(Arc::new(Mutex::new(mock)));

        match tx_negative(&context) {
            Err(ScenarioError::Recoverable(msg)) => {
                assert!(msg.contains("0 bytes"), "{}", msg)
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }
}

use std::sync::{Arc, Mutex};

use super::cec::{lock_driver, CECDriver, CECHandle};
use super::enums::{CECError, TxResult};
use super::frame::CECFrame;
use super::subscription::{self, Subscription};

pub type SharedDriver = Arc<Mutex<dyn CECDriver>>;

/// An open handle on a shared driver
///
/// The handle is released by [Session::close], or when the session is dropped if it was not
/// closed explicitly. The driver is only locked for the duration of each call.
pub struct Session {
    driver: SharedDriver,
    handle: Option<CECHandle>,
}

impl Session {
    pub fn open(driver: &SharedDriver) -> Result<Session, CECError> {
        let handle = lock_driver(driver)?.open()?;
        log::debug!("Opened session {}", handle);
        Ok(Session {
            driver: driver.clone(),
            handle: Some(handle),
        })
    }

    pub fn get_handle(&self) -> CECHandle {
        self.handle.unwrap_or(CECHandle::INVALID)
    }

    /// Runs a raw driver call with the handle of this session
    pub fn call<T, F>(&self, function: F) -> Result<T, CECError>
    where
        F: FnOnce(&mut (dyn CECDriver + 'static), CECHandle) -> Result<T, CECError>,
    {
        let mut driver = lock_driver(&self.driver)?;
        function(&mut *driver, self.get_handle())
    }

    pub fn set_logical_address(&self, addresses: &[u8]) -> Result<(), CECError> {
        self.call(|driver, handle| driver.set_logical_address(handle, addresses))
    }

    pub fn add_logical_address(&self, address: u8) -> Result<(), CECError> {
        self.call(|driver, handle| driver.add_logical_address(handle, address))
    }

    pub fn remove_logical_address(&self, address: u8) -> Result<(), CECError> {
        self.call(|driver, handle| driver.remove_logical_address(handle, address))
    }

    pub fn get_logical_address(&self) -> Result<u8, CECError> {
        self.call(|driver, handle| driver.get_logical_address(handle))
    }

    pub fn get_physical_address(&self) -> Result<u16, CECError> {
        self.call(|driver, handle| driver.get_physical_address(handle))
    }

    pub fn tx(&self, frame: &[u8]) -> Result<TxResult, CECError> {
        log::debug!("Session {} sending {:02X?}", self.get_handle(), frame);
        self.call(|driver, handle| driver.tx(handle, frame))
    }

    pub fn tx_async(&self, frame: &[u8]) -> Result<(), CECError> {
        log::debug!("Session {} queuing {:02X?}", self.get_handle(), frame);
        self.call(|driver, handle| driver.tx_async(handle, frame))
    }

    /// Registers a receive callback feeding the returned subscription
    pub fn subscribe_rx(&self) -> Result<Subscription<CECFrame>, CECError> {
        let (sender, subscription) = Subscription::channel();
        self.call(|driver, handle| {
            driver.set_rx_callback(handle, Some(subscription::rx_callback(sender)))
        })?;
        Ok(subscription)
    }

    /// Registers a transmission callback feeding the returned subscription
    pub fn subscribe_tx(&self) -> Result<Subscription<TxResult>, CECError> {
        let (sender, subscription) = Subscription::channel();
        self.call(|driver, handle| {
            driver.set_tx_callback(handle, Some(subscription::tx_callback(sender)))
        })?;
        Ok(subscription)
    }

    pub fn unsubscribe(&self) -> Result<(), CECError> {
        self.call(|driver, handle| {
            driver.set_rx_callback(handle, None)?;
            driver.set_tx_callback(handle, None)
        })
    }

    pub fn close(mut self) -> Result<(), CECError> {
        match self.handle.take() {
            Some(handle) => {
                log::debug!("Closing session {}", handle);
                lock_driver(&self.driver)?.close(handle)
            }
            None => Ok(()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::debug!("Session {} dropped without being closed, closing it", handle);
            if let Err(e) = lock_driver(&self.driver).and_then(|mut driver| driver.close(handle)) {
                log::error!("Failed to close session {}: {}", handle, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::cec::cec::MockCECDriver;

    fn shared(mock: MockCECDriver) -> SharedDriver {
        Arc::new(Mutex::new(mock))
    }

    #[test]
    fn it_closes_sessions_once() {
        let mut mock = MockCECDriver::new();
        mock.expect_open().times(1).returning(|| Ok(CECHandle(3)));
        mock.expect_get_physical_address()
            .with(eq(CECHandle(3)))
            .times(1)
            .returning(|_| Ok(0x2000));
        mock.expect_close()
            .with(eq(CECHandle(3)))
            .times(1)
            .returning(|_| Ok(()));
        let driver = shared(mock);

        let session = Session::open(&driver).unwrap();
        assert_eq!(Ok(0x2000), session.get_physical_address());
        assert_eq!(Ok(()), session.close());
    }

    #[test]
    fn it_closes_dropped_sessions() {
        let mut mock = MockCECDriver::new();
        mock.expect_open().times(1).returning(|| Ok(CECHandle(7)));
        mock.expect_tx()
            .times(1)
            .returning(|_, _| Err(CECError::SentFailed));
        mock.expect_close()
            .with(eq(CECHandle(7)))
            .times(1)
            .returning(|_| Ok(()));
        let driver = shared(mock);

        let failing = || -> Result<(), CECError> {
            let session = Session::open(&driver)?;
            session.tx(&[0x0F, 0x36])?;
            session.close()
        };

        assert_eq!(Err(CECError::SentFailed), failing());
    }

    #[test]
    fn it_does_not_close_what_failed_to_open() {
        let mut mock = MockCECDriver::new();
        mock.expect_open()
            .times(1)
            .returning(|| Err(CECError::LogicalAddressUnavailable));
        mock.expect_close().never();
        let driver = shared(mock);

        assert_eq!(
            Some(CECError::LogicalAddressUnavailable),
            Session::open(&driver).err()
        );
    }
}

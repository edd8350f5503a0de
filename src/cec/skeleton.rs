use super::cec::{CECDriver, CECHandle, RxCallback, TxCallback};
use super::enums::{CECError, TxResult};

/// Reference implementation of [CECDriver] doing nothing
///
/// Every call succeeds and ignores its arguments. Vendors start from this to bind their own
/// hardware, it is not expected to pass the conformance suites as is.
#[derive(Default)]
pub struct CECSkeleton {}

impl CECDriver for CECSkeleton {
    fn open(&mut self) -> Result<CECHandle, CECError> {
        Ok(CECHandle(1))
    }

    fn close(&mut self, _handle: CECHandle) -> Result<(), CECError> {
        Ok(())
    }

    fn set_logical_address(
        &mut self,
        _handle: CECHandle,
        _addresses: &[u8],
    ) -> Result<(), CECError> {
        Ok(())
    }

    fn add_logical_address(
        &mut self,
        _handle: CECHandle,
        _address: u8,
    ) -> Result<(), CECError> {
        Ok(())
    }

    fn remove_logical_address(
        &mut self,
        _handle: CECHandle,
        _address: u8,
    ) -> Result<(), CECError> {
        Ok(())
    }

    fn get_logical_address(&self, _handle: CECHandle) -> Result<u8, CECError> {
        Ok(0xF)
    }

    fn get_physical_address(&self, _handle: CECHandle) -> Result<u16, CECError> {
        Ok(0x0000)
    }

    fn set_rx_callback(
        &mut self,
        _handle: CECHandle,
        _callback: Option<RxCallback>,
    ) -> Result<(), CECError> {
        Ok(())
    }

    fn set_tx_callback(
        &mut self,
        _handle: CECHandle,
        _callback: Option<TxCallback>,
    ) -> Result<(), CECError> {
        Ok(())
    }

    fn tx(&mut self, _handle: CECHandle, _frame: &[u8]) -> Result<TxResult, CECError> {
        Ok(TxResult::SentAndAcked)
    }

    fn tx_async(&mut self, _handle: CECHandle, _frame: &[u8]) -> Result<(), CECError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_accepts_everything() {
        let mut skeleton = CECSkeleton::default();
        let handle = skeleton.open().unwrap();

        assert_eq!(Ok(()), skeleton.add_logical_address(handle, 0x42));
        assert_eq!(Ok(0xF), skeleton.get_logical_address(handle));
        assert_eq!(Ok(0x0000), skeleton.get_physical_address(handle));
        assert_eq!(Ok(TxResult::SentAndAcked), skeleton.tx(handle, &[]));
        assert_eq!(Ok(()), skeleton.set_rx_callback(handle, None));
        assert_eq!(Ok(()), skeleton.close(CECHandle::INVALID));
        assert_eq!(Ok(()), skeleton.close(handle));
    }
}

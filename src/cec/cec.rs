use super::enums::*;

/// Opaque identifier of an open session with the CEC bus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CECHandle(pub u32);

impl CECHandle {
    /// Never handed out by a driver, used to check how invalid handles are handled
    pub const INVALID: CECHandle = CECHandle(0);
}

impl std::fmt::Display for CECHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Called with the raw bytes of every frame received for the session
pub type RxCallback = Box<dyn Fn(CECHandle, &[u8]) + Send + Sync>;

/// Called with the outcome of every frame sent through [CECDriver::tx_async]
pub type TxCallback = Box<dyn Fn(CECHandle, TxResult) + Send + Sync>;

/// The HDMI-CEC driver contract, implemented by vendors on top of their hardware
///
/// Every call returns its failure status in the `Err` variant. Calls made when no session is
/// open fail with [CECError::NotOpened], calls made with a handle that is not the open one fail
/// with [CECError::InvalidHandle] (or [CECError::InvalidArgument] on drivers that do not report
/// extended statuses).
///
/// Logical addresses are given as raw values so callers can pass out of range values: anything
/// above `0xF` is an [CECError::InvalidArgument].
#[cfg_attr(test, mockall::automock)]
pub trait CECDriver: Sync + Send {
    /// Opens a session. A source device allocates its logical address during this call and fails
    /// with [CECError::LogicalAddressUnavailable] if no sink is there to allocate it from
    fn open(&mut self) -> Result<CECHandle, CECError>;

    /// Closes the session and drops its callbacks
    fn close(&mut self, handle: CECHandle) -> Result<(), CECError>;

    /// Replaces every logical address of the device
    fn set_logical_address(&mut self, handle: CECHandle, addresses: &[u8]) -> Result<(), CECError>;

    fn add_logical_address(&mut self, handle: CECHandle, address: u8) -> Result<(), CECError>;

    fn remove_logical_address(&mut self, handle: CECHandle, address: u8) -> Result<(), CECError>;

    /// Returns the most recently added logical address, or `0xF` when the device holds none
    fn get_logical_address(&self, handle: CECHandle) -> Result<u8, CECError>;

    /// Returns the physical address of the device, `0xFFFF` meaning none is assigned
    fn get_physical_address(&self, handle: CECHandle) -> Result<u16, CECError>;

    /// Registers the callback receiving frames, or unregisters it if [None] is given
    fn set_rx_callback(
        &mut self,
        handle: CECHandle,
        callback: Option<RxCallback>,
    ) -> Result<(), CECError>;

    /// Registers the callback receiving asynchronous transmission results, or unregisters it if
    /// [None] is given
    fn set_tx_callback(
        &mut self,
        handle: CECHandle,
        callback: Option<TxCallback>,
    ) -> Result<(), CECError>;

    /// Sends a frame and waits for the acknowledgement of its destination
    fn tx(&mut self, handle: CECHandle, frame: &[u8]) -> Result<TxResult, CECError>;

    /// Queues a frame, its result being given to the transmission callback
    ///
    /// Deprecated in favor of [CECDriver::tx]
    fn tx_async(&mut self, handle: CECHandle, frame: &[u8]) -> Result<(), CECError>;
}

/// Locks the shared driver, a poisoned lock being reported as a [CECError::GeneralError]
pub fn lock_driver<'a>(
    driver: &'a std::sync::Mutex<dyn CECDriver + 'static>,
) -> Result<std::sync::MutexGuard<'a, dyn CECDriver + 'static>, CECError> {
    driver.lock().map_err(|_| {
        log::error!("Failed to acquire lock on CEC driver");
        CECError::GeneralError
    })
}

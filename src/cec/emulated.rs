use std::convert::TryFrom;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::cec::{CECDriver, CECHandle, RxCallback, TxCallback};
use super::enums::*;
use super::frame::CECFrame;

type SharedRxCallback = Arc<dyn Fn(CECHandle, &[u8]) + Send + Sync>;
type SharedTxCallback = Arc<dyn Fn(CECHandle, TxResult) + Send + Sync>;

/// Delay after which remote devices answer a request
const REPLY_DELAY: Duration = Duration::from_millis(20);

#[derive(Default)]
struct Callbacks {
    rx: Option<(CECHandle, SharedRxCallback)>,
    tx: Option<(CECHandle, SharedTxCallback)>,
}

struct SessionRecord {
    // ordered by insertion, the last one being the current address
    addresses: Vec<u8>,
}

/// A frame delivered to the receive callback some time after it gets registered
#[derive(Clone, Debug, PartialEq)]
pub struct InjectedFrame {
    pub delay: Duration,
    pub data: Vec<u8>,
}

/// Builder for [EmulatedCECDriver]
pub struct EmulatedCECDriverBuilder {
    role: DeviceRole,
    device_type: CECDeviceType,
    sink_connected: bool,
    physical_address: Option<u16>,
    remote_devices: Option<Vec<u8>>,
    injected_frames: Vec<InjectedFrame>,
    extended_statuses: bool,
}

/// [CECDriver] running on a virtual bus, to exercise the conformance suites without hardware
///
/// Other devices on the bus are only modeled by their logical addresses: they acknowledge the
/// frames sent to them, and answer a few requests (CEC version, physical address, power status).
pub struct EmulatedCECDriver {
    role: DeviceRole,
    device_type: CECDeviceType,
    sink_connected: bool,
    physical_address: u16,
    remote_devices: Vec<u8>,
    injected_frames: Vec<InjectedFrame>,
    extended_statuses: bool,
    next_handle: u32,
    sessions: std::collections::HashMap<CECHandle, SessionRecord>,
    callbacks: Arc<Mutex<Callbacks>>,
}

/// Sends frames to the receive callback of an [EmulatedCECDriver] from anywhere
#[derive(Clone)]
pub struct FrameInjector {
    callbacks: Arc<Mutex<Callbacks>>,
}

impl EmulatedCECDriverBuilder {
    fn new() -> Self {
        EmulatedCECDriverBuilder {
            role: DeviceRole::Sink,
            device_type: CECDeviceType::TV,
            sink_connected: true,
            physical_address: None,
            remote_devices: None,
            injected_frames: Vec::new(),
            extended_statuses: true,
        }
    }

    pub fn with_role(mut self, role: DeviceRole, device_type: CECDeviceType) -> Self {
        self.role = role;
        self.device_type = device_type;
        self
    }

    /// Tells whether a TV is there to allocate logical addresses from (source devices only)
    pub fn with_sink_connected(mut self, sink_connected: bool) -> Self {
        self.sink_connected = sink_connected;
        self
    }

    pub fn with_physical_address(mut self, physical_address: Option<u16>) -> Self {
        self.physical_address = physical_address;
        self
    }

    /// Gives the logical addresses of the other devices on the bus
    pub fn with_remote_devices(mut self, remote_devices: Option<Vec<u8>>) -> Self {
        self.remote_devices = remote_devices;
        self
    }

    pub fn with_injected_frame(mut self, delay: Duration, data: Vec<u8>) -> Self {
        self.injected_frames.push(InjectedFrame { delay, data });
        self
    }

    /// Whether invalid handles are reported as [CECError::InvalidHandle] rather than
    /// [CECError::InvalidArgument]
    pub fn with_extended_statuses(mut self, extended_statuses: bool) -> Self {
        self.extended_statuses = extended_statuses;
        self
    }

    pub fn build(self) -> EmulatedCECDriver {
        let source_with_sink = self.role == DeviceRole::Source && self.sink_connected;
        let physical_address = self.physical_address.unwrap_or(match self.role {
            DeviceRole::Sink => 0x0000,
            DeviceRole::Source if self.sink_connected => 0x1000,
            DeviceRole::Source => 0xFFFF,
        });
        let mut remote_devices = self.remote_devices.unwrap_or_default();
        if source_with_sink && !remote_devices.contains(&CECLogicalAddress::TV.raw()) {
            remote_devices.push(CECLogicalAddress::TV.raw());
        }
        log::debug!(
            "Emulated CEC bus: {:?} {:?}, physical address {:04X}, remote devices {:?}",
            self.role,
            self.device_type,
            physical_address,
            remote_devices
        );
        EmulatedCECDriver {
            role: self.role,
            device_type: self.device_type,
            sink_connected: self.sink_connected,
            physical_address,
            remote_devices,
            injected_frames: self.injected_frames,
            extended_statuses: self.extended_statuses,
            next_handle: 0,
            sessions: std::collections::HashMap::new(),
            callbacks: Arc::new(Mutex::new(Callbacks::default())),
        }
    }
}

impl FrameInjector {
    /// Delivers the frame to the receive callback registered at delivery time, if any
    pub fn inject(&self, data: Vec<u8>, delay: Duration) {
        deliver_rx(&self.callbacks, data, delay, None);
    }
}

/// Delivers a frame after the delay, only to the given session if there is one
fn deliver_rx(
    callbacks: &Arc<Mutex<Callbacks>>,
    data: Vec<u8>,
    delay: Duration,
    session: Option<CECHandle>,
) {
    let callbacks = callbacks.clone();
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        let callback = match callbacks.lock() {
            Ok(callbacks) => callbacks.rx.clone(),
            Err(_) => None,
        };
        match callback {
            Some((handle, _)) if session.map_or(false, |session| session != handle) => {
                log::debug!("Session {} is gone, dropping frame {:02X?}", handle, data)
            }
            Some((handle, callback)) => {
                log::debug!("Delivering frame {:02X?} to session {}", data, handle);
                callback(handle, &data);
            }
            None => log::debug!("No receive callback, dropping frame {:02X?}", data),
        }
    });
}

/// Reports a transmission result after the delay, only to the session that sent the frame
fn deliver_tx(callbacks: &Arc<Mutex<Callbacks>>, result: TxResult, session: CECHandle) {
    let callbacks = callbacks.clone();
    std::thread::spawn(move || {
        std::thread::sleep(REPLY_DELAY);
        let callback = match callbacks.lock() {
            Ok(callbacks) => callbacks.tx.clone(),
            Err(_) => None,
        };
        match callback {
            Some((handle, _)) if handle != session => {
                log::debug!("Session {} is gone, dropping result {:?}", session, result)
            }
            Some((handle, callback)) => callback(handle, result),
            None => log::debug!("No transmit callback, dropping result {:?}", result),
        }
    });
}

impl EmulatedCECDriver {
    pub fn builder() -> EmulatedCECDriverBuilder {
        EmulatedCECDriverBuilder::new()
    }

    pub fn get_injector(&self) -> FrameInjector {
        FrameInjector {
            callbacks: self.callbacks.clone(),
        }
    }

    fn invalid_handle(&self) -> CECError {
        if self.extended_statuses {
            CECError::InvalidHandle
        } else {
            CECError::InvalidArgument
        }
    }

    fn session(&self, handle: CECHandle) -> Result<&SessionRecord, CECError> {
        if self.sessions.is_empty() {
            return Err(CECError::NotOpened);
        }
        let invalid_handle = self.invalid_handle();
        self.sessions.get(&handle).ok_or(invalid_handle)
    }

    fn session_mut(&mut self, handle: CECHandle) -> Result<&mut SessionRecord, CECError> {
        if self.sessions.is_empty() {
            return Err(CECError::NotOpened);
        }
        let invalid_handle = self.invalid_handle();
        self.sessions.get_mut(&handle).ok_or(invalid_handle)
    }

    fn check_address(address: u8) -> Result<u8, CECError> {
        CECLogicalAddress::try_from(address).map(CECLogicalAddress::raw)
    }

    fn allocate_address(&self) -> Result<Vec<u8>, CECError> {
        match self.role {
            DeviceRole::Sink => Ok(Vec::new()),
            DeviceRole::Source => {
                if !self.sink_connected {
                    log::warn!("No sink on the bus to allocate a logical address from");
                    return Err(CECError::LogicalAddressUnavailable);
                }
                // polls every candidate, the first one nobody acknowledges is ours
                Ok(self
                    .device_type
                    .candidate_addresses()
                    .iter()
                    .find(|address| !self.remote_devices.contains(*address))
                    .map(|address| vec![*address])
                    .unwrap_or_default())
            }
        }
    }

    fn transmit(&self, handle: CECHandle, frame: &CECFrame) -> TxResult {
        let acked = frame.is_broadcast() || self.remote_devices.contains(&frame.destination());
        let result = if acked {
            TxResult::SentAndAcked
        } else {
            TxResult::SentButNotAcked
        };
        log::debug!("Sent frame {}: {:?}", frame, result);
        if result == TxResult::SentAndAcked && !frame.is_broadcast() {
            if let Some(reply) = self.get_reply(frame) {
                deliver_rx(&self.callbacks, reply, REPLY_DELAY, Some(handle));
            }
        }
        result
    }

    /// Answer of the remote device the frame is addressed to
    fn get_reply(&self, frame: &CECFrame) -> Option<Vec<u8>> {
        let remote = frame.destination();
        let header = remote << 4 | frame.initiator();
        let opcode = CECOpcode::try_from(frame.opcode()?).ok()?;
        match opcode {
            CECOpcode::GetCECVersion => {
                Some(vec![header, CECOpcode::CECVersion as u8, CECVersion::V1_4 as u8])
            }
            CECOpcode::GivePhysicalAddress => {
                let physical_address = if remote == CECLogicalAddress::TV.raw() {
                    0x0000
                } else {
                    (remote as u16) << 12
                };
                Some(vec![
                    remote << 4 | CECLogicalAddress::Broadcast.raw(),
                    CECOpcode::ReportPhysicalAddress as u8,
                    (physical_address >> 8) as u8,
                    (physical_address & 0xFF) as u8,
                    CECDeviceType::of_address(remote) as u8,
                ])
            }
            CECOpcode::GiveDevicePowerStatus => {
                Some(vec![header, CECOpcode::ReportPowerStatus as u8, 0x00])
            }
            _ => None,
        }
    }

    fn clear_callbacks(&self) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            *callbacks = Callbacks::default();
        }
    }
}

impl CECDriver for EmulatedCECDriver {
    fn open(&mut self) -> Result<CECHandle, CECError> {
        if !self.sessions.is_empty() {
            return Err(CECError::AlreadyOpen);
        }
        let addresses = self.allocate_address()?;
        self.next_handle = self.next_handle.checked_add(1).unwrap_or(1);
        let handle = CECHandle(self.next_handle);
        log::info!(
            "Opened emulated CEC session {} with logical addresses {:?}",
            handle,
            addresses
        );
        self.sessions.insert(handle, SessionRecord { addresses });
        Ok(handle)
    }

    fn close(&mut self, handle: CECHandle) -> Result<(), CECError> {
        self.session(handle)?;
        self.sessions.remove(&handle);
        self.clear_callbacks();
        log::info!("Closed emulated CEC session {}", handle);
        Ok(())
    }

    fn set_logical_address(
        &mut self,
        handle: CECHandle,
        addresses: &[u8],
    ) -> Result<(), CECError> {
        let session = self.session_mut(handle)?;
        let mut checked = Vec::with_capacity(addresses.len());
        for address in addresses {
            let address = EmulatedCECDriver::check_address(*address)?;
            if !checked.contains(&address) {
                checked.push(address);
            }
        }
        session.addresses = checked;
        Ok(())
    }

    fn add_logical_address(&mut self, handle: CECHandle, address: u8) -> Result<(), CECError> {
        let session = self.session_mut(handle)?;
        let address = EmulatedCECDriver::check_address(address)?;
        session.addresses.retain(|a| *a != address);
        session.addresses.push(address);
        Ok(())
    }

    fn remove_logical_address(&mut self, handle: CECHandle, address: u8) -> Result<(), CECError> {
        let session = self.session_mut(handle)?;
        let address = EmulatedCECDriver::check_address(address)?;
        session.addresses.retain(|a| *a != address);
        Ok(())
    }

    fn get_logical_address(&self, handle: CECHandle) -> Result<u8, CECError> {
        Ok(self
            .session(handle)?
            .addresses
            .last()
            .copied()
            .unwrap_or(CECLogicalAddress::UNREGISTERED))
    }

    fn get_physical_address(&self, handle: CECHandle) -> Result<u16, CECError> {
        self.session(handle)?;
        Ok(self.physical_address)
    }

    fn set_rx_callback(
        &mut self,
        handle: CECHandle,
        callback: Option<RxCallback>,
    ) -> Result<(), CECError> {
        self.session(handle)?;
        let registered = callback.is_some();
        {
            let mut callbacks = self.callbacks.lock().map_err(|_| CECError::GeneralError)?;
            callbacks.rx = callback.map(|callback| (handle, SharedRxCallback::from(callback)));
        }
        if registered {
            for frame in self.injected_frames.iter() {
                deliver_rx(&self.callbacks, frame.data.clone(), frame.delay, Some(handle));
            }
        }
        Ok(())
    }

    fn set_tx_callback(
        &mut self,
        handle: CECHandle,
        callback: Option<TxCallback>,
    ) -> Result<(), CECError> {
        self.session(handle)?;
        let mut callbacks = self.callbacks.lock().map_err(|_| CECError::GeneralError)?;
        callbacks.tx = callback.map(|callback| (handle, SharedTxCallback::from(callback)));
        Ok(())
    }

    fn tx(&mut self, handle: CECHandle, frame: &[u8]) -> Result<TxResult, CECError> {
        self.session(handle)?;
        let frame = CECFrame::try_from(frame)?;
        Ok(self.transmit(handle, &frame))
    }

    fn tx_async(&mut self, handle: CECHandle, frame: &[u8]) -> Result<(), CECError> {
        self.session(handle)?;
        let frame = CECFrame::try_from(frame)?;
        let result = self.transmit(handle, &frame);
        deliver_tx(&self.callbacks, result, handle);
        Ok(())
    }
}

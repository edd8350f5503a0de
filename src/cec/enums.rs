/// Every status a driver call can end with
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CECStatus {
    Success = 0,
    SentAndAcked = 1,
    SentButNotAcked = 2,
    SentFailed = 3,
    NotOpened = 4,
    InvalidArgument = 5,
    LogicalAddressUnavailable = 6,
    GeneralError = 7,
    AlreadyOpen = 8,
    AlreadyRemoved = 9,
    InvalidOutput = 10,
    InvalidHandle = 11,
    InvalidState = 12,
    OperationNotSupported = 13,
}

/// Failure statuses, returned in the `Err` side of every driver call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CECError {
    SentFailed,
    NotOpened,
    InvalidArgument,
    LogicalAddressUnavailable,
    GeneralError,
    AlreadyOpen,
    AlreadyRemoved,
    InvalidOutput,
    InvalidHandle,
    InvalidState,
    OperationNotSupported,
}

/// Outcome of a frame that made it on the bus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxResult {
    SentAndAcked,
    SentButNotAcked,
}

impl CECStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<CECError> for CECStatus {
    fn from(error: CECError) -> Self {
        match error {
            CECError::SentFailed => CECStatus::SentFailed,
            CECError::NotOpened => CECStatus::NotOpened,
            CECError::InvalidArgument => CECStatus::InvalidArgument,
            CECError::LogicalAddressUnavailable => CECStatus::LogicalAddressUnavailable,
            CECError::GeneralError => CECStatus::GeneralError,
            CECError::AlreadyOpen => CECStatus::AlreadyOpen,
            CECError::AlreadyRemoved => CECStatus::AlreadyRemoved,
            CECError::InvalidOutput => CECStatus::InvalidOutput,
            CECError::InvalidHandle => CECStatus::InvalidHandle,
            CECError::InvalidState => CECStatus::InvalidState,
            CECError::OperationNotSupported => CECStatus::OperationNotSupported,
        }
    }
}

impl std::fmt::Display for CECStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

impl std::fmt::Display for CECError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", CECStatus::from(*self))
    }
}

impl std::error::Error for CECError {}

/// Whether the device under test displays video (sink) or sends it (source)
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    Source,
    Sink,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum CECDeviceType {
    #[serde(rename = "TV")]
    TV = 0,
    #[serde(rename = "RECORDING_DEVICE")]
    RecordingDevice = 1,
    #[serde(rename = "RESERVED")]
    Reserved = 2,
    #[serde(rename = "TUNER")]
    Tuner = 3,
    #[serde(rename = "PLAYBACK_DEVICE")]
    PlaybackDevice = 4,
    #[serde(rename = "AUDIO_SYSTEM")]
    AudioSystem = 5,
}

impl CECDeviceType {
    /// Logical addresses a device of this type tries, in order, when it allocates its own
    pub fn candidate_addresses(self) -> &'static [u8] {
        match self {
            CECDeviceType::TV => &[0x0],
            CECDeviceType::RecordingDevice => &[0x1, 0x2, 0x9],
            CECDeviceType::Reserved => &[0xC, 0xD],
            CECDeviceType::Tuner => &[0x3, 0x6, 0x7, 0xA],
            CECDeviceType::PlaybackDevice => &[0x4, 0x8, 0xB],
            CECDeviceType::AudioSystem => &[0x5],
        }
    }

    /// Type of the device owning a logical address
    pub fn of_address(address: u8) -> CECDeviceType {
        match address {
            0x0 => CECDeviceType::TV,
            0x1 | 0x2 | 0x9 => CECDeviceType::RecordingDevice,
            0x3 | 0x6 | 0x7 | 0xA => CECDeviceType::Tuner,
            0x4 | 0x8 | 0xB => CECDeviceType::PlaybackDevice,
            0x5 => CECDeviceType::AudioSystem,
            _ => CECDeviceType::Reserved,
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CECLogicalAddress {
    TV = 0,
    RecordingDevice1 = 1,
    RecordingDevice2 = 2,
    Tuner1 = 3,
    PlaybackDevice1 = 4,
    AudioSystem = 5,
    Tuner2 = 6,
    Tuner3 = 7,
    PlaybackDevice2 = 8,
    RecordingDevice3 = 9,
    Tuner4 = 10,
    PlaybackDevice3 = 11,
    Reserved1 = 12,
    Reserved2 = 13,
    FreeUse = 14,
    // Also the "unregistered" address when used as an initiator
    Broadcast = 15,
}

impl CECLogicalAddress {
    pub const UNREGISTERED: u8 = 0xF;

    pub fn raw(self) -> u8 {
        self as u8
    }
}

impl std::convert::TryFrom<u8> for CECLogicalAddress {
    type Error = CECError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(CECLogicalAddress::TV),
            0x1 => Ok(CECLogicalAddress::RecordingDevice1),
            0x2 => Ok(CECLogicalAddress::RecordingDevice2),
            0x3 => Ok(CECLogicalAddress::Tuner1),
            0x4 => Ok(CECLogicalAddress::PlaybackDevice1),
            0x5 => Ok(CECLogicalAddress::AudioSystem),
            0x6 => Ok(CECLogicalAddress::Tuner2),
            0x7 => Ok(CECLogicalAddress::Tuner3),
            0x8 => Ok(CECLogicalAddress::PlaybackDevice2),
            0x9 => Ok(CECLogicalAddress::RecordingDevice3),
            0xA => Ok(CECLogicalAddress::Tuner4),
            0xB => Ok(CECLogicalAddress::PlaybackDevice3),
            0xC => Ok(CECLogicalAddress::Reserved1),
            0xD => Ok(CECLogicalAddress::Reserved2),
            0xE => Ok(CECLogicalAddress::FreeUse),
            0xF => Ok(CECLogicalAddress::Broadcast),
            _ => Err(CECError::InvalidArgument),
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CECOpcode {
    FeatureAbort = 0x00,
    ImageViewOn = 0x04,
    TextViewOn = 0x0D,
    SetMenuLanguage = 0x32,
    Standby = 0x36,
    UserControlPressed = 0x44,
    UserControlRelease = 0x45,
    GiveOsdName = 0x46,
    SetOsdName = 0x47,
    RoutingChange = 0x80,
    ActiveSource = 0x82,
    GivePhysicalAddress = 0x83,
    ReportPhysicalAddress = 0x84,
    RequestActiveSource = 0x85,
    SetStreamPath = 0x86,
    DeviceVendorId = 0x87,
    GiveDeviceVendorId = 0x8C,
    GiveDevicePowerStatus = 0x8F,
    ReportPowerStatus = 0x90,
    GetMenuLanguage = 0x91,
    InactiveSource = 0x9D,
    CECVersion = 0x9E,
    GetCECVersion = 0x9F,
    Abort = 0xFF,
}

impl std::convert::TryFrom<u8> for CECOpcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(CECOpcode::FeatureAbort),
            0x04 => Ok(CECOpcode::ImageViewOn),
            0x0D => Ok(CECOpcode::TextViewOn),
            0x32 => Ok(CECOpcode::SetMenuLanguage),
            0x36 => Ok(CECOpcode::Standby),
            0x44 => Ok(CECOpcode::UserControlPressed),
            0x45 => Ok(CECOpcode::UserControlRelease),
            0x46 => Ok(CECOpcode::GiveOsdName),
            0x47 => Ok(CECOpcode::SetOsdName),
            0x80 => Ok(CECOpcode::RoutingChange),
            0x82 => Ok(CECOpcode::ActiveSource),
            0x83 => Ok(CECOpcode::GivePhysicalAddress),
            0x84 => Ok(CECOpcode::ReportPhysicalAddress),
            0x85 => Ok(CECOpcode::RequestActiveSource),
            0x86 => Ok(CECOpcode::SetStreamPath),
            0x87 => Ok(CECOpcode::DeviceVendorId),
            0x8C => Ok(CECOpcode::GiveDeviceVendorId),
            0x8F => Ok(CECOpcode::GiveDevicePowerStatus),
            0x90 => Ok(CECOpcode::ReportPowerStatus),
            0x91 => Ok(CECOpcode::GetMenuLanguage),
            0x9D => Ok(CECOpcode::InactiveSource),
            0x9E => Ok(CECOpcode::CECVersion),
            0x9F => Ok(CECOpcode::GetCECVersion),
            0xFF => Ok(CECOpcode::Abort),
            other => Err(other),
        }
    }
}

/// Operand of [CECOpcode::CECVersion]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CECVersion {
    V1_3A = 0x04,
    V1_4 = 0x05,
    V2_0 = 0x06,
}

impl std::convert::TryFrom<u8> for CECVersion {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x04 => Ok(CECVersion::V1_3A),
            0x05 => Ok(CECVersion::V1_4),
            0x06 => Ok(CECVersion::V2_0),
            other => Err(other),
        }
    }
}

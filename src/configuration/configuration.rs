use crate::cec::{CECDeviceType, DeviceRole};

#[derive(Debug)]
pub enum ConfigurationError {
    Read(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::Read(e) => write!(f, "could not read the configuration: {}", e),
            ConfigurationError::Parse(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigurationError {}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct CECProfile {
    #[serde(rename = "deviceType", default = "cec_default_device_type")]
    pub device_type: CECDeviceType,
    #[serde(rename = "extendedEnumSupported", default = "cec_default_extended_enum")]
    pub extended_enum_supported: bool,
}

/// Describes the device under test
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct DeviceProfile {
    #[serde(default = "device_default_name")]
    pub name: String,
    #[serde(default = "device_default_role")]
    pub role: DeviceRole,
    #[serde(default)]
    pub cec: CECProfile,
    /// Whether a TV is plugged to a source device under test
    #[serde(rename = "sinkConnected", default = "device_default_sink_connected")]
    pub sink_connected: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Skeleton,
    Emulated,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct InjectedFrameConfiguration {
    #[serde(rename = "delayMs", default)]
    pub delay_ms: u64,
    pub frame: Vec<u8>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct DriverConfiguration {
    #[serde(default = "driver_default_kind")]
    pub kind: DriverKind,
    #[serde(rename = "physicalAddress", default)]
    pub physical_address: Option<u16>,
    #[serde(rename = "remoteDevices", default)]
    pub remote_devices: Option<Vec<u8>>,
    #[serde(rename = "injectedFrames", default = "driver_default_injected_frames")]
    pub injected_frames: Vec<InjectedFrameConfiguration>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct SuiteSettings {
    #[serde(rename = "receiveTimeoutSecs", default = "suite_default_receive_timeout")]
    pub receive_timeout_secs: u64,
    #[serde(rename = "scenarioTimeoutSecs", default = "suite_default_scenario_timeout")]
    pub scenario_timeout_secs: u64,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct LoggingConfiguration {
    #[serde(default = "logging_default_enabled")]
    pub enabled: bool,
    #[serde(default = "logging_default_level")]
    #[serde(deserialize_with = "deserialize_level")]
    #[serde(serialize_with = "serialize_level")]
    pub level: log::LevelFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct SuiteConfiguration {
    #[serde(default)]
    pub device: DeviceProfile,
    #[serde(default)]
    pub driver: DriverConfiguration,
    #[serde(default)]
    pub suite: SuiteSettings,
    #[serde(default)]
    pub logging: LoggingConfiguration,
}

impl SuiteConfiguration {
    pub fn from_file(path: &str) -> Result<SuiteConfiguration, ConfigurationError> {
        let configuration = std::fs::read_to_string(path).map_err(ConfigurationError::Read)?;
        serde_json::from_str(configuration.as_str()).map_err(ConfigurationError::Parse)
    }
}

impl SuiteSettings {
    pub fn receive_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.receive_timeout_secs)
    }

    pub fn scenario_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.scenario_timeout_secs)
    }
}

impl std::default::Default for CECProfile {
    fn default() -> Self {
        CECProfile {
            device_type: cec_default_device_type(),
            extended_enum_supported: cec_default_extended_enum(),
        }
    }
}

impl std::default::Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile {
            name: device_default_name(),
            role: device_default_role(),
            cec: CECProfile::default(),
            sink_connected: device_default_sink_connected(),
        }
    }
}

impl std::default::Default for DriverConfiguration {
    fn default() -> Self {
        DriverConfiguration {
            kind: driver_default_kind(),
            physical_address: None,
            remote_devices: None,
            injected_frames: driver_default_injected_frames(),
        }
    }
}

impl std::default::Default for SuiteSettings {
    fn default() -> Self {
        SuiteSettings {
            receive_timeout_secs: suite_default_receive_timeout(),
            scenario_timeout_secs: suite_default_scenario_timeout(),
        }
    }
}

impl std::default::Default for LoggingConfiguration {
    fn default() -> Self {
        LoggingConfiguration {
            enabled: logging_default_enabled(),
            level: logging_default_level(),
            path: None,
        }
    }
}

fn cec_default_device_type() -> CECDeviceType {
    CECDeviceType::TV
}

fn cec_default_extended_enum() -> bool {
    true
}

fn device_default_name() -> String {
    String::from("hdmicec-dut")
}

fn device_default_role() -> DeviceRole {
    DeviceRole::Sink
}

fn device_default_sink_connected() -> bool {
    true
}

fn driver_default_kind() -> DriverKind {
    DriverKind::Emulated
}

// The TV gets an Image View On from a playback device shortly after subscribing
fn driver_default_injected_frames() -> Vec<InjectedFrameConfiguration> {
    vec![InjectedFrameConfiguration {
        delay_ms: 100,
        frame: vec![0x40, 0x04],
    }]
}

fn suite_default_receive_timeout() -> u64 {
    10
}

fn suite_default_scenario_timeout() -> u64 {
    30
}

fn logging_default_enabled() -> bool {
    true
}

fn logging_default_level() -> log::LevelFilter {
    log::LevelFilter::Warn
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<log::LevelFilter, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    match s.to_uppercase().as_str() {
        "OFF" => Ok(log::LevelFilter::Off),
        "ERROR" => Ok(log::LevelFilter::Error),
        "WARN" => Ok(log::LevelFilter::Warn),
        "INFO" => Ok(log::LevelFilter::Info),
        "DEBUG" => Ok(log::LevelFilter::Debug),
        "TRACE" => Ok(log::LevelFilter::Trace),
        _ => Err(serde::de::Error::custom(format!(
            "Invalid log level: {}",
            s
        ))),
    }
}

pub fn serialize_level<S>(level: &log::LevelFilter, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let level = format!("{}", level).to_uppercase();
    s.serialize_str(level.as_str())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_has_a_default_configuration() {
        let json = r#"{}"#;
        let configuration: SuiteConfiguration =
            serde_json::from_str(json).expect("Could not build a default configuration");

        assert_eq!(DeviceRole::Sink, configuration.device.role);
        assert_eq!(CECDeviceType::TV, configuration.device.cec.device_type);
        assert_eq!(DriverKind::Emulated, configuration.driver.kind);
        assert_eq!(
            std::time::Duration::from_secs(10),
            configuration.suite.receive_timeout()
        );
        assert_eq!(1, configuration.driver.injected_frames.len());
    }

    #[test]
    fn it_decodes_a_source_profile() {
        let json = r#"{
            "device": {
                "name": "box",
                "role": "source",
                "cec": { "deviceType": "PLAYBACK_DEVICE", "extendedEnumSupported": false },
                "sinkConnected": false
            },
            "driver": { "kind": "skeleton", "remoteDevices": [5], "injectedFrames": [] }
        }"#;
        let configuration: SuiteConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!("box", configuration.device.name);
        assert_eq!(DeviceRole::Source, configuration.device.role);
        assert_eq!(
            CECDeviceType::PlaybackDevice,
            configuration.device.cec.device_type
        );
        assert!(!configuration.device.cec.extended_enum_supported);
        assert!(!configuration.device.sink_connected);
        assert_eq!(DriverKind::Skeleton, configuration.driver.kind);
        assert_eq!(Some(vec![5]), configuration.driver.remote_devices);
        assert!(configuration.driver.injected_frames.is_empty());
    }

    #[test]
    fn it_rejects_unknown_roles() {
        let json = r#"{"device": {"role": "projector"}}"#;

        assert!(serde_json::from_str::<SuiteConfiguration>(json).is_err());
    }

    #[test]
    fn it_decodes_logging() {
        for (json_level, expected_level) in
            [("ERROR", log::Level::Error), ("INFO", log::Level::Info)]
        {
            let json = format!(r#"{{"enabled":true,"level":"{}"}}"#, json_level);
            let de_json =
                serde_json::from_str::<super::LoggingConfiguration>(json.as_str()).unwrap();

            assert_eq!(expected_level, de_json.level);

            let ser_json = serde_json::to_string(&de_json).unwrap();

            assert_eq!(json, ser_json);
        }
    }

    #[test]
    fn it_reports_missing_files() {
        match SuiteConfiguration::from_file("/does/not/exist.json") {
            Err(ConfigurationError::Read(_)) => (),
            other => panic!("Unexpected result {:?}", other),
        }
    }
}

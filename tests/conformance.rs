use hdmicec::configuration::SuiteConfiguration;
use hdmicec::SuiteReport;

/// This fixture builds the configuration of a device profile running on the emulated bus
struct TestFixture {
    configuration: SuiteConfiguration,
}

impl TestFixture {
    pub fn new(role: &str, device_type: &str, sink_connected: bool, extended: bool) -> Self {
        let configuration = format!(
            r#"{{
            "device": {{
                "name": "{role}-under-test",
                "role": "{role}",
                "cec": {{
                    "deviceType": "{device_type}",
                    "extendedEnumSupported": {extended}
                }},
                "sinkConnected": {sink_connected}
            }},
            "driver": {{
                "kind": "emulated",
                "injectedFrames": [ {{ "delayMs": 50, "frame": [64, 4] }} ]
            }},
            "suite": {{
                "receiveTimeoutSecs": 2,
                "scenarioTimeoutSecs": 10
            }},
            "logging": {{
                "level": "WARN"
            }}
        }}"#,
            role = role,
            device_type = device_type,
            sink_connected = sink_connected,
            extended = extended
        );
        let configuration: SuiteConfiguration =
            serde_json::from_str(configuration.as_str()).unwrap();

        TestFixture { configuration }
    }

    pub async fn run(&self, suite: Option<&str>) -> Vec<SuiteReport> {
        let filter = hdmicec::get_filter(suite, None).unwrap();
        hdmicec::run_conformance(&self.configuration, filter.as_ref()).await
    }
}

#[rstest::fixture]
fn fixture(
    #[default("sink")] role: &str,
    #[default("TV")] device_type: &str,
    #[default(true)] sink_connected: bool,
    #[default(true)] extended: bool,
) -> TestFixture {
    let _ = env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stdout)
        .try_init();
    TestFixture::new(role, device_type, sink_connected, extended)
}

fn suite_names(reports: &[SuiteReport]) -> Vec<&str> {
    reports.iter().map(|report| report.suite.as_str()).collect()
}

fn failures(reports: &[SuiteReport]) -> Vec<String> {
    reports
        .iter()
        .flat_map(|report| {
            report
                .results
                .iter()
                .filter(|(_, outcome)| *outcome != harness::ScenarioOutcome::Passed)
                .map(move |(name, outcome)| format!("{}::{}: {:?}", report.suite, name, outcome))
        })
        .collect()
}

#[rstest::rstest]
#[tokio::test]
async fn it_passes_every_suite_on_a_sink(fixture: TestFixture) {
    let reports = fixture.run(None).await;

    assert_eq!(vec!["L1", "L2", "L3"], suite_names(&reports));
    assert_eq!(Vec::<String>::new(), failures(&reports));
    assert!(hdmicec::all_passed(&reports));
}

#[rstest::rstest]
#[tokio::test]
async fn it_passes_every_suite_on_a_source(
    #[with("source", "PLAYBACK_DEVICE")] fixture: TestFixture,
) {
    let reports = fixture.run(None).await;

    assert_eq!(vec!["L1", "L2"], suite_names(&reports));
    assert_eq!(Vec::<String>::new(), failures(&reports));
    assert!(reports[1]
        .results
        .iter()
        .any(|(name, _)| name == "cec_version_exchange"));
}

#[rstest::rstest]
#[tokio::test]
async fn it_only_checks_open_on_a_source_without_sink(
    #[with("source", "RECORDING_DEVICE", false)] fixture: TestFixture,
) {
    let reports = fixture.run(None).await;

    assert_eq!(1, reports.len());
    assert_eq!(
        vec![(
            String::from("open_without_sink"),
            harness::ScenarioOutcome::Passed
        )],
        reports[0].results
    );
}

#[rstest::rstest]
#[tokio::test]
async fn it_accepts_drivers_without_extended_statuses(
    #[with("sink", "TV", true, false)] fixture: TestFixture,
) {
    let reports = fixture.run(Some("L1")).await;

    assert_eq!(vec!["L1"], suite_names(&reports));
    assert_eq!(Vec::<String>::new(), failures(&reports));
}

#[rstest::rstest]
#[tokio::test]
async fn it_reports_skeleton_failures(fixture: TestFixture) {
    let mut configuration = fixture.configuration.clone();
    configuration.driver.kind = hdmicec::configuration::DriverKind::Skeleton;
    let filter = hdmicec::get_filter(Some("L1"), Some("^open_close")).unwrap();

    let reports = hdmicec::run_conformance(&configuration, filter.as_ref()).await;

    // every call succeeds, so nothing rejects a second open
    assert_eq!(harness::ScenarioOutcome::Passed, reports[0].results[0].1);
    assert_eq!(1, reports[0].failed());
    assert!(!hdmicec::all_passed(&reports));
}

#[rstest::rstest]
#[tokio::test]
async fn it_receives_frames_from_an_injector(fixture: TestFixture) {
    let mut configuration = fixture.configuration.clone();
    configuration.driver.injected_frames.clear();
    let driver = hdmicec::cec::EmulatedCECDriver::builder().build();
    let injector = driver.get_injector();
    let driver: hdmicec::cec::SharedDriver = std::sync::Arc::new(std::sync::Mutex::new(driver));

    injector.inject(vec![0x40, 0x04], std::time::Duration::from_millis(500));
    let filter = hdmicec::get_filter(Some("L3"), None).unwrap();
    let reports = hdmicec::run_conformance_on(driver, &configuration, filter.as_ref()).await;

    assert_eq!(Vec::<String>::new(), failures(&reports));
    assert_eq!(1, reports[0].passed());
}

#[rstest::rstest]
#[tokio::test]
async fn it_fails_when_nothing_is_selected(fixture: TestFixture) {
    let reports = fixture.run(Some("L4")).await;

    assert!(reports.is_empty());
    assert!(!hdmicec::all_passed(&reports));
}

#[rstest::rstest]
#[tokio::test]
async fn it_only_reports_the_selected_suite(fixture: TestFixture) {
    let reports = fixture.run(Some("l2")).await;

    assert_eq!(vec!["L2"], suite_names(&reports));
    assert_eq!(Vec::<String>::new(), failures(&reports));
}

#[rstest::rstest]
fn it_lists_selected_scenarios(fixture: TestFixture) {
    let filter = hdmicec::get_filter(Some("l3"), None).unwrap();

    assert_eq!(
        vec![String::from("L3::receive_image_view_on")],
        hdmicec::list_scenarios(&fixture.configuration, filter.as_ref())
    );

    let filter = hdmicec::get_filter(None, Some("^tx_async")).unwrap();
    assert_eq!(
        vec![
            String::from("L1::tx_async_positive"),
            String::from("L1::tx_async_negative")
        ],
        hdmicec::list_scenarios(&fixture.configuration, filter.as_ref())
    );
}

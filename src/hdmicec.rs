pub mod cec;
pub mod configuration;
pub mod scenarios;

pub use harness::filter::{Filter, FilterBuilderError};
pub use harness::SuiteReport;

/// Builds the scenario filter from the optional suite name and scenario regex
pub fn get_filter(
    suite: Option<&str>,
    test: Option<&str>,
) -> Result<Box<dyn Filter>, FilterBuilderError> {
    let mut builder = harness::filter::builder();
    if let Some(suite) = suite {
        builder = builder.exact_suite(suite);
    }
    if let Some(test) = test {
        builder = builder.regex_name(test);
    }
    builder.build()
}

/// Names of the scenarios that would run for this configuration, as `suite::scenario`
pub fn list_scenarios(
    configuration: &configuration::SuiteConfiguration,
    filter: &dyn Filter,
) -> Vec<String> {
    scenarios::get_suites(configuration)
        .iter()
        .flat_map(|suite| {
            suite
                .get_scenario_names(filter)
                .into_iter()
                .map(move |name| format!("{}::{}", suite.get_name(), name))
        })
        .collect()
}

/// Runs the conformance suites against the driver selected by the configuration
pub async fn run_conformance(
    configuration: &configuration::SuiteConfiguration,
    filter: &dyn Filter,
) -> Vec<SuiteReport> {
    let driver = cec::get_cec_driver(configuration);
    run_conformance_on(driver, configuration, filter).await
}

/// Runs the conformance suites against a driver built by the caller
pub async fn run_conformance_on(
    driver: cec::SharedDriver,
    configuration: &configuration::SuiteConfiguration,
    filter: &dyn Filter,
) -> Vec<SuiteReport> {
    log::info!(
        "Running conformance suites for {} ({:?})",
        configuration.device.name,
        configuration.device.role
    );
    let suites = scenarios::get_suites(configuration);
    let context = scenarios::ConformanceContext::new(driver, configuration);
    harness::run_suites(&suites, &context, filter).await
}

pub fn all_passed(reports: &[SuiteReport]) -> bool {
    harness::all_passed(reports)
}

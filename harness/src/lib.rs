pub use self::report::*;
pub use self::suite::*;
pub mod filter;
pub mod report;
pub mod suite;

/// Runs every suite in order with the same context, and returns one report per suite with at
/// least one scenario selected by the filter
pub async fn run_suites<C>(
    suites: &[Suite<C>],
    context: &C,
    filter: &dyn filter::Filter,
) -> Vec<SuiteReport>
where
    C: Sync,
{
    let mut reports = Vec::with_capacity(suites.len());
    for suite in suites.iter() {
        if suite.get_scenario_names(filter).is_empty() {
            log::debug!("No scenario selected in suite {}", suite.get_name());
            continue;
        }
        let report = suite.run(context, filter).await;
        report.log_summary();
        reports.push(report);
    }
    reports
}

/// Returns true if at least one scenario ran, and none failed or was skipped
pub fn all_passed(reports: &[SuiteReport]) -> bool {
    reports.iter().any(|report| !report.results.is_empty())
        && reports.iter().all(|report| report.is_success())
}

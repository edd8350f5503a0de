use crate::suite::ScenarioError;

#[derive(Debug, PartialEq)]
pub enum ScenarioOutcome {
    Passed,
    Failed(ScenarioError),
    Skipped,
}

/// Outcome of every scenario run by a [crate::suite::Suite], in execution order
#[derive(Debug)]
pub struct SuiteReport {
    pub suite: String,
    pub results: Vec<(String, ScenarioOutcome)>,
}

impl SuiteReport {
    pub fn new(suite: &str) -> SuiteReport {
        SuiteReport {
            suite: String::from(suite),
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, scenario: &str, outcome: ScenarioOutcome) {
        self.results.push((String::from(scenario), outcome));
    }

    pub fn passed(&self) -> usize {
        self.count(|outcome| *outcome == ScenarioOutcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, ScenarioOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| *outcome == ScenarioOutcome::Skipped)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }

    pub fn log_summary(&self) {
        for (scenario, outcome) in self.results.iter() {
            match outcome {
                ScenarioOutcome::Passed => log::info!("[PASS] {}::{}", self.suite, scenario),
                ScenarioOutcome::Failed(e) => {
                    log::error!("[FAIL] {}::{}: {}", self.suite, scenario, e)
                }
                ScenarioOutcome::Skipped => log::warn!("[SKIP] {}::{}", self.suite, scenario),
            }
        }
        log::info!(
            "Suite {}: {} passed, {} failed, {} skipped",
            self.suite,
            self.passed(),
            self.failed(),
            self.skipped()
        );
    }

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&ScenarioOutcome) -> bool,
    {
        self.results
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::{ScenarioOutcome, SuiteReport};

    #[test]
    fn it_counts_outcomes() {
        let mut report = SuiteReport::new("L1");
        report.add("open_close", ScenarioOutcome::Passed);
        report.add(
            "tx",
            ScenarioOutcome::Failed(crate::ScenarioError::Recoverable(String::from("nack"))),
        );
        report.add("tx_async", ScenarioOutcome::Skipped);

        assert_eq!(1, report.passed());
        assert_eq!(1, report.failed());
        assert_eq!(1, report.skipped());
        assert!(!report.is_success());
    }

    #[test]
    fn it_succeeds_when_empty() {
        assert!(SuiteReport::new("L3").is_success());
    }
}

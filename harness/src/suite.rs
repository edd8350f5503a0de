use futures::FutureExt;

use crate::report::{ScenarioOutcome, SuiteReport};

pub use self::ScenarioError::*;

#[async_trait::async_trait]
pub trait Scenario<C>: Sync + Send
where
    C: Sync,
{
    fn get_name(&self) -> &str;
    async fn run(&self, context: &C) -> Result<(), ScenarioError>;
    fn get_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }
}

/// Why a scenario did not pass
///
/// A [Fatal] error means the component under test is left in an unknown state, so the remaining
/// scenarios of the suite are skipped. A [Recoverable] error only fails the current scenario.
#[derive(Debug, PartialEq)]
pub enum ScenarioError {
    Fatal(String),
    Recoverable(String),
    TimedOut,
    Panicked(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fatal(msg) => write!(f, "fatal: {}", msg),
            Recoverable(msg) => write!(f, "{}", msg),
            TimedOut => write!(f, "scenario timed out"),
            Panicked(msg) => write!(f, "scenario panicked: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Scenario made of a single synchronous function
pub struct FnScenario<C> {
    name: String,
    function: fn(&C) -> Result<(), ScenarioError>,
}

pub fn from_fn<C>(name: &str, function: fn(&C) -> Result<(), ScenarioError>) -> Box<dyn Scenario<C>>
where
    C: Sync + 'static,
{
    Box::new(FnScenario {
        name: String::from(name),
        function,
    })
}

#[async_trait::async_trait]
impl<C> Scenario<C> for FnScenario<C>
where
    C: Sync + 'static,
{
    fn get_name(&self) -> &str {
        &self.name
    }

    async fn run(&self, context: &C) -> Result<(), ScenarioError> {
        (self.function)(context)
    }
}

pub struct Suite<C>
where
    C: Sync,
{
    name: String,
    scenarios: Vec<Box<dyn Scenario<C>>>,
    timeout: Option<std::time::Duration>,
}

impl<C> Suite<C>
where
    C: Sync,
{
    pub fn new<T>(name: T) -> Suite<C>
    where
        T: Into<String>,
    {
        Suite {
            name: name.into(),
            scenarios: Vec::new(),
            timeout: None,
        }
    }

    /// Overrides the timeout of every scenario of the suite
    pub fn set_timeout(&mut self, timeout: std::time::Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn add_scenario(&mut self, scenario: Box<dyn Scenario<C>>) -> &mut Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn add_scenarios<T>(&mut self, scenarios: T) -> &mut Self
    where
        T: IntoIterator<Item = Box<dyn Scenario<C>>>,
    {
        for scenario in scenarios {
            self.scenarios.push(scenario);
        }
        self
    }

    /// Names of the scenarios selected by the filter, in registration order
    pub fn get_scenario_names(&self, filter: &dyn crate::filter::Filter) -> Vec<String> {
        self.scenarios
            .iter()
            .filter(|scenario| filter.matches(&self.name, scenario.get_name()))
            .map(|scenario| String::from(scenario.get_name()))
            .collect()
    }

    async fn run_scenario(
        &self,
        scenario: &dyn Scenario<C>,
        context: &C,
    ) -> Result<(), ScenarioError> {
        let run = std::panic::AssertUnwindSafe(scenario.run(context)).catch_unwind();
        let timeout = self.timeout.unwrap_or_else(|| scenario.get_timeout());
        match async_std::future::timeout(timeout, run).await {
            Err(_) => Err(TimedOut),
            Ok(Err(panic)) => Err(Panicked(panic_message(panic.as_ref()))),
            Ok(Ok(result)) => result,
        }
    }

    pub async fn run(&self, context: &C, filter: &dyn crate::filter::Filter) -> SuiteReport {
        let mut report = SuiteReport::new(self.name.as_str());
        let mut aborted = false;
        for scenario in self
            .scenarios
            .iter()
            .filter(|scenario| filter.matches(&self.name, scenario.get_name()))
        {
            let name = scenario.get_name();
            if aborted {
                log::warn!("Skipping {}::{} after a fatal error", self.name, name);
                report.add(name, ScenarioOutcome::Skipped);
                continue;
            }
            log::info!("Running {}::{}", self.name, name);
            let outcome = match self.run_scenario(scenario.as_ref(), context).await {
                Ok(()) => {
                    log::info!("{}::{} passed", self.name, name);
                    ScenarioOutcome::Passed
                }
                Err(error) => {
                    if let Fatal(_) = &error {
                        log::error!("{}::{} failed: {}", self.name, name, error);
                        aborted = true;
                    } else {
                        log::warn!("{}::{} failed: {}", self.name, name, error);
                    }
                    ScenarioOutcome::Failed(error)
                }
            };
            report.add(name, outcome);
        }
        report
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        String::from(*msg)
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.to_owned()
    } else {
        String::from("unknown panic payload")
    }
}

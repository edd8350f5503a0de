/// Trait to implement to be able to tell whether a [crate::suite::Scenario] should run or not
pub trait Filter: Sync + Send {
    fn matches(&self, suite: &str, scenario: &str) -> bool;
}

#[derive(Debug)]
pub enum FilterBuilderError {
    IncorrectSuite,
    IncorrectName(String),
}

impl std::fmt::Display for FilterBuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterBuilderError::IncorrectSuite => write!(f, "suite name can not be empty"),
            FilterBuilderError::IncorrectName(e) => write!(f, "invalid scenario filter: {}", e),
        }
    }
}

impl std::error::Error for FilterBuilderError {}

enum SuiteFilter {
    All,
    Exact(String),
}

enum NameFilter {
    All,
    Regex(regex::Regex),
}

struct FilterImpl {
    suite_filter: SuiteFilter,
    name_filter: NameFilter,
}

impl Filter for FilterImpl {
    fn matches(&self, suite: &str, scenario: &str) -> bool {
        let suite_match = match &self.suite_filter {
            SuiteFilter::All => true,
            SuiteFilter::Exact(name) => name.eq_ignore_ascii_case(suite),
        };

        suite_match
            && match &self.name_filter {
                NameFilter::All => true,
                NameFilter::Regex(re) => re.is_match(scenario),
            }
    }
}

pub struct FilterBuilder {
    suite_filter: Option<SuiteFilter>,
    name_filter: Result<NameFilter, FilterBuilderError>,
}

pub fn builder() -> FilterBuilder {
    FilterBuilder::new()
}

impl FilterBuilder {
    fn new() -> FilterBuilder {
        FilterBuilder {
            suite_filter: Some(SuiteFilter::All),
            name_filter: Ok(NameFilter::All),
        }
    }

    pub fn exact_suite<T>(mut self, suite: T) -> FilterBuilder
    where
        T: Into<String>,
    {
        let suite: String = suite.into();
        self.suite_filter = if suite.is_empty() {
            None
        } else {
            Some(SuiteFilter::Exact(suite))
        };
        self
    }

    pub fn regex_name(mut self, regex: &str) -> FilterBuilder {
        self.name_filter = regex::Regex::new(regex)
            .map(NameFilter::Regex)
            .map_err(|e| FilterBuilderError::IncorrectName(format!("{}", e)));
        self
    }

    pub fn build(self) -> Result<Box<dyn Filter>, FilterBuilderError> {
        match self.suite_filter {
            None => Err(FilterBuilderError::IncorrectSuite),
            Some(suite_filter) => Ok(Box::new(FilterImpl {
                suite_filter,
                name_filter: self.name_filter?,
            })),
        }
    }
}

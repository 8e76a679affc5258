use std::fmt;
use std::future::Future;

use anyhow::Result;
use log::debug;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// A deployed function as returned by the function listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSummary {
    pub name: String,
    pub runtime: String,
}

/// One table row: function, runtime label, invocation count.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct InvocationRow {
    #[tabled(rename = "Function")]
    pub function: String,
    #[tabled(rename = "Type")]
    pub runtime: String,
    #[tabled(rename = "Invocations")]
    pub invocations: f64,
}

/// Lambda and CloudWatch calls scoped to one region.
pub trait RegionApi: Send + Sync {
    /// Every function deployed in the region, in listing order.
    fn list_functions(&self) -> impl Future<Output = Result<Vec<FunctionSummary>>> + Send;

    /// Datapoints of the invocation metric, one inner vec per returned series.
    fn invocation_series(
        &self,
        function_name: &str,
    ) -> impl Future<Output = Result<Vec<Vec<f64>>>> + Send;
}

/// Opens a [`RegionApi`] for a region, resolving credentials on the way.
pub trait Connector: Send + Sync + 'static {
    type Api: RegionApi;

    fn connect(&self, region: &str) -> impl Future<Output = Result<Self::Api>> + Send;
}

/// Why a region has no function list.
///
/// `Display` gives the short message; [`RegionError::detail`] gives the full
/// cause chain, which is only shown in debug mode.
#[derive(Debug)]
pub enum RegionError {
    Session(anyhow::Error),
    Listing(anyhow::Error),
    Task(anyhow::Error),
}

impl RegionError {
    fn cause(&self) -> &anyhow::Error {
        match self {
            Self::Session(e) | Self::Listing(e) | Self::Task(e) => e,
        }
    }

    pub fn detail(&self) -> String {
        format!("{:#}", self.cause())
    }
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(_) => write!(f, "credentials unavailable"),
            Self::Listing(_) => write!(f, "function listing failed"),
            Self::Task(_) => write!(f, "region task aborted"),
        }
    }
}

impl std::error::Error for RegionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&**self.cause())
    }
}

/// A metric fetch that failed and cut the region's table short.
#[derive(Debug)]
pub struct MetricsFailure {
    pub function: String,
    pub source: anyhow::Error,
}

impl MetricsFailure {
    pub fn detail(&self) -> String {
        format!("{:#}", self.source)
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// No function list could be obtained.
    Unavailable(RegionError),
    /// Functions were listed; `failure` is set when a metric fetch cut the rows short.
    Listed {
        function_count: usize,
        rows: Vec<InvocationRow>,
        failure: Option<MetricsFailure>,
    },
}

impl Outcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Listed { failure: None, .. })
    }
}

/// Result of reporting on a single region.
#[derive(Debug)]
pub struct RegionReport {
    pub region: String,
    pub outcome: Outcome,
}

impl RegionReport {
    pub fn unavailable(region: &str, err: RegionError) -> Self {
        Self {
            region: region.to_string(),
            outcome: Outcome::Unavailable(err),
        }
    }

    /// Render as a text block terminated by a blank line.
    pub fn render(&self, debug: bool) -> String {
        let mut out = String::new();

        match &self.outcome {
            Outcome::Unavailable(err) => {
                out.push_str(&format!("Could not get lambdas in {} ({err})\n", self.region));
                push_detail(&mut out, &err.detail(), debug);
            }
            Outcome::Listed {
                function_count,
                rows,
                failure,
            } => {
                out.push_str(&format!(
                    "{function_count} Lambda functions found in {}\n",
                    self.region
                ));
                if !rows.is_empty() {
                    out.push_str(&render_table(rows));
                    out.push('\n');
                }
                if let Some(failure) = failure {
                    out.push_str(&format!(
                        "Could not get metrics for {} in {}\n",
                        failure.function, self.region
                    ));
                    push_detail(&mut out, &failure.detail(), debug);
                }
            }
        }

        out.push('\n');
        out
    }
}

fn push_detail(out: &mut String, detail: &str, debug: bool) {
    if debug {
        out.push_str(detail);
        out.push('\n');
    }
}

fn render_table(rows: &[InvocationRow]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::ascii());
    table.to_string()
}

/// First datapoint of the first series, or zero when there is none.
pub fn invocation_count(series: &[Vec<f64>]) -> f64 {
    series
        .first()
        .and_then(|values| values.first())
        .copied()
        .unwrap_or(0.0)
}

/// Build the report for one region.
///
/// Never fails: session, listing and metric errors are captured in the
/// returned report. Metric fetches run one function at a time in listing
/// order and stop at the first failure.
pub async fn report_region<C: Connector>(connector: &C, region: &str) -> RegionReport {
    let outcome = match connector.connect(region).await {
        Ok(api) => collect(&api, region).await,
        Err(e) => Outcome::Unavailable(RegionError::Session(e)),
    };

    // The rendered report carries the failure; stderr only gets it in debug.
    match &outcome {
        Outcome::Unavailable(err) => debug!("{region}: {err}: {}", err.detail()),
        Outcome::Listed {
            failure: Some(failure),
            ..
        } => debug!("{region}: {}: {}", failure.function, failure.detail()),
        Outcome::Listed { .. } => {}
    }

    RegionReport {
        region: region.to_string(),
        outcome,
    }
}

async fn collect<A: RegionApi>(api: &A, region: &str) -> Outcome {
    debug!("listing functions in {region}");
    let functions = match api.list_functions().await {
        Ok(functions) => functions,
        Err(e) => return Outcome::Unavailable(RegionError::Listing(e)),
    };
    debug!("{} functions in {region}", functions.len());

    let mut rows = Vec::with_capacity(functions.len());
    let mut failure = None;

    for function in &functions {
        match api.invocation_series(&function.name).await {
            Ok(series) => rows.push(InvocationRow {
                function: function.name.clone(),
                runtime: function.runtime.clone(),
                invocations: invocation_count(&series),
            }),
            Err(source) => {
                failure = Some(MetricsFailure {
                    function: function.name.clone(),
                    source,
                });
                break;
            }
        }
    }

    Outcome::Listed {
        function_count: functions.len(),
        rows,
        failure,
    }
}

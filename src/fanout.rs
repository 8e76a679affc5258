use std::sync::Arc;

use futures::future;
use log::info;

use crate::report::{report_region, Connector, RegionError, RegionReport};

/// Reports for every requested region, in the order they were requested.
#[derive(Debug)]
pub struct AggregateReport {
    reports: Vec<RegionReport>,
}

impl AggregateReport {
    #[cfg(test)]
    pub fn reports(&self) -> &[RegionReport] {
        &self.reports
    }

    pub fn render(&self, debug: bool) -> String {
        self.reports.iter().map(|r| r.render(debug)).collect()
    }
}

/// Report on all `regions` in parallel, one task per region.
///
/// Handles are joined in the order of `regions`, so output order does not
/// depend on which region finishes first. A task that panics still yields an
/// entry for its region.
pub async fn report_all<C: Connector>(connector: Arc<C>, regions: &[&str]) -> AggregateReport {
    let handles: Vec<_> = regions
        .iter()
        .map(|region| {
            let connector = Arc::clone(&connector);
            let region = (*region).to_string();
            tokio::spawn(async move { report_region(connector.as_ref(), &region).await })
        })
        .collect();

    let reports: Vec<RegionReport> = future::join_all(handles)
        .await
        .into_iter()
        .zip(regions)
        .map(|(joined, region)| {
            joined.unwrap_or_else(|e| RegionReport::unavailable(region, RegionError::Task(e.into())))
        })
        .collect();

    let failed = reports.iter().filter(|r| !r.outcome.is_complete()).count();
    info!("{} regions reported, {failed} with errors", reports.len());

    AggregateReport { reports }
}

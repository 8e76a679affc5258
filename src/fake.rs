//! In-memory [`Connector`] for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::report::{Connector, FunctionSummary, RegionApi};

#[derive(Debug, Clone)]
pub struct FakeRegion {
    session: std::result::Result<(), String>,
    listing: std::result::Result<Vec<FunctionSummary>, String>,
    series: HashMap<String, std::result::Result<Vec<Vec<f64>>, String>>,
    latency: Duration,
}

impl FakeRegion {
    pub fn with_functions(functions: &[(&str, &str)]) -> Self {
        Self {
            session: Ok(()),
            listing: Ok(functions
                .iter()
                .map(|(name, runtime)| FunctionSummary {
                    name: (*name).to_string(),
                    runtime: (*runtime).to_string(),
                })
                .collect()),
            series: HashMap::new(),
            latency: Duration::ZERO,
        }
    }

    pub fn failing_listing(msg: &str) -> Self {
        Self {
            listing: Err(msg.to_string()),
            ..Self::with_functions(&[])
        }
    }

    pub fn failing_session(msg: &str) -> Self {
        Self {
            session: Err(msg.to_string()),
            ..Self::with_functions(&[])
        }
    }

    pub fn series(mut self, function: &str, values: Vec<Vec<f64>>) -> Self {
        self.series.insert(function.to_string(), Ok(values));
        self
    }

    pub fn failing_metrics(mut self, function: &str, msg: &str) -> Self {
        self.series.insert(function.to_string(), Err(msg.to_string()));
        self
    }

    /// Delay applied before the listing call returns.
    pub fn latency(mut self, millis: u64) -> Self {
        self.latency = Duration::from_millis(millis);
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeCloud {
    regions: HashMap<String, FakeRegion>,
    queried: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: &str, data: FakeRegion) -> Self {
        self.regions.insert(region.to_string(), data);
        self
    }

    /// Functions whose metrics were requested in `region`, in call order.
    pub fn queried(&self, region: &str) -> Vec<String> {
        self.queried
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|(r, _)| r == region)
                    .map(|(_, function)| function.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub struct FakeApi {
    region: String,
    data: FakeRegion,
    queried: Arc<Mutex<Vec<(String, String)>>>,
}

impl Connector for FakeCloud {
    type Api = FakeApi;

    async fn connect(&self, region: &str) -> Result<FakeApi> {
        let data = self
            .regions
            .get(region)
            .cloned()
            .ok_or_else(|| anyhow!("unknown region {region}"))?;
        data.session.clone().map_err(|msg| anyhow!(msg))?;

        Ok(FakeApi {
            region: region.to_string(),
            data,
            queried: Arc::clone(&self.queried),
        })
    }
}

impl RegionApi for FakeApi {
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>> {
        tokio::time::sleep(self.data.latency).await;
        self.data.listing.clone().map_err(|msg| anyhow!(msg))
    }

    async fn invocation_series(&self, function_name: &str) -> Result<Vec<Vec<f64>>> {
        if let Ok(mut calls) = self.queried.lock() {
            calls.push((self.region.clone(), function_name.to_string()));
        }
        match self.data.series.get(function_name) {
            Some(Ok(series)) => Ok(series.clone()),
            Some(Err(msg)) => Err(anyhow!(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}

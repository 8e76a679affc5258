// src/aws_client.rs

use anyhow::{Context, Result};
use aws_config::ecs::EcsCredentialsProvider;
use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::SdkConfig;
use aws_credential_types::provider::ProvideCredentials;
use aws_runtime::env_config::file::EnvConfigFiles;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Dimension, Metric, MetricDataQuery, MetricStat, StandardUnit};
use chrono::{Duration, Utc};
use log::debug;

use crate::report::{Connector, FunctionSummary, RegionApi};

/// Length of the trailing window the invocation counts cover.
pub const WINDOW_DAYS: i64 = 28;

const PERIOD_SECONDS: i32 = (WINDOW_DAYS * 86_400) as i32;

/// Where credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Named profile from the shared config/credentials files, falling back
    /// to container and instance-metadata credentials.
    Profile(String),
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`.
    Environment,
}

/// Load the SDK config for `region` and make sure credentials resolve.
///
/// The credentials provider is queried once up front so that a missing
/// profile or unset environment surfaces here, not on the first API call.
pub async fn connect(
    region: &str,
    source: &CredentialSource,
    profile_files: &EnvConfigFiles,
) -> Result<SdkConfig> {
    let loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    let loader = match source {
        CredentialSource::Profile(name) => {
            let profile = ProfileFileCredentialsProvider::builder()
                .profile_files(profile_files.clone())
                .profile_name(name)
                .build();
            let provider = CredentialsProviderChain::first_try("Profile", profile)
                .or_else("EcsContainer", EcsCredentialsProvider::builder().build())
                .or_else(
                    "Ec2InstanceMetadata",
                    ImdsCredentialsProvider::builder().build(),
                );
            loader
                .profile_files(profile_files.clone())
                .profile_name(name)
                .credentials_provider(provider)
        }
        CredentialSource::Environment => {
            loader.credentials_provider(EnvironmentVariableCredentialsProvider::new())
        }
    };

    let config = loader.load().await;

    let provider = config
        .credentials_provider()
        .with_context(|| format!("no credentials provider configured for {region}"))?;
    provider
        .provide_credentials()
        .await
        .with_context(|| match source {
            CredentialSource::Profile(name) => {
                format!("failed to load credentials from profile {name}")
            }
            CredentialSource::Environment => {
                "failed to load credentials from environment".to_string()
            }
        })?;

    debug!("credentials resolved for {region}");
    Ok(config)
}

/// Opens Lambda and CloudWatch clients per region.
#[derive(Debug, Clone)]
pub struct AwsConnector {
    source: CredentialSource,
    profile_files: EnvConfigFiles,
}

impl AwsConnector {
    pub fn new(source: CredentialSource) -> Self {
        Self {
            source,
            profile_files: EnvConfigFiles::default(),
        }
    }

    #[cfg(test)]
    fn with_profile_files(source: CredentialSource, profile_files: EnvConfigFiles) -> Self {
        Self {
            source,
            profile_files,
        }
    }
}

impl Connector for AwsConnector {
    type Api = RegionClients;

    async fn connect(&self, region: &str) -> Result<RegionClients> {
        let config = connect(region, &self.source, &self.profile_files).await?;
        Ok(RegionClients::new(&config))
    }
}

pub struct RegionClients {
    lambda: aws_sdk_lambda::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
}

impl RegionClients {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            lambda: aws_sdk_lambda::Client::new(config),
            cloudwatch: aws_sdk_cloudwatch::Client::new(config),
        }
    }
}

impl RegionApi for RegionClients {
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>> {
        let mut result = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut req = self.lambda.list_functions();
            if let Some(ref m) = marker {
                req = req.marker(m);
            }

            let resp = req.send().await.context("failed to list functions")?;

            for function in resp.functions() {
                if let Some(name) = function.function_name() {
                    result.push(FunctionSummary {
                        name: name.to_string(),
                        runtime: function.runtime().map_or("-", |r| r.as_str()).to_string(),
                    });
                }
            }

            match resp.next_marker() {
                Some(m) if !m.is_empty() => {
                    marker = Some(m.to_string());
                }
                _ => break,
            }
        }

        Ok(result)
    }

    async fn invocation_series(&self, function_name: &str) -> Result<Vec<Vec<f64>>> {
        let end = Utc::now();
        let start = end - Duration::days(WINDOW_DAYS);

        let resp = self
            .cloudwatch
            .get_metric_data()
            .metric_data_queries(invocations_query(function_name))
            .start_time(DateTime::from_secs(start.timestamp()))
            .end_time(DateTime::from_secs(end.timestamp()))
            .send()
            .await
            .with_context(|| format!("failed to get metric data for {function_name}"))?;

        Ok(resp
            .metric_data_results()
            .iter()
            .map(|series| series.values().to_vec())
            .collect())
    }
}

/// Summed `Invocations` of one function over the whole window, as a single period.
fn invocations_query(function_name: &str) -> MetricDataQuery {
    let dimension = Dimension::builder()
        .name("FunctionName")
        .value(function_name)
        .build();

    let metric = Metric::builder()
        .namespace("AWS/Lambda")
        .metric_name("Invocations")
        .dimensions(dimension)
        .build();

    let stat = MetricStat::builder()
        .metric(metric)
        .period(PERIOD_SECONDS)
        .stat("Sum")
        .unit(StandardUnit::Count)
        .build();

    MetricDataQuery::builder()
        .id("invocations")
        .metric_stat(stat)
        .build()
}

use clap::Parser;

use crate::aws_client::CredentialSource;
use crate::regions::{ALL, DEFAULT_REGION};

/**
Lambda invocation counts per AWS region.
*/
#[derive(Debug, Parser)]
#[command(name = "lambda-invocations")]
#[command(
    version,
    about = "List the number of invocations per AWS lambda in a region",
    long_about = None
)]
pub struct Cli {
    /// AWS credentials profile name.
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    /// Use environment vars for credentials.
    #[arg(short, long)]
    pub env: bool,

    /// AWS region (e.g. us-east-1). Use "all" for all regions.
    #[arg(short, long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Show error details and debug logs.
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    pub fn credential_source(&self) -> CredentialSource {
        if self.env {
            CredentialSource::Environment
        } else {
            CredentialSource::Profile(self.profile.clone())
        }
    }

    pub fn all_regions(&self) -> bool {
        self.region == ALL
    }
}

mod aws_client;
mod cli;
#[cfg(test)]
mod fake;
mod fanout;
mod regions;
mod report;

use std::sync::Arc;

use anyhow::Result;
use aws_client::{AwsConnector, WINDOW_DAYS};
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let connector = AwsConnector::new(args.credential_source());

    let title = format!("Lambda invocation stats for last {WINDOW_DAYS} days");
    println!("{title}");
    println!("{}", "-".repeat(title.len()));
    println!();

    let output = if args.all_regions() {
        // Every region in parallel, printed in catalog order.
        fanout::report_all(Arc::new(connector), regions::REGIONS)
            .await
            .render(args.debug)
    } else {
        report::report_region(&connector, &args.region)
            .await
            .render(args.debug)
    };
    print!("{output}");

    Ok(())
}

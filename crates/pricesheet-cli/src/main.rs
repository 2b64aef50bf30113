mod cli;
mod error;
mod logging;
mod prompt;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use pricesheet_core::{pipeline, FixtureSource, MarketDataSource, SourceConfig, YahooAdapter};
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let query = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        prompt::gather_query(cli.company, cli.start, cli.end, &mut input, &mut output)?
    };

    let source: Box<dyn MarketDataSource> = if cli.mock {
        Box::new(FixtureSource::default())
    } else {
        let config = SourceConfig::from_env().with_timeout_ms(cli.timeout_ms);
        Box::new(YahooAdapter::new(config)?)
    };
    debug!(source = source.name(), range = %query.range(), "starting run");

    let report = pipeline::run(source.as_ref(), &query, &cli.output_dir).await?;
    println!("{report}");

    Ok(())
}

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, error::ErrorKind};
use curlit::{Client, Url};
use log::info;

/// Fetch a URL over HTTP/1.0 and write its body to standard output.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// URL to fetch, e.g. http://example.com:8080/index.html
    url: String,
}

fn main() -> ExitCode {
    curlit::init_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<curlit::Error>() {
                // Already summed up by the metric lines; keep stderr to those.
                Some(curlit::Error::ProtocolStatus(_) | curlit::Error::LengthMismatch { .. }) => {
                    info!("{err:#}")
                }
                _ => eprintln!("curlit: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let url = Url::parse(&args.url).with_context(|| format!("invalid URL {:?}", args.url))?;

    let mut stdout = io::stdout().lock();
    Client::new().fetch(&url, &mut stdout, io::stderr().lock())?;
    stdout.flush().context("failed to flush standard output")?;
    Ok(())
}

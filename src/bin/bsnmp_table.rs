//! bsnmp-table: read a conceptual table from an SNMP v1/v2c agent.

use basic_snmp::cli::args::{CommonArgs, LayoutArgs, OutputArgs};
use basic_snmp::cli::output::{OutputContext, write_error};
use basic_snmp::{Client, Error, Oid, WalkFailure};
use clap::Parser;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Walk a table with GetNext and print it row by row.
#[derive(Debug, Parser)]
#[command(name = "bsnmp-table", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Give up on the walk after this many seconds.
    #[arg(long = "max-time", value_name = "SECONDS")]
    max_time: Option<f64>,

    /// Table entry OID (the column arcs follow it).
    #[arg(value_name = "BASE_OID")]
    base: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let base = match Oid::parse(&args.base) {
        Ok(oid) => oid,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };
    let layout = match args.layout.layout() {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match Client::connect(&args.common.target, args.common.client_config()).await {
        Ok(client) => client,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    if let Some(limit) = args.max_time.and_then(|s| Duration::try_from_secs_f64(s).ok()) {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            token.cancel();
        });
    }

    let start = Instant::now();
    let result = client
        .discover_table_with_cancel(base, layout, &cancel)
        .await;
    let elapsed = start.elapsed();

    match result {
        Ok(table) => {
            let ctx = OutputContext {
                format: args.output.format,
                force_hex: args.output.hex,
                show_timing: args.output.timing,
            };
            let timing = args.output.timing.then_some(elapsed);
            if let Err(e) = ctx.write_table(client.peer_addr(), &table, timing) {
                eprintln!("Error writing output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(Error::WalkFailed {
            reason: WalkFailure::Cancelled,
            ..
        }) => {
            eprintln!("Error: walk exceeded --max-time");
            ExitCode::FAILURE
        }
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}

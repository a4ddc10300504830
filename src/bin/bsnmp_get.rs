//! bsnmp-get: fetch objects from an SNMP v1/v2c agent.

use basic_snmp::cli::args::{CommonArgs, OutputArgs};
use basic_snmp::cli::output::{OutputContext, write_error, write_verbose_varbinds};
use basic_snmp::{Client, Oid, UdpClient, VarBind};
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;

/// Fetch one or more objects, or the objects following them with --next.
#[derive(Debug, Parser)]
#[command(name = "bsnmp-get", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Send GetNext instead of Get.
    #[arg(short = 'n', long)]
    next: bool,

    /// OIDs in dotted notation.
    #[arg(required = true, value_name = "OID")]
    oids: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let oids: Vec<Oid> = match args.oids.iter().map(|s| Oid::parse(s)).collect() {
        Ok(oids) => oids,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let client = match connect(&args).await {
        Ok(client) => client,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let result = if args.next {
        get_next_all(&client, &oids).await
    } else {
        client.get_many(&oids).await
    };
    let elapsed = start.elapsed();

    match result {
        Ok(varbinds) => {
            if args.output.verbose {
                write_verbose_varbinds(&varbinds);
            }

            let ctx = OutputContext {
                format: args.output.format,
                force_hex: args.output.hex,
                show_timing: args.output.timing,
            };
            let timing = args.output.timing.then_some(elapsed);
            if let Err(e) = ctx.write_results(
                client.peer_addr(),
                client.config().version,
                &varbinds,
                timing,
            ) {
                eprintln!("Error writing output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn connect(args: &Args) -> basic_snmp::Result<UdpClient> {
    Client::connect(&args.common.target, args.common.client_config()).await
}

async fn get_next_all(
    client: &UdpClient,
    oids: &[Oid],
) -> basic_snmp::Result<Vec<VarBind>> {
    let mut varbinds = Vec::with_capacity(oids.len());
    for oid in oids {
        varbinds.push(client.get_next(oid).await?);
    }
    Ok(varbinds)
}

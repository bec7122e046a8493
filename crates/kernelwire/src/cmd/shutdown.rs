use std::time::Instant;

use kernelwire_client::ShutdownReply;
use tracing::info;

use crate::cmd::{connect, ShutdownArgs};
use crate::exit::{client_error, protocol_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat, ReplyView};

pub fn run(args: ShutdownArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(&args.connect)?;

    let start = Instant::now();
    let reply = client
        .shutdown(args.restart)
        .map_err(|err| client_error("shutdown_request failed", err))?;
    let elapsed = start.elapsed();

    let content: ShutdownReply = reply
        .content_as()
        .map_err(|err| protocol_error("malformed shutdown_reply", err))?;
    info!(restart = content.restart, status = %content.status, "kernel acknowledged shutdown");

    let view = ReplyView {
        title: "Shutdown",
        columns: ["FIELD", "VALUE"],
        rows: vec![
            ["status".into(), content.status.to_string()],
            ["restart".into(), content.restart.to_string()],
        ],
    };
    print_reply(&reply, elapsed, &view, format);
    Ok(SUCCESS)
}

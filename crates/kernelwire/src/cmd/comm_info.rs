use std::time::Instant;

use kernelwire_client::CommInfoReply;
use kernelwire_protocol::Message;

use crate::cmd::{connect, CommInfoArgs};
use crate::exit::{client_error, protocol_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat, ReplyView};

pub fn run(args: CommInfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(&args.connect)?;

    let start = Instant::now();
    let reply = match args.target_name.as_deref() {
        Some(target) => client.get_comm_info_for(target),
        None => client.get_comm_info(),
    }
    .map_err(|err| client_error("comm_info_request failed", err))?;
    let elapsed = start.elapsed();

    let view = view(&reply)?;
    print_reply(&reply, elapsed, &view, format);
    Ok(SUCCESS)
}

fn view(reply: &Message) -> CliResult<ReplyView> {
    let info: CommInfoReply = reply
        .content_as()
        .map_err(|err| protocol_error("malformed comm_info_reply", err))?;

    Ok(ReplyView {
        title: "Open Comms",
        columns: ["COMM ID", "TARGET"],
        rows: info
            .comms
            .into_iter()
            .map(|(id, comm)| [id, comm.target_name])
            .collect(),
    })
}

use std::time::Instant;

use kernelwire_client::KernelInfoReply;
use kernelwire_protocol::Message;

use crate::cmd::{connect, KernelInfoArgs};
use crate::exit::{client_error, protocol_error, CliResult, SUCCESS};
use crate::output::{cell, print_reply, OutputFormat, ReplyView};

pub fn run(args: KernelInfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(&args.connect)?;

    let start = Instant::now();
    let reply = client
        .get_kernel_info()
        .map_err(|err| client_error("kernel_info_request failed", err))?;
    let elapsed = start.elapsed();

    let view = view(&reply)?;
    print_reply(&reply, elapsed, &view, format);
    Ok(SUCCESS)
}

fn view(reply: &Message) -> CliResult<ReplyView> {
    let info: KernelInfoReply = reply
        .content_as()
        .map_err(|err| protocol_error("malformed kernel_info_reply", err))?;

    let language = match info.language_info.version.as_str() {
        "" => info.language_info.name.clone(),
        version => format!("{} {version}", info.language_info.name),
    };
    let banner = info.banner.lines().next().unwrap_or_default().to_string();
    // Kernels put extra editor hints here; show the raw value.
    let codemirror_mode = cell(
        reply
            .content
            .get("language_info")
            .and_then(|language| language.get("codemirror_mode")),
    );

    Ok(ReplyView {
        title: "Kernel Info",
        columns: ["FIELD", "VALUE"],
        rows: vec![
            ["status".into(), info.status.to_string()],
            ["protocol_version".into(), info.protocol_version],
            [
                "implementation".into(),
                format!("{} {}", info.implementation, info.implementation_version)
                    .trim()
                    .to_string(),
            ],
            ["language".into(), language],
            ["codemirror_mode".into(), codemirror_mode],
            ["debugger".into(), info.debugger.to_string()],
            ["banner".into(), banner],
        ],
    })
}

use kernelwire_protocol::PROTOCOL_VERSION;
use kernelwire_socket::libzmq_version;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("kernelwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: kernelwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("KERNELWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("KERNELWIRE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("messaging_protocol: {PROTOCOL_VERSION}");
    let (major, minor, patch) = libzmq_version();
    println!("libzmq: {major}.{minor}.{patch}");
    println!("signature: hmac-sha256");

    Ok(SUCCESS)
}

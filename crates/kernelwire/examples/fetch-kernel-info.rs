//! Connect to a running kernel and print what it reports about itself.
//!
//! Run with:
//!   cargo run --example fetch-kernel-info -- /path/to/kernel-1234.json
//!
//! Without a running Jupyter kernel, start `cargo run --example mock-kernel`
//! and pass the connection file it prints.

use kernelwire::client::KernelInfoReply;
use kernelwire::{ConnectionInfo, ShellClient};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: fetch-kernel-info <connection-file>")?;

    let info = ConnectionInfo::from_path(&path)?;
    eprintln!("Connecting to {}", info.shell_endpoint());
    let mut client = ShellClient::connect(&info)?;

    let reply = client.get_kernel_info()?;
    let details: KernelInfoReply = reply.content_as()?;

    println!("status:           {}", details.status);
    println!("protocol_version: {}", details.protocol_version);
    println!(
        "implementation:   {} {}",
        details.implementation, details.implementation_version
    );
    println!("language:         {}", details.language_info.name);
    if let Some(line) = details.banner.lines().next() {
        println!("banner:           {line}");
    }

    Ok(())
}

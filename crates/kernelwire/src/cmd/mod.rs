use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use kernelwire_client::ShellClient;
use kernelwire_protocol::ConnectionInfo;
use kernelwire_socket::SocketConfig;
use tracing::debug;

use crate::exit::{client_error, protocol_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod comm_info;
pub mod kernel_info;
pub mod shutdown;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a kernel for its implementation and language details.
    KernelInfo(KernelInfoArgs),
    /// List a kernel's open comms.
    CommInfo(CommInfoArgs),
    /// Ask a kernel to shut down or restart.
    Shutdown(ShutdownArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::KernelInfo(args) => kernel_info::run(args, format),
        Command::CommInfo(args) => comm_info::run(args, format),
        Command::Shutdown(args) => shutdown::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Kernel connection file (JSON with at least shell_port and key).
    #[arg(value_name = "CONNECTION_FILE", env = "KERNELWIRE_CONNECTION_FILE")]
    pub connection_file: PathBuf,
    /// Send and reply timeout (e.g. 10s, 500ms).
    #[arg(long, default_value = "10s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct KernelInfoArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct CommInfoArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Only list comms opened for this target.
    #[arg(long)]
    pub target_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ShutdownArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Ask the kernel to restart instead of exiting.
    #[arg(long)]
    pub restart: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Load the connection file and open a shell client bounded by `--timeout`.
pub fn connect(args: &ConnectArgs) -> CliResult<ShellClient> {
    let timeout = parse_timeout(&args.timeout)?;
    let info = ConnectionInfo::from_path(&args.connection_file)
        .map_err(|err| protocol_error("cannot load connection file", err))?;
    debug!(?info, ?timeout, "connecting");

    let config = SocketConfig::default().with_timeout(timeout);

    ShellClient::connect_with_config(&info, &config).map_err(|err| {
        client_error(
            &format!("cannot connect to {}", info.shell_endpoint()),
            err,
        )
    })
}

pub fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

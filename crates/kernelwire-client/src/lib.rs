//! Shell-channel client for Jupyter kernels.
//!
//! ```no_run
//! use kernelwire_client::{KernelInfoReply, ShellClient};
//! use kernelwire_protocol::ConnectionInfo;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = ConnectionInfo::from_path("kernel-1234.json")?;
//! let mut client = ShellClient::connect(&info)?;
//! let reply = client.get_kernel_info()?;
//! let content: KernelInfoReply = reply.content_as()?;
//! println!("{} {}", content.implementation, content.protocol_version);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod replies;
pub mod requests;

pub use client::{
    ShellClient, COMM_INFO_REQUEST, COMPLETE_REQUEST, EXECUTE_REQUEST, HISTORY_REQUEST,
    INSPECT_REQUEST, IS_COMPLETE_REQUEST, KERNEL_INFO_REQUEST, SHUTDOWN_REQUEST,
};
pub use error::{ClientError, Result};
pub use replies::{
    CommInfo, CommInfoReply, CompleteReply, ErrorReply, ExecuteReply, HelpLink, HistoryCell,
    HistoryEntry, HistoryReply, InspectReply, IsCompleteReply, IsCompleteStatus, KernelInfoReply,
    LanguageInfo, ReplyStatus, ShutdownReply,
};
pub use requests::{ExecuteRequest, HistoryAccess, HistoryRequest};

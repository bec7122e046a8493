//! Stand-in kernel that answers shell requests until it is asked to shut down.
//!
//! Run with:
//!   cargo run --example mock-kernel
//!
//! It prints the connection file path. In another terminal:
//!   cargo run --features cli -- kernel-info <path>
//!   cargo run --features cli -- shutdown <path>
//!
//! Connect the client library to it to try execute, complete, history and
//! is_complete requests.

use std::fs;

use kernelwire::protocol::{deserialize, serialize, Mapping, Message, Session, Signer, TrailingFrames};
use kernelwire::socket::{Context, MultipartSocket, RouterSocket, SocketConfig};
use serde_json::{json, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut socket = RouterSocket::bind(&Context::new(), "127.0.0.1", 0, &SocketConfig::default())?;
    let session = Session::with_username("mock-kernel");
    let key = Session::new().id().to_string();
    let signer = Signer::new(key.as_bytes())?;

    let dir = std::env::temp_dir().join(format!("kernelwire-mock-{}", std::process::id()));
    fs::create_dir_all(&dir)?;
    let path = dir.join("kernel.json");
    let connection = json!({
        "shell_port": socket.port(),
        "ip": "127.0.0.1",
        "key": key,
        "transport": "tcp",
        "signature_scheme": "hmac-sha256",
        "kernel_name": "mock"
    });
    fs::write(&path, serde_json::to_vec_pretty(&connection)?)?;
    eprintln!("Connection file: {}", path.display());

    let mut kernel = MockState::default();
    loop {
        let frames = socket.recv_multipart()?;
        let (identities, request) = match deserialize(&signer, &frames, TrailingFrames::Buffers) {
            Ok(decoded) => decoded,
            Err(e) => {
                // Shell requests that fail verification get no reply.
                eprintln!("Dropping request: {e}");
                continue;
            }
        };

        let msg_type = request.msg_type().unwrap_or_default().to_string();
        eprintln!("Received {msg_type}");
        let (reply_type, content) = respond(&mut kernel, &msg_type, &request);

        let reply = session.reply(&request, &reply_type, content);
        socket.send_multipart(&serialize(&signer, &identities, &reply)?)?;
        if msg_type == "shutdown_request" {
            break;
        }
    }

    let _ = fs::remove_dir_all(&dir);
    Ok(())
}

/// Executed cells, newest last.
#[derive(Default)]
struct MockState {
    history: Vec<String>,
}

fn respond(kernel: &mut MockState, msg_type: &str, request: &Message) -> (String, Mapping) {
    let code = request.content.get("code").and_then(Value::as_str).unwrap_or_default();
    let content = match msg_type {
        "kernel_info_request" => json!({
            "status": "ok",
            "protocol_version": kernelwire::protocol::PROTOCOL_VERSION,
            "implementation": "mock-kernel",
            "implementation_version": env!("CARGO_PKG_VERSION"),
            "language_info": {"name": "text", "version": "1", "mimetype": "text/plain"},
            "banner": "kernelwire mock kernel",
            "debugger": false,
            "help_links": []
        }),
        "comm_info_request" => json!({"status": "ok", "comms": {}}),
        "shutdown_request" => {
            let restart = request.content.get("restart").and_then(Value::as_bool).unwrap_or(false);
            json!({"status": "ok", "restart": restart})
        }
        "inspect_request" => json!({"status": "ok", "found": false, "data": {}, "metadata": {}}),
        "execute_request" => {
            let silent = request.content.get("silent").and_then(Value::as_bool).unwrap_or(false);
            if !silent {
                kernel.history.push(code.to_string());
            }
            json!({
                "status": "ok",
                "execution_count": kernel.history.len(),
                "user_expressions": {},
                "payload": []
            })
        }
        "complete_request" => {
            let matches: Vec<&str> = ["print", "pass", "import"]
                .into_iter()
                .filter(|word| !code.is_empty() && word.starts_with(code))
                .collect();
            json!({
                "status": "ok",
                "matches": matches,
                "cursor_start": 0,
                "cursor_end": code.len(),
                "metadata": {}
            })
        }
        "history_request" => {
            let history: Vec<Value> = kernel
                .history
                .iter()
                .enumerate()
                .map(|(line, cell)| json!([0, line + 1, cell]))
                .collect();
            json!({"status": "ok", "history": history})
        }
        "is_complete_request" => {
            if code.trim_end().ends_with(':') {
                json!({"status": "incomplete", "indent": "    "})
            } else {
                json!({"status": "complete"})
            }
        }
        other => json!({
            "status": "error",
            "ename": "UnknownRequest",
            "evalue": format!("unsupported request type {other}"),
            "traceback": []
        }),
    };

    let reply_type = match msg_type.strip_suffix("_request") {
        Some(stem) => format!("{stem}_reply"),
        None => "error_reply".to_string(),
    };
    let content = match content {
        Value::Object(map) => map,
        _ => Mapping::new(),
    };
    (reply_type, content)
}

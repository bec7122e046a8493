use bytes::Bytes;
use kernelwire_protocol::{
    deserialize, serialize, ConnectionInfo, Mapping, Message, ProtocolError, Session, Signer,
    TrailingFrames,
};
use kernelwire_socket::{connect_with_config, Context, MultipartSocket, ReqSocket, SocketConfig};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::requests::{ExecuteRequest, HistoryRequest};

pub const KERNEL_INFO_REQUEST: &str = "kernel_info_request";
pub const COMM_INFO_REQUEST: &str = "comm_info_request";
pub const SHUTDOWN_REQUEST: &str = "shutdown_request";
pub const INSPECT_REQUEST: &str = "inspect_request";
pub const EXECUTE_REQUEST: &str = "execute_request";
pub const COMPLETE_REQUEST: &str = "complete_request";
pub const HISTORY_REQUEST: &str = "history_request";
pub const IS_COMPLETE_REQUEST: &str = "is_complete_request";

/// Blocking client for a kernel's shell channel.
///
/// Every request waits for its reply before returning; the underlying REQ
/// socket never has more than one request in flight. Replies are verified
/// against the connection key before their JSON is decoded.
pub struct ShellClient<S = ReqSocket> {
    socket: S,
    signer: Signer,
    session: Session,
    trailing: TrailingFrames,
}

impl ShellClient<ReqSocket> {
    /// Connect to the shell port described by `info`.
    pub fn connect(info: &ConnectionInfo) -> Result<Self> {
        Self::connect_with_config(info, &SocketConfig::default())
    }

    /// Connect with explicit socket timeouts and limits, in a context of its own.
    pub fn connect_with_config(info: &ConnectionInfo, config: &SocketConfig) -> Result<Self> {
        Self::connect_in(&Context::new(), info, config)
    }

    /// Connect using a shared `context`.
    pub fn connect_in(
        context: &Context,
        info: &ConnectionInfo,
        config: &SocketConfig,
    ) -> Result<Self> {
        info.validate()?;
        let signer = info.signer()?;
        let socket = connect_with_config(context, &info.shell_endpoint(), config)?;
        info!(
            endpoint = %info.shell_endpoint(),
            signed = signer.is_enabled(),
            "connected to kernel shell channel"
        );
        Ok(Self::new(socket, signer))
    }
}

impl<S: MultipartSocket> ShellClient<S> {
    /// Wrap an already connected socket.
    pub fn new(socket: S, signer: Signer) -> Self {
        Self {
            socket,
            signer,
            session: Session::new(),
            trailing: TrailingFrames::default(),
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Keep extra reply frames as buffers instead of rejecting them.
    pub fn with_trailing_frames(mut self, trailing: TrailingFrames) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sign and send `message` behind `identities`.
    pub fn send(&mut self, identities: &[Bytes], message: &Message) -> Result<()> {
        let frames = serialize(&self.signer, identities, message)?;
        self.socket.send_multipart(&frames)?;
        debug!(
            msg_type = message.msg_type().unwrap_or_default(),
            msg_id = message.msg_id().unwrap_or_default(),
            "sent request"
        );
        Ok(())
    }

    /// Receive, verify and decode one message.
    pub fn recv(&mut self) -> Result<(Vec<Bytes>, Message)> {
        let frames = self.socket.recv_multipart()?;
        let (identities, message) = deserialize(&self.signer, &frames, self.trailing)?;
        debug!(
            msg_type = message.msg_type().unwrap_or_default(),
            parent = message.parent_msg_id().unwrap_or_default(),
            "received reply"
        );
        Ok((identities, message))
    }

    /// Send a request of `msg_type` and wait for the matching reply.
    pub fn request(&mut self, msg_type: &str, content: Mapping) -> Result<Message> {
        let request = self.session.message(msg_type, content);
        self.send(&[], &request)?;
        let (_, reply) = self.recv()?;

        let expected = request.msg_id().unwrap_or_default();
        match reply.parent_msg_id() {
            Some(parent) if parent != expected => {
                warn!(expected, parent, "reply does not answer the request");
                return Err(ClientError::UnexpectedReply {
                    expected: expected.to_string(),
                    parent: parent.to_string(),
                });
            }
            Some(_) => {}
            None => debug!(msg_type, "reply has no parent msg_id"),
        }
        Ok(reply)
    }

    /// `kernel_info_request` with empty content.
    pub fn get_kernel_info(&mut self) -> Result<Message> {
        self.request(KERNEL_INFO_REQUEST, Mapping::new())
    }

    /// `comm_info_request` for every open comm.
    pub fn get_comm_info(&mut self) -> Result<Message> {
        self.request(COMM_INFO_REQUEST, Mapping::new())
    }

    /// `comm_info_request` limited to comms of `target_name`.
    pub fn get_comm_info_for(&mut self, target_name: &str) -> Result<Message> {
        let mut content = Mapping::new();
        content.insert("target_name".into(), Value::String(target_name.to_string()));
        self.request(COMM_INFO_REQUEST, content)
    }

    /// `shutdown_request`; `restart` asks the kernel to come back up.
    pub fn shutdown(&mut self, restart: bool) -> Result<Message> {
        let mut content = Mapping::new();
        content.insert("restart".into(), Value::Bool(restart));
        self.request(SHUTDOWN_REQUEST, content)
    }

    /// `inspect_request` for the object at `cursor_pos` in `code`.
    pub fn inspect(&mut self, code: &str, cursor_pos: usize, detail_level: u8) -> Result<Message> {
        let mut content = Mapping::new();
        content.insert("code".into(), Value::String(code.to_string()));
        content.insert("cursor_pos".into(), Value::from(cursor_pos));
        content.insert("detail_level".into(), Value::from(detail_level));
        self.request(INSPECT_REQUEST, content)
    }

    /// Send `content` serialized from a typed request.
    pub fn request_with<T: Serialize>(&mut self, msg_type: &str, content: &T) -> Result<Message> {
        let value = serde_json::to_value(content).map_err(|source| ProtocolError::Encode {
            field: "content",
            source,
        })?;
        let Value::Object(content) = value else {
            return Err(ProtocolError::NotAMapping { field: "content" }.into());
        };
        self.request(msg_type, content)
    }

    /// `execute_request`. Output goes to IOPub; the reply only carries status
    /// and the execution count.
    pub fn execute(&mut self, request: &ExecuteRequest) -> Result<Message> {
        self.request_with(EXECUTE_REQUEST, request)
    }

    pub fn complete(&mut self, code: &str, cursor_pos: usize) -> Result<Message> {
        let mut content = Mapping::new();
        content.insert("code".into(), Value::String(code.to_string()));
        content.insert("cursor_pos".into(), Value::from(cursor_pos));
        self.request(COMPLETE_REQUEST, content)
    }

    pub fn history(&mut self, request: &HistoryRequest) -> Result<Message> {
        self.request_with(HISTORY_REQUEST, request)
    }

    /// `is_complete_request`: would `code` run as typed, or does it need more lines?
    pub fn is_complete(&mut self, code: &str) -> Result<Message> {
        let mut content = Mapping::new();
        content.insert("code".into(), Value::String(code.to_string()));
        self.request(IS_COMPLETE_REQUEST, content)
    }

    pub fn socket(&self) -> &S {
        &self.socket
    }

    pub fn socket_mut(&mut self) -> &mut S {
        &mut self.socket
    }

    pub fn into_inner(self) -> S {
        self.socket
    }
}

impl<S> std::fmt::Debug for ShellClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellClient")
            .field("session", &self.session.id())
            .field("signer", &self.signer)
            .field("trailing", &self.trailing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use kernelwire_protocol::PROTOCOL_VERSION;
    use kernelwire_socket::SocketError;
    use serde_json::json;

    use super::*;
    use crate::replies::{
        CompleteReply, ExecuteReply, HistoryCell, HistoryReply, IsCompleteReply, IsCompleteStatus,
        KernelInfoReply, ShutdownReply,
    };
    use crate::requests::HistoryAccess;

    const KEY: &[u8] = b"5ca1ab1e-c0da-b1e5-0000-000000000000";

    type Handler = Box<dyn FnMut(&Message) -> Message>;

    /// In-memory kernel: decodes each request and queues a signed reply.
    struct MockKernel {
        signer: Signer,
        handler: Handler,
        requests: Vec<Message>,
        outbox: VecDeque<Vec<Bytes>>,
        tamper: bool,
        extra_frame: Option<Bytes>,
    }

    impl MockKernel {
        fn new(handler: impl FnMut(&Message) -> Message + 'static) -> Self {
            Self {
                signer: Signer::new(KEY).unwrap(),
                handler: Box::new(handler),
                requests: Vec::new(),
                outbox: VecDeque::new(),
                tamper: false,
                extra_frame: None,
            }
        }
    }

    impl MultipartSocket for MockKernel {
        fn send_multipart(&mut self, parts: &[Bytes]) -> kernelwire_socket::Result<()> {
            let (_, request) = deserialize(&self.signer, parts, TrailingFrames::Reject)
                .map_err(|e| SocketError::Protocol(e.to_string()))?;
            let reply = (self.handler)(&request);
            let mut frames = serialize(&self.signer, &[], &reply)
                .map_err(|e| SocketError::Protocol(e.to_string()))?;
            if self.tamper {
                let mut content = frames[5].to_vec();
                content[1] ^= 0x20;
                frames[5] = Bytes::from(content);
            }
            if let Some(extra) = &self.extra_frame {
                frames.push(extra.clone());
            }
            self.requests.push(request);
            self.outbox.push_back(frames);
            Ok(())
        }

        fn recv_multipart(&mut self) -> kernelwire_socket::Result<Vec<Bytes>> {
            self.outbox
                .pop_front()
                .ok_or(SocketError::InvalidState("no reply queued"))
        }
    }

    fn reply_with(msg_type: &'static str, content: Value) -> impl FnMut(&Message) -> Message {
        let session = Session::with_username("kernel");
        move |request: &Message| {
            let Value::Object(content) = content.clone() else {
                panic!("content must be an object");
            };
            session.reply(request, msg_type, content)
        }
    }

    fn client(kernel: MockKernel) -> ShellClient<MockKernel> {
        ShellClient::new(kernel, Signer::new(KEY).unwrap())
    }

    #[test]
    fn kernel_info_scenario() {
        let kernel = MockKernel::new(reply_with(
            "kernel_info_reply",
            json!({
                "status": "ok",
                "protocol_version": PROTOCOL_VERSION,
                "implementation": "mock",
                "implementation_version": "0.1",
                "language_info": {"name": "mock"},
                "banner": "mock kernel"
            }),
        ));
        let mut client = client(kernel);

        let reply = client.get_kernel_info().unwrap();
        assert_eq!(reply.msg_type(), Some("kernel_info_reply"));
        let info: KernelInfoReply = reply.content_as().unwrap();
        assert_eq!(info.protocol_version, "5.3");

        let request = &client.socket().requests[0];
        assert_eq!(request.msg_type(), Some(KERNEL_INFO_REQUEST));
        assert!(request.content.is_empty());
        assert_eq!(request.header["version"], PROTOCOL_VERSION);
        assert_eq!(request.header["session"], client.session().id());
    }

    #[test]
    fn shutdown_content_is_exact() {
        let kernel = MockKernel::new(reply_with(
            "shutdown_reply",
            json!({"status": "ok", "restart": true}),
        ));
        let mut client = client(kernel);

        let reply = client.shutdown(true).unwrap();
        let content: ShutdownReply = reply.content_as().unwrap();
        assert!(content.restart);

        let request = &client.socket().requests[0];
        assert_eq!(Value::Object(request.content.clone()), json!({"restart": true}));
    }

    #[test]
    fn comm_info_for_target() {
        let kernel = MockKernel::new(reply_with("comm_info_reply", json!({"comms": {}})));
        let mut client = client(kernel);

        client.get_comm_info_for("jupyter.widget").unwrap();
        client.get_comm_info().unwrap();

        let requests = &client.socket().requests;
        assert_eq!(request_content(&requests[0]), json!({"target_name": "jupyter.widget"}));
        assert_eq!(request_content(&requests[1]), json!({}));
    }

    #[test]
    fn inspect_request_content() {
        let kernel = MockKernel::new(reply_with("inspect_reply", json!({"found": false})));
        let mut client = client(kernel);

        client.inspect("print", 5, 1).unwrap();
        assert_eq!(
            request_content(&client.socket().requests[0]),
            json!({"code": "print", "cursor_pos": 5, "detail_level": 1})
        );
    }

    #[test]
    fn bad_signature_is_mismatch() {
        let mut kernel = MockKernel::new(reply_with("kernel_info_reply", json!({})));
        kernel.tamper = true;
        let mut client = client(kernel);

        let err = client.get_kernel_info().unwrap_err();
        assert!(err.is_signature_mismatch());
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::SignatureMismatch)
        ));

        // The failed request does not poison the next one.
        client.socket_mut().tamper = false;
        assert!(client.get_kernel_info().is_ok());
    }

    #[test]
    fn kernel_rejects_request_signed_with_wrong_key() {
        let kernel = MockKernel::new(reply_with("kernel_info_reply", json!({})));
        let mut client = ShellClient::new(kernel, Signer::new(b"other").unwrap());

        // The kernel cannot verify our request either.
        let err = client.get_kernel_info().unwrap_err();
        assert!(matches!(err, ClientError::Socket(SocketError::Protocol(_))));
    }

    #[test]
    fn reply_to_other_request_rejected() {
        let session = Session::with_username("kernel");
        let kernel = MockKernel::new(move |_request: &Message| {
            let stranger = session.message("kernel_info_request", Mapping::new());
            session.reply(&stranger, "kernel_info_reply", Mapping::new())
        });
        let mut client = client(kernel);

        let err = client.get_kernel_info().unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedReply { .. }));
    }

    #[test]
    fn missing_parent_is_accepted() {
        let session = Session::with_username("kernel");
        let kernel = MockKernel::new(move |_request: &Message| {
            session.message("kernel_info_reply", Mapping::new())
        });
        let mut client = client(kernel);

        let reply = client.get_kernel_info().unwrap();
        assert!(reply.parent_msg_id().is_none());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let client = client(MockKernel::new(reply_with("x", json!({}))));
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("5ca1ab1e"));
    }

    #[test]
    fn execute_request_scenario() {
        let kernel = MockKernel::new(reply_with(
            "execute_reply",
            json!({"status": "ok", "execution_count": 7, "user_expressions": {}, "payload": []}),
        ));
        let mut client = client(kernel);

        let request = ExecuteRequest::new("a = 1").user_expression("a", "a");
        let reply = client.execute(&request).unwrap();
        let content: ExecuteReply = reply.content_as().unwrap();
        assert_eq!(content.execution_count, Some(7));

        let sent = &client.socket().requests[0];
        assert_eq!(sent.msg_type(), Some(EXECUTE_REQUEST));
        assert_eq!(
            request_content(sent),
            json!({
                "code": "a = 1",
                "silent": false,
                "store_history": true,
                "user_expressions": {"a": "a"},
                "allow_stdin": false,
                "stop_on_error": true
            })
        );
    }

    #[test]
    fn complete_request_scenario() {
        let kernel = MockKernel::new(reply_with(
            "complete_reply",
            json!({"status": "ok", "matches": ["print"], "cursor_start": 0, "cursor_end": 3, "metadata": {}}),
        ));
        let mut client = client(kernel);

        let reply: CompleteReply = client.complete("pri", 3).unwrap().content_as().unwrap();
        assert_eq!(reply.matches, ["print"]);
        assert_eq!(reply.cursor_end, 3);
        assert_eq!(
            request_content(&client.socket().requests[0]),
            json!({"code": "pri", "cursor_pos": 3})
        );
    }

    #[test]
    fn history_request_scenario() {
        let kernel = MockKernel::new(reply_with(
            "history_reply",
            json!({"status": "ok", "history": [[0, 1, ["x = 1", null]], [0, 2, ["x", "1"]]]}),
        ));
        let mut client = client(kernel);

        let request = HistoryRequest::tail(2).with_output();
        let reply: HistoryReply = client.history(&request).unwrap().content_as().unwrap();
        assert_eq!(reply.history.len(), 2);
        assert_eq!(reply.history[1].2, HistoryCell::InputOutput("x".into(), Some("1".into())));

        let sent = &client.socket().requests[0];
        assert_eq!(sent.msg_type(), Some(HISTORY_REQUEST));
        assert_eq!(
            request_content(sent),
            json!({"output": true, "raw": true, "hist_access_type": "tail", "n": 2})
        );
        assert!(matches!(request.access, HistoryAccess::Tail { n: 2 }));
    }

    #[test]
    fn is_complete_request_scenario() {
        let kernel = MockKernel::new(reply_with(
            "is_complete_reply",
            json!({"status": "incomplete", "indent": "    "}),
        ));
        let mut client = client(kernel);

        let reply: IsCompleteReply = client.is_complete("for i in x:").unwrap().content_as().unwrap();
        assert_eq!(reply.status, IsCompleteStatus::Incomplete);
        assert_eq!(reply.indent, "    ");
        assert_eq!(
            request_content(&client.socket().requests[0]),
            json!({"code": "for i in x:"})
        );
    }

    #[test]
    fn non_object_typed_content_rejected() {
        let mut client = client(MockKernel::new(reply_with("x", json!({}))));
        let err = client.request_with(EXECUTE_REQUEST, &"just a string").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::NotAMapping { field: "content" })
        ));
        assert!(client.socket().requests.is_empty());
    }

    #[test]
    fn trailing_frame_rejected_by_default() {
        let mut kernel = MockKernel::new(reply_with("kernel_info_reply", json!({})));
        kernel.extra_frame = Some(Bytes::from_static(b"\x00\x01"));
        let mut client = client(kernel);

        let err = client.get_kernel_info().unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::Framing(_))
        ));
    }

    #[test]
    fn trailing_frame_kept_as_buffer() {
        let mut kernel = MockKernel::new(reply_with("kernel_info_reply", json!({})));
        kernel.extra_frame = Some(Bytes::from_static(b"\x00\x01"));
        let mut client = client(kernel).with_trailing_frames(TrailingFrames::Buffers);

        let reply = client.get_kernel_info().unwrap();
        assert_eq!(reply.buffers, vec![Bytes::from_static(b"\x00\x01")]);
        assert_eq!(reply.msg_type(), Some("kernel_info_reply"));
    }

    fn request_content(message: &Message) -> Value {
        Value::Object(message.content.clone())
    }
}

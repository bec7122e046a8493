use bytes::Bytes;
use tracing::{trace, warn};

use crate::codec::{ContentFrames, Message};
use crate::error::{ProtocolError, Result};
use crate::signer::Signer;

/// Separates routing identities from the signed body.
pub const DELIMITER: &[u8] = b"<IDS|MSG>";

/// What to do with frames that follow the four content frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingFrames {
    /// Fail with a framing error.
    #[default]
    Reject,
    /// Keep them as the message's binary buffers (unsigned).
    Buffers,
}

/// A frame list split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub identities: Vec<Bytes>,
    pub signature: Bytes,
    pub content: ContentFrames,
    pub buffers: Vec<Bytes>,
}

impl WireMessage {
    /// Flatten back into frames, buffers last.
    pub fn into_frames(self) -> Vec<Bytes> {
        let mut frames = assemble(&self.identities, self.signature, &self.content);
        frames.extend(self.buffers);
        frames
    }
}

/// `identities + [DELIMITER, signature] + content`.
pub fn assemble(identities: &[Bytes], signature: Bytes, content: &ContentFrames) -> Vec<Bytes> {
    let mut frames = Vec::with_capacity(identities.len() + 2 + content.len());
    frames.extend_from_slice(identities);
    frames.push(Bytes::from_static(DELIMITER));
    frames.push(signature);
    frames.extend_from_slice(content);
    frames
}

/// Split at the first delimiter, rejecting trailing frames.
pub fn split(frames: &[Bytes]) -> Result<WireMessage> {
    split_with(frames, TrailingFrames::Reject)
}

/// Split at the first delimiter with an explicit trailing-frame policy.
pub fn split_with(frames: &[Bytes], trailing: TrailingFrames) -> Result<WireMessage> {
    let delim = frames
        .iter()
        .position(|f| f.as_ref() == DELIMITER)
        .ok_or_else(|| ProtocolError::Framing("missing <IDS|MSG> delimiter".to_string()))?;

    let identities = frames[..delim].to_vec();
    let rest = &frames[delim + 1..];
    let Some((signature, rest)) = rest.split_first() else {
        return Err(ProtocolError::Framing("missing signature frame".to_string()));
    };
    if rest.len() < 4 {
        return Err(ProtocolError::Framing(format!(
            "expected 4 content frames after the signature, got {}",
            rest.len()
        )));
    }

    let (content, extra) = rest.split_at(4);
    if !extra.is_empty() && trailing == TrailingFrames::Reject {
        return Err(ProtocolError::Framing(format!(
            "{} unexpected frames after content",
            extra.len()
        )));
    }

    Ok(WireMessage {
        identities,
        signature: signature.clone(),
        content: [
            content[0].clone(),
            content[1].clone(),
            content[2].clone(),
            content[3].clone(),
        ],
        buffers: extra.to_vec(),
    })
}

/// Encode, sign and frame `message` behind `identities`.
pub fn serialize(signer: &Signer, identities: &[Bytes], message: &Message) -> Result<Vec<Bytes>> {
    let content = message.to_frames()?;
    let signature = signer.sign(&content);
    let mut frames = assemble(identities, signature, &content);
    frames.extend_from_slice(&message.buffers);
    trace!(
        frames = frames.len(),
        bytes = frames.iter().map(Bytes::len).sum::<usize>(),
        "serialized message"
    );
    Ok(frames)
}

/// Split, verify and decode a received frame list.
///
/// The signature is checked before any JSON is parsed.
pub fn deserialize(
    signer: &Signer,
    frames: &[Bytes],
    trailing: TrailingFrames,
) -> Result<(Vec<Bytes>, Message)> {
    let wire = split_with(frames, trailing)?;
    if !signer.verify(&wire.content, &wire.signature) {
        warn!(
            identities = wire.identities.len(),
            "dropping message with bad signature"
        );
        return Err(ProtocolError::SignatureMismatch);
    }

    let mut message = Message::from_frames(&wire.content)?;
    message.buffers = wire.buffers;
    Ok((wire.identities, message))
}

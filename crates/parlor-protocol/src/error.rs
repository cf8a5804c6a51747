//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound event failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// An inbound frame was not a well-formed event: malformed JSON, an
    /// unknown event name, or a payload missing required fields.
    #[error("malformed event: {0}")]
    Decode(#[source] serde_json::Error),
}

pub mod bedrock;
pub mod java;

/// A single-shot status probe against one remote server.
///
/// Implementations own their target and their timeout budget; one call opens,
/// uses and closes one socket, and nothing is shared between calls. Failures
/// are reported honestly here; the normalization layer is what collapses them
/// into the offline status record.
pub trait Prober {
    /// Protocol-native data carried by a successful probe.
    type Response;

    /// A reported error value.
    type Error: std::error::Error;

    fn probe(&self) -> Result<Self::Response, Self::Error>;
}

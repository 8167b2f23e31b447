/// Signaling lifecycle of one peer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NegotiationState {
    /// Created, no description applied yet.
    Idle = 0,
    /// A local offer is pending a remote answer.
    HaveLocalOffer = 1,
    /// A remote offer was applied, the local answer is being produced.
    HaveRemoteOffer = 2,
    /// Both descriptions applied; the pair is settled until renegotiation.
    Stable = 3,
    /// Torn down. No further steps run.
    Closed = 4,
}

impl NegotiationState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::HaveLocalOffer,
            2 => Self::HaveRemoteOffer,
            3 => Self::Stable,
            _ => Self::Closed,
        }
    }
}

use parley_core::SignalPayload;

/// One unit of work on a pair's serialized signaling queue.
#[derive(Debug)]
pub enum NegotiationStep {
    /// Create an offer, set it locally and send it to the remote side.
    SendOffer,

    /// Apply an inbound description or candidate from the remote side.
    Remote(SignalPayload),
}

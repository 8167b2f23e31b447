mod session;
mod state;
mod step;
mod transport;

pub use session::NegotiationSession;
pub use state::NegotiationState;
pub use step::NegotiationStep;
pub use transport::SignalingTransport;

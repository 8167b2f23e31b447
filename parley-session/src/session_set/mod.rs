mod session_set;

pub use session_set::PeerSessionSet;

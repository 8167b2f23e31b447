mod registry;

pub use registry::{RegistryError, RoomRegistry};

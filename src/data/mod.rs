pub mod card_config;
pub mod host_state;
pub mod persistence;

pub use card_config::{CardConfig, TrackedEntity};
pub use host_state::{EntityState, HostState};
pub use persistence::Persistable;

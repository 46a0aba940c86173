pub mod cache;
pub mod remote;
pub mod session;
pub mod sync;

pub use cache::{LocalCache, DEFAULT_NAMESPACE};
pub use remote::{HttpRemote, MemoryRemote, RemoteStore};
pub use session::{Session, SessionConfig};
pub use sync::{SyncConfig, SyncEngine, SyncStats, DEFAULT_DEBOUNCE};

// Purpose - external interfaces: clock translation between logical and device time

pub mod sync;

pub use sync::{LocalSync, OffsetSync, SyncProvider};

mod epoch;
mod slot;

pub use epoch::{Epoch, SyncCommitteePeriod, ValidatorIndex};
pub use slot::{slot_from_string, Slot};

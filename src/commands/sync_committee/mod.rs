pub mod members;

pub use members::{MembersCommand, MembersError, MembersRequest, MembersResponse};

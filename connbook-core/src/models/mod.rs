//! Core data model: connection records, directory history and the protocol
//! catalog interface.

mod history;
mod protocol;
mod record;

pub use history::{DirectoryHistory, HISTORY_CAPACITY};
pub use protocol::{BuiltinCatalog, ProtocolCatalog, ProtocolEntry, ProtocolKind, StaticCatalog};
pub use record::{
    AuthMode, Authentication, ConnectionRecord, NOTE_MAX_LEN, TransportOptions, Warnings,
};

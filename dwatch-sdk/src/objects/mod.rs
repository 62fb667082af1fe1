pub mod contract;
pub mod notification;
pub mod operation;

pub use contract::{ContractId, InvalidContractId};
pub use notification::{Embed, EmbedField, EmbedThumbnail, NotificationPayload};
pub use operation::{OperationRecord, OperationsPage, ParameterNode, TimestampError, entrypoints};

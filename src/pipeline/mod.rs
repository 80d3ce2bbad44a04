//! Request pipeline: operation handlers, reads and failure mapping.

pub mod error;
pub mod link;
pub mod operation;
pub mod read;

pub use error::{ProtocolFailure, RequestError, RequestResult};
pub use link::next_link;
pub use operation::{
    EntityOperation, KeyPredicate, OperationContext, OperationError, OperationRegistry,
    OperationResult,
};
pub use read::{CollectionRequest, PagingPolicy, ReadPipeline};

//! OpenFGA HTTP API client.
//!
//! This crate owns the boundary with the authorization backend. Three rules
//! keep the rest of the workspace simple:
//!
//! - **No ambient store pointer.** Every store-scoped call takes the target
//!   store id as an explicit parameter; the client's default store id is
//!   immutable after construction. Concurrent requests against different
//!   stores cannot interfere with each other.
//! - **Tolerant decoding.** Response models accept a fully-typed body, a
//!   bare map with the same keys, or a body missing fields entirely; absent
//!   fields decode to `None`/empty rather than failing. Shape handling stops
//!   at this boundary, callers work with plain structs.
//! - **Bounded calls.** Each request carries the configured timeout; a slow
//!   backend surfaces as an error, never a wedged worker.

pub mod client;
pub mod error;
pub mod models;
pub mod provider;

pub use client::OpenFgaClient;
pub use error::FgaError;
pub use models::{
    AuthorizationModel, CheckRequest, CheckResponse, CreateStoreResponse, FgaObjectRef, FgaUser,
    GetAuthorizationModelResponse, ListObjectsRequest, ListObjectsResponse, ListUsersRequest,
    ListUsersResponse, ListStoresResponse, ReadAuthorizationModelsResponse, ReadRequest,
    ReadResponse, ReadTupleFilter, Store, Tuple, TupleKey, UserTypeFilter,
    WriteAuthorizationModelResponse, WriteRequest, WriteTuples,
};
pub use provider::ClientProvider;

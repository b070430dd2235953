//! Generated protocol types for the `StoreService` contract.
//!
//! The contract is compiled from `proto/storegate.proto` at build time.
//! Consumers construct the generated server wrapper once at startup and
//! hand it to the lifecycle manager; nothing here is module-level state.

pub mod v1 {
    tonic::include_proto!("storegate.v1");
}

#![forbid(unsafe_code)]

//! Runtime for stored corrections: resolves parameters, authenticates,
//! invokes the target with retry, reshapes and validates the result.
//!
//! Mapping documents and the transformation engine live in `corrector-core`;
//! this crate drives them against the network.

pub mod audit;
pub mod auth;
pub mod boundary;
pub mod executor;
pub mod http;
pub mod request;
pub mod retry;
pub mod schema;

pub use crate::boundary::{AuthOverridePolicy, CallRequest, Corrector, Envelope, ErrorType};
pub use crate::executor::{
    CallOverrides, ExecuteError, ExecutionOutcome, Executor, ExecutorConfig,
};

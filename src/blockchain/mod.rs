// src/blockchain/mod.rs

pub mod client;
pub use client::{EthereumRpcClient, RpcObserver, TracingObserver};

pub mod error;
pub use error::ApiError;

pub mod normalizer;
pub mod validator;

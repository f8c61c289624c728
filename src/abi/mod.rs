//! ABI tuple codec for contract-facing payloads
//!
//! Head/tail encoding and decoding for the value shapes the extraData
//! layouts use: uint256, address, bool, bytes, string, dynamic arrays
//! (including nested arrays), and tuples. Field order is always supplied
//! explicitly by the caller; there is no reflection.

pub mod types;
pub mod encoder;
pub mod decoder;

pub use types::*;
pub use encoder::*;
pub use decoder::*;

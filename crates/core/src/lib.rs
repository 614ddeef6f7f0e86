//! # pf-replay-core
//!
//! Deterministic provable-fairness replay engine: reproduces casino game
//! outcomes bit-for-bit from a server seed, a client seed, and a nonce, and
//! scans large nonce ranges in parallel for metrics matching a predicate.
//!
//! ## Algorithm
//!
//! Each nonce has its own infinite byte stream, `B[32r + j]` being the `j`-th
//! byte of `HMAC_SHA256(server, client || ":" || nonce || ":" || r)`. Games
//! draw a short prefix of that stream, decode it into `[0, 1)` floats, and
//! apply a fixed arithmetic recipe to produce a scalar metric.
//!
//! ## Example
//!
//! ```rust
//! use pf_replay_core::{scan, ScanRequest, EngineConfig};
//! use std::collections::BTreeMap;
//!
//! let request = ScanRequest {
//!     game: "dice".to_string(),
//!     server_seed: "server".to_string(),
//!     client_seed: "client".to_string(),
//!     nonce_start: 0,
//!     nonce_end: 1000,
//!     params: BTreeMap::new(),
//!     target_op: "ge".to_string(),
//!     target_val: 50.0,
//!     target_val2: None,
//!     tolerance: None,
//!     limit: 0,
//!     timeout_ms: 0,
//! };
//! let cancellation = pf_replay_core::CancellationToken::new();
//! let result = scan(&request, &EngineConfig::default(), &cancellation).unwrap();
//! println!("{} hits", result.hits.len());
//! ```

mod config;
mod error;
mod float;
mod games;
mod predicate;
mod scan;
mod stream;
mod summary;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, ErrorContext};
pub use float::{decode_float, fill_floats, floats};
pub use games::{Game, GameDetails, GameResult, GameSpec, RawParams};
pub use predicate::{PredicateOp, TargetPredicate, DEFAULT_TOLERANCE_FLOAT, DEFAULT_TOLERANCE_INTEGER};
pub use scan::{
    engine_version, games_list, scan, verify, CancellationToken, GameListEntry, GamesList, Hit,
    ScanRequest, ScanResult, VerifyRequest, VerifyResult,
};
pub use stream::{ByteCursor, BLOCK_SIZE};
pub use summary::{Summary, SummaryAccumulator};

/// `SHA-256(server_seed)` as lowercase hex, so callers and logs can reference
/// a seed without ever disclosing it.
pub fn seed_hash(server_seed: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(server_seed))
}

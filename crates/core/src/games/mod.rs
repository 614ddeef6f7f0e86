//! Game evaluator contract and the static registry of implementations.
//!
//! Every game is a pure function `(seeds, nonce, params) -> GameResult`
//! plus a declared `float_count` and a static [`GameSpec`]. Games never
//! touch the byte stream directly — they draw from [`crate::float`] starting
//! at cursor 0 for the nonce in question.

mod dice;
mod limbo;
mod roulette;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Per-game detail payload, produced only on the single-nonce `verify` path.
/// Never constructed in the scan hot path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameDetails {
    Limbo {
        raw_float: f64,
        house_edge: f64,
        crash_before_floor: f64,
    },
    Dice {
        raw_float: f64,
        roll: f64,
    },
    Roulette {
        pocket: u8,
    },
}

/// The outcome of evaluating one game for one nonce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub metric: f64,
    pub metric_label: &'static str,
    pub details: GameDetails,
}

/// Static identity of a game, independent of any particular nonce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub metric_label: &'static str,
}

/// Typed, validated parameters for one game invocation. Unknown keys in the
/// wire-level map are rejected before a game ever sees them.
pub type RawParams = BTreeMap<String, String>;

/// The evaluator contract every game implements.
pub trait Game: Send + Sync {
    fn spec(&self) -> GameSpec;

    /// Number of floats this game draws, starting at cursor 0, for one nonce.
    /// Must not depend on anything but `params` (and must match what
    /// `evaluate` actually draws).
    fn float_count(&self, params: &RawParams) -> Result<usize, EngineError>;

    /// Evaluate the game for one `(seeds, nonce)` pair. `server`/`client` are
    /// raw seed bytes; `nonce` selects the byte stream.
    fn evaluate(
        &self,
        server: &[u8],
        client: &[u8],
        nonce: u64,
        params: &RawParams,
    ) -> Result<GameResult, EngineError>;
}

fn registry() -> &'static BTreeMap<&'static str, Box<dyn Game>> {
    static REGISTRY: OnceLock<BTreeMap<&'static str, Box<dyn Game>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let games: Vec<Box<dyn Game>> = vec![
            Box::new(limbo::Limbo),
            Box::new(dice::Dice),
            Box::new(roulette::Roulette),
        ];
        games.into_iter().map(|g| (g.spec().id, g)).collect()
    })
}

/// Look up a game by its lowercase, stable id.
pub fn lookup(id: &str) -> Result<&'static dyn Game, EngineError> {
    registry()
        .get(id)
        .map(|g| g.as_ref())
        .ok_or_else(|| EngineError::game_not_found(id))
}

/// Enumerate every registered game, for the `GamesList` external interface.
pub fn list() -> Vec<GameSpec> {
    registry().values().map(|g| g.spec()).collect()
}

/// Reject any key in `params` that isn't in `allowed`, producing a single
/// `invalid_params` error naming every offending key.
pub(crate) fn reject_unknown_keys(params: &RawParams, allowed: &[&str]) -> Result<(), EngineError> {
    let unknown: Vec<&str> = params
        .keys()
        .map(String::as_str)
        .filter(|k| !allowed.contains(k))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(EngineError::invalid_params(format!(
            "unknown params: {}",
            unknown.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_all_three_games() {
        let ids: Vec<&str> = list().iter().map(|s| s.id).collect();
        assert!(ids.contains(&"limbo"));
        assert!(ids.contains(&"dice"));
        assert!(ids.contains(&"roulette"));
    }

    #[test]
    fn unknown_game_id_fails() {
        let err = lookup("blackjack").unwrap_err();
        assert_eq!(err.kind(), "game_not_found");
    }

    #[test]
    fn reject_unknown_keys_flags_extras() {
        let mut params = RawParams::new();
        params.insert("house_edge".into(), "0.98".into());
        params.insert("bogus".into(), "1".into());

        let err = reject_unknown_keys(&params, &["house_edge"]).unwrap_err();
        assert_eq!(err.kind(), "invalid_params");
    }
}

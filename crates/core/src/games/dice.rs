//! Dice: a single roll in `[0, 100)`, two decimal places, never clamped.

use super::{reject_unknown_keys, Game, GameDetails, GameResult, GameSpec, RawParams};
use crate::error::EngineError;
use crate::float::floats;

pub struct Dice;

impl Game for Dice {
    fn spec(&self) -> GameSpec {
        GameSpec {
            id: "dice",
            name: "Dice",
            metric_label: "roll",
        }
    }

    fn float_count(&self, params: &RawParams) -> Result<usize, EngineError> {
        reject_unknown_keys(params, &[])?;
        Ok(1)
    }

    fn evaluate(
        &self,
        server: &[u8],
        client: &[u8],
        nonce: u64,
        params: &RawParams,
    ) -> Result<GameResult, EngineError> {
        reject_unknown_keys(params, &[])?;
        let f = floats(server, client, nonce, 0, 1)[0];

        // Literal 10001, not 10000: the roll can land exactly on 100.00.
        let roll = (f * 10001.0) / 100.0;

        Ok(GameResult {
            metric: roll,
            metric_label: "roll",
            details: GameDetails::Dice {
                raw_float: f,
                roll,
            },
        })
    }
}

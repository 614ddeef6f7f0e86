//! European roulette: a single pocket in `0..=36`.

use super::{reject_unknown_keys, Game, GameDetails, GameResult, GameSpec, RawParams};
use crate::error::EngineError;
use crate::float::floats;

pub struct Roulette;

impl Game for Roulette {
    fn spec(&self) -> GameSpec {
        GameSpec {
            id: "roulette",
            name: "European Roulette",
            metric_label: "pocket",
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

        // f is in [0, 1), so f * 37 is in [0, 37) and floor lands in 0..=36.
        let pocket_metric = (f * 37.0).floor();
        let pocket = pocket_metric as u8;

        Ok(GameResult {
            metric: pocket_metric,
            metric_label: "pocket",
            details: GameDetails::Roulette { pocket },
        })
    }
}

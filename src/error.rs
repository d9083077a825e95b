// Error type for the move-evaluation engine
//
// Everything below the session layer (board, sensor, matrix, network, engine)
// reports failures through EngineError. Outer layers (config, router, client,
// replay) turn these into String messages with map_err, like the rest of the crate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A vector or matrix did not have the width an operation required
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// The flat parameter sequence does not fit the declared architecture
    #[error("network needs exactly {expected} parameters, got {found}")]
    ParameterCount { expected: usize, found: usize },

    #[error("parameter {index} is not a finite number ({value})")]
    NonFiniteParameter { index: usize, value: f64 },

    /// The snapshot does not contain exactly one live snake with our id
    #[error("snapshot has {matches} live snake(s) with id '{player_id}', expected exactly one")]
    MissingOwnHead { player_id: String, matches: usize },

    /// A move was requested before the server assigned us a player id
    #[error("no player id registered yet")]
    UnregisteredPlayer,

    /// A position index that does not address a cell of the grid
    #[error("position {position} is outside the {cells}-cell board")]
    PositionOutOfBounds { position: usize, cells: usize },

    /// The snapshot was taken on a board of a different size
    #[error("snapshot board is {width}x{height}, engine is configured for {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
}

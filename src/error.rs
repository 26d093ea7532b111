use thiserror::Error;

/// Errors raised while configuring, building or reading a neighbor list.
#[derive(Debug, Error)]
pub enum NeighborError {
    /// A point index, or a position inside one point's neighbor list, is past the end.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The parallel query phase did not run to completion.
    ///
    /// The partially filled lists are dropped; the simulation cannot continue
    /// with incomplete neighbor information.
    #[error("neighbor list construction failed: {0}")]
    BuildFailure(String),

    /// A dedicated thread pool for the build could not be started.
    #[error("failed to start the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The spatial index was built over a different number of points than the
    /// builder was given.
    #[error("spatial index holds {index} points but the point cloud has {points}")]
    PointCountMismatch { index: usize, points: usize },

    /// A base horizon passed to [`crate::NeighborDeck::effective_horizon`] is
    /// zero, negative, NaN or infinite.
    #[error("horizon must be positive and finite, got {0}")]
    InvalidHorizon(f64),

    /// The deck's `Safety_Factor` is zero, negative, NaN or infinite.
    #[error("safety factor must be positive and finite, got {0}")]
    InvalidSafetyFactor(f64),

    /// A flat coordinate buffer whose length is not a multiple of the dimension.
    #[error("coordinate buffer of length {len} does not hold whole {dim}D points")]
    MalformedPoints { len: usize, dim: usize },

    /// The neighbor deck could not be parsed.
    #[error("invalid neighbor deck: {0}")]
    Config(#[from] serde_json::Error),
}

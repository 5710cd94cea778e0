//! Errors
//!
//! The error taxonomy from spec §7, as a `thiserror`-derived enum (see
//! `SPEC_FULL.md` §C for why `thiserror` rather than a hand-rolled impl).

/// Errors a [`crate::RenderBuffer`] operation can fail with.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    /// A relative operation was called without a prior `goto`.
    #[error("relative operation called with no virtual cursor set")]
    NoCursor,

    /// A relative operation received an explicit pen while a stored pen is active.
    #[error("relative operation given an explicit pen while a stored pen is active")]
    PenConflict,

    /// The caller passed coordinates or a length that cannot be transformed
    /// meaningfully (only reachable from relative operations; absolute operations
    /// silently no-op after clipping instead, per spec §7).
    #[error("coordinates or length out of range: {0}")]
    OutOfRange(&'static str),

    /// An internal inconsistency was detected (e.g. a `Cont` cell encountered as a
    /// head during flush). Indicates a bug in the implementation.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),
}

/// Convenience alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;

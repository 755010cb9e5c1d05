// src/error.rs
//! Error handling for the texture unit binder.
//!
//! - **Performance**: enum discriminant (cheap match), allocations *only* on error paths.
//! - **Features**: context chaining, custom messages, `is_*` kind helpers, `Result` alias.
//! - Works perfectly with `?`; all variants are `Clone` so callers can stash them.

use thiserror::Error;

/// Main error type — lightweight, deterministic, no I/O anywhere in this crate.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Hard capacity failure: every texture unit below the device limit is
    /// already assigned or reserved. Layout computation aborts immediately.
    #[error("ran out of texture units (device limit {limit})")]
    OutOfUnits { limit: u32 },

    /// Soft resolution failure: the program declares sampler uniforms with no
    /// registered texture under any matching name. The layout is still cached
    /// for the names that did resolve.
    #[error("program references unregistered samplers: {}", .0.join(", "))]
    MissingSamplers(Vec<String>),

    /// Simple custom message (allocation only when the error happens).
    #[error("{0}")]
    Custom(String),

    /// Rich context chaining (like anyhow but zero-cost when you control the types).
    #[error("{message}: {source}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a custom error message.
    #[inline]
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Self::Custom(msg.into())
    }

    /// Add context to any error (chainable).
    #[inline]
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    // === Kind checks, branch prediction friendly ===

    /// True for the hard unit-exhaustion failure.
    #[inline]
    pub fn is_capacity(&self) -> bool {
        matches!(self, Error::OutOfUnits { .. })
    }

    /// True for the soft unresolved-sampler failure.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Error::MissingSamplers(_))
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        matches!(self, Error::Custom(_))
    }
}

/// Convenient `Result` alias — use `crate::Result<T>` everywhere.
pub type Result<T> = std::result::Result<T, Error>;

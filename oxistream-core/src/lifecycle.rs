//! Stream lifecycle: disposal state and ownership of wrapped streams.
//!
//! Every stream carries a [`DisposeState`]. Public operations call
//! [`Disposable::ensure_open`] first and fail fast with
//! [`StreamError::Disposed`] once the stream has been torn down.
//!
//! Teardown is explicit ([`Dispose::dispose`]) and idempotent. Wrappers that
//! hold pending data also tear down on `Drop`, so resources are released on
//! every exit path even when `dispose` is never called.

use crate::error::{Result, StreamError};

/// Lifecycle state of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposeState {
    /// The stream accepts operations.
    #[default]
    Open,
    /// Torn down through the blocking path.
    Disposed,
    /// Torn down through the suspending path.
    DisposedAsync,
}

impl DisposeState {
    /// Check whether the stream has been torn down by either path.
    #[inline]
    pub fn is_disposed(self) -> bool {
        !matches!(self, Self::Open)
    }

    /// Fail with [`StreamError::Disposed`] unless the stream is open.
    #[inline]
    pub fn ensure_open(self, object: &'static str) -> Result<()> {
        if self.is_disposed() {
            Err(StreamError::disposed(object))
        } else {
            Ok(())
        }
    }
}

/// Whether a wrapper owns the stream it wraps.
///
/// An owning wrapper disposes its inner stream when it is disposed. A
/// borrowing wrapper leaves the inner stream open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Ownership {
    /// Dispose the inner stream together with the wrapper.
    #[default]
    Owned,
    /// Leave the inner stream open when the wrapper is disposed.
    Borrowed,
}

impl Ownership {
    /// Check whether the wrapper is responsible for disposing its inner stream.
    pub fn disposes_inner(self) -> bool {
        matches!(self, Self::Owned)
    }
}

/// A stream with an observable disposal state.
pub trait Disposable {
    /// Check whether the stream has been disposed.
    fn is_disposed(&self) -> bool;

    /// Type name used in disposed-access errors.
    fn object_name(&self) -> &'static str {
        "stream"
    }

    /// Fail with [`StreamError::Disposed`] if the stream has been disposed.
    #[inline]
    fn ensure_open(&self) -> Result<()> {
        if self.is_disposed() {
            Err(StreamError::disposed(self.object_name()))
        } else {
            Ok(())
        }
    }
}

/// Blocking, idempotent teardown.
pub trait Dispose: Disposable {
    /// Release the stream, flushing pending data first.
    ///
    /// Calling `dispose` on an already disposed stream is a no-op.
    fn dispose(&mut self) -> Result<()>;
}

impl<T: Disposable + ?Sized> Disposable for &mut T {
    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }

    fn object_name(&self) -> &'static str {
        (**self).object_name()
    }
}

impl<T: Dispose + ?Sized> Dispose for &mut T {
    fn dispose(&mut self) -> Result<()> {
        (**self).dispose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispose_state() {
        assert!(!DisposeState::Open.is_disposed());
        assert!(DisposeState::Disposed.is_disposed());
        assert!(DisposeState::DisposedAsync.is_disposed());
        assert_eq!(DisposeState::default(), DisposeState::Open);

        assert!(DisposeState::Open.ensure_open("x").is_ok());
        let err = DisposeState::Disposed.ensure_open("Widget").unwrap_err();
        assert!(matches!(err, StreamError::Disposed { object: "Widget" }));
    }

    #[test]
    fn test_ownership() {
        assert!(Ownership::default().disposes_inner());
        assert!(!Ownership::Borrowed.disposes_inner());
    }
}

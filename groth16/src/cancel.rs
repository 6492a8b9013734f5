use crate::errors::{Groth16Error, Result};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A shared flag that long-running setup and proving calls poll between
/// phases. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Withdraw a cancellation request. Clones see the flag cleared too.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Return true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Return `Cancelled` if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Groth16Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(Groth16Error::Cancelled));
    }

    #[test]
    fn reset_clears_every_clone() {
        let token = CancellationToken::new();
        let other = token.clone();
        token.cancel();
        other.reset();
        assert!(!token.is_cancelled());
        assert!(other.check().is_ok());
    }
}

//! Core, non-public data structures for the registry.

use crate::error::{Error, Result};

use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
  // Registrations currently being resolved on this thread. A registration that
  // shows up twice would wait on its own lock.
  static RESOLVING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// An RAII guard that marks a registration as being resolved on this thread.
///
/// Entering a registration that is already marked fails with
/// [`Error::CircularResolution`]. The mark is cleared when the guard drops.
pub(crate) struct ResolutionGuard {
  key: usize,
}

impl ResolutionGuard {
  pub(crate) fn enter(key: usize, contract: &'static str) -> Result<Self> {
    RESOLVING.with(|resolving| {
      if resolving.borrow_mut().insert(key) {
        Ok(Self { key })
      } else {
        Err(Error::CircularResolution { contract })
      }
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING.with(|resolving| {
      resolving.borrow_mut().remove(&self.key);
    });
  }
}

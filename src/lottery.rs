//! Probabilistic trigger for garbage collection.

use rand::Rng;

use crate::InvalidArgument;

/// Decides whether a cleanup pass runs on this request.
///
/// A lottery with a percentage of `2` wins roughly twice in a hundred draws.
/// `0` never wins and `100` always does, which makes both useful in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lottery {
    percentage: u8,
}

impl Lottery {
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `percentage` is greater than 100.
    pub fn new(percentage: u8) -> Result<Self, InvalidArgument> {
        if percentage > 100 {
            return Err(InvalidArgument::new(format!(
                "lottery percentage must be between 0 and 100, got {percentage}"
            )));
        }
        Ok(Self { percentage })
    }

    pub fn never() -> Self {
        Self { percentage: 0 }
    }

    pub fn always() -> Self {
        Self { percentage: 100 }
    }

    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    pub fn wins(&self) -> bool {
        rand::thread_rng().gen_range(0..100) < self.percentage
    }
}

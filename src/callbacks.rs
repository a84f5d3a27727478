use crate::clause::Lit;

/// Basic callbacks to the solver
///
/// Typically intended for termination control and proof logging
pub trait Callbacks: Sized {
    /// Should we stop? Polled at the safe points of every inprocessing
    /// pass (between schedule items and propagation rounds).
    fn stop(&self) -> bool {
        false
    }

    /// Called whenever the restart trigger fires.
    fn on_restart(&mut self) {}

    /// Called when a clause is marked garbage.
    ///
    /// ## Params
    /// - c: list of literals of the clause
    fn on_delete_clause(&mut self, _c: &[Lit]) {}
}

/// Basic set of callbacks
///
/// This doesn't do anything except storing a function to `stop`
pub struct Basic {
    stop: Option<Box<dyn Fn() -> bool>>, // to stop
}

impl Callbacks for Basic {
    fn stop(&self) -> bool {
        match self.stop {
            None => false,
            Some(ref f) => f(),
        }
    }
}

impl Basic {
    /// Allocate a new set of callbacks
    pub fn new() -> Self {
        Basic { stop: None }
    }

    /// Set the `stop` function
    pub fn set_stop<F>(&mut self, f: F)
    where
        F: 'static + Fn() -> bool,
    {
        self.stop = Some(Box::new(f));
    }
}

impl Default for Basic {
    fn default() -> Self {
        Self::new()
    }
}

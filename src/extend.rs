//! The extension stack and witness reconstruction.
//!
//! Clause elimination techniques that only preserve satisfiability record
//! each removed (weakened) clause here together with its conditional
//! autarky witness. After solving, replaying the stack backwards turns a
//! model of the reduced formula into a model of the original one. The
//! technique goes back to Soerensson's variable elimination in MiniSat.

use {
    crate::callbacks::Callbacks,
    crate::clause::{lbool, CRef, Lit},
    crate::core::Solver,
};

/// Consumer of `(clause, witness)` pairs, e.g. a DRAT or witness exporter.
///
/// Returning `false` stops the traversal.
pub trait WitnessIterator {
    fn witness(&mut self, clause: &[i32], witness: &[i32]) -> bool;
}

/// The append-only extension stack plus the external assignment built by
/// reconstruction.
///
/// Layout: repeated blocks `0 w₁ … wₖ 0 c₁ … cₘ` of signed external
/// literals, parsed backwards; the `w` block is the witness, the `c`
/// block the weakened clause. Zeros have no other meaning.
pub(crate) struct Extension {
    stack: Vec<i32>,
    /// External assignment indexed by external variable.
    vals: Vec<bool>,
    extended: bool,
}

impl Extension {
    pub fn new() -> Self {
        Self {
            stack: vec![],
            vals: vec![],
            extended: false,
        }
    }

    pub fn stack(&self) -> &[i32] {
        &self.stack
    }

    pub fn push_zero(&mut self) {
        trace!("pushing 0 on extension stack");
        self.stack.push(0);
    }

    pub fn push_witness(&mut self, elit: i32) {
        debug_assert!(elit != 0);
        trace!("pushing witness literal {} on extension stack", elit);
        self.stack.push(elit);
    }

    pub fn push_clause_lit(&mut self, elit: i32) {
        debug_assert!(elit != 0);
        trace!("pushing clause literal {} on extension stack", elit);
        self.stack.push(elit);
    }

    /// Value of an external literal under the reconstructed assignment;
    /// unknown variables read as false.
    fn sat(&self, elit: i32) -> bool {
        let idx = elit.abs() as usize;
        let b = self.vals.get(idx).copied().unwrap_or(false);
        if elit > 0 {
            b
        } else {
            !b
        }
    }

    fn set(&mut self, evar: usize, b: bool) {
        if evar >= self.vals.len() {
            self.vals.resize(evar + 1, false);
        }
        self.vals[evar] = b;
    }

    fn flip(&mut self, elit: i32) {
        let idx = elit.abs() as usize;
        self.set(idx, !self.vals.get(idx).copied().unwrap_or(false));
    }

    /// Replay the stack backwards over the current external assignment.
    /// Returns the number of flipped literals.
    fn replay(&mut self) -> u64 {
        let mut flipped = 0;
        let mut i = self.stack.len();
        while i > 0 {
            // walk the clause block; is it already satisfied?
            let mut satisfied = false;
            loop {
                i -= 1;
                let lit = self.stack[i];
                if lit == 0 {
                    break;
                }
                if satisfied {
                    continue;
                }
                if self.sat(lit) {
                    satisfied = true;
                }
            }
            debug_assert!(i > 0);
            if satisfied {
                // skip the witness block
                loop {
                    i -= 1;
                    if self.stack[i] == 0 {
                        break;
                    }
                }
            } else {
                // flip every falsified witness literal
                loop {
                    i -= 1;
                    let lit = self.stack[i];
                    if lit == 0 {
                        break;
                    }
                    if !self.sat(lit) {
                        trace!("flipping blocking literal {}", lit);
                        self.flip(lit);
                        flipped += 1;
                    }
                }
            }
        }
        flipped
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Translate an internal literal to its external signed encoding.
    ///
    /// The core performs no variable renumbering, so this is the fixed
    /// DIMACS translation; a future remapping layer only has to change
    /// this function.
    #[inline(always)]
    pub(crate) fn externalize(&self, l: Lit) -> i32 {
        l.to_dimacs()
    }

    /// Record a weakened clause and its witness literal `pivot` on the
    /// extension stack. `pivot` must occur in the clause.
    pub fn weaken_clause(&mut self, cref: CRef, pivot: Lit) {
        let (size, lits): (u64, Vec<Lit>) = {
            let c = self.ca.get_ref(cref);
            debug_assert!(c.lits().contains(&pivot));
            (c.size() as u64, c.lits().to_vec())
        };
        self.stats.weakened += 1;
        self.stats.weakenedlen += size;
        self.extension.push_zero();
        let w = self.externalize(pivot);
        self.extension.push_witness(w);
        self.extension.push_zero();
        for &l in &lits {
            let e = self.externalize(l);
            self.extension.push_clause_lit(e);
        }
    }

    /// Record a weakened binary clause `(pivot ∨ other)` with witness
    /// `pivot`.
    pub fn weaken_binary(&mut self, pivot: Lit, other: Lit) {
        self.stats.weakened += 1;
        self.stats.weakenedlen += 2;
        self.extension.push_zero();
        let w = self.externalize(pivot);
        self.extension.push_witness(w);
        self.extension.push_zero();
        self.extension.push_clause_lit(w);
        let e = self.externalize(other);
        self.extension.push_clause_lit(e);
    }

    /// Record an externally supplied clause/witness pair (the restore
    /// path of an incremental frontend).
    pub fn push_clause_and_witness(&mut self, clause: &[i32], witness: &[i32]) {
        self.extension.push_zero();
        for &elit in witness {
            debug_assert!(elit != 0 && elit != i32::MIN);
            self.extension.push_witness(elit);
        }
        self.extension.push_zero();
        for &elit in clause {
            debug_assert!(elit != 0 && elit != i32::MIN);
            self.extension.push_clause_lit(elit);
        }
    }

    /// Reconstruct an external model of the original formula from the
    /// internal assignment and the extension stack.
    ///
    /// Goes backward over the stack and flips witness literals of every
    /// recorded clause the current external assignment does not satisfy.
    pub fn extend(&mut self) {
        debug_assert_eq!(self.values.level, 0);
        self.stats.extensions += 1;

        let mut updated = 0u64;
        for vi in 0..self.num_vars() {
            let v = crate::clause::Var::from_idx(vi);
            let l = Lit::new(v, true);
            let evar = self.externalize(l);
            debug_assert!(evar > 0);
            let b = self.values.lit(l) == lbool::TRUE;
            self.extension.set(evar as usize, b);
            updated += 1;
        }
        info!("updated {} external assignments", updated);

        let flipped = self.extension.replay();
        info!("flipped {} literals during extension", flipped);
        self.stats.extended += flipped;
        self.extension.extended = true;
    }

    /// Value of an external literal after `extend()`.
    pub fn extended_value(&self, elit: i32) -> bool {
        debug_assert!(self.extension.extended);
        self.extension.sat(elit)
    }

    /// Traverse `(clause, witness)` pairs on the extension stack from the
    /// most recent to the oldest, skipping blocks already satisfied by
    /// root-level units. Returns `false` if the iterator stopped early.
    pub fn traverse_witnesses(&self, it: &mut impl WitnessIterator) -> bool {
        if !self.ok {
            return true;
        }

        let mut clause: Vec<i32> = vec![];
        let mut witness: Vec<i32> = vec![];
        let stack = self.extension.stack();
        let mut i = stack.len();
        while i > 0 {
            let mut satisfied = false;
            loop {
                i -= 1;
                let elit = stack[i];
                if elit == 0 {
                    break;
                }
                if satisfied {
                    continue;
                }
                let tmp = self.fixed(Lit::from_dimacs(elit));
                if tmp == lbool::FALSE {
                    continue;
                }
                if tmp == lbool::TRUE {
                    satisfied = true;
                } else {
                    clause.push(elit);
                }
            }
            loop {
                i -= 1;
                let elit = stack[i];
                if elit == 0 {
                    break;
                }
                if satisfied {
                    continue;
                }
                if self.fixed(Lit::from_dimacs(elit)) != lbool::UNDEF {
                    continue;
                }
                witness.push(elit);
            }
            if !satisfied {
                clause.reverse();
                witness.reverse();
                if !it.witness(&clause, &witness) {
                    return false;
                }
            }
            clause.clear();
            witness.clear();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BasicSolver;

    struct Collect(Vec<(Vec<i32>, Vec<i32>)>);
    impl WitnessIterator for Collect {
        fn witness(&mut self, clause: &[i32], witness: &[i32]) -> bool {
            self.0.push((clause.to_vec(), witness.to_vec()));
            true
        }
    }

    #[test]
    fn test_weaken_and_extend_flips() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        let cr = s.iter_clauses().next().unwrap();
        // drop (1 ∨ 2) with witness 1
        s.weaken_clause(cr, Lit::from_dimacs(1));
        s.mark_garbage(cr);
        assert_eq!(s.extension_stack(), &[0, 1, 0, 1, 2]);
        assert_eq!(s.stats().weakened, 1);
        // internal assignment falsifies the clause; the witness flips 1
        s.assign_unit(Lit::from_dimacs(-1));
        s.assign_unit(Lit::from_dimacs(-2));
        s.extend();
        assert!(s.extended_value(1));
        assert!(!s.extended_value(2));
        assert_eq!(s.stats().extended, 1);
    }

    #[test]
    fn test_extend_skips_satisfied_blocks() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        let cr = s.iter_clauses().next().unwrap();
        s.weaken_clause(cr, Lit::from_dimacs(1));
        s.mark_garbage(cr);
        s.assign_unit(Lit::from_dimacs(-1));
        s.assign_unit(Lit::from_dimacs(2));
        s.extend();
        // clause satisfied by 2; nothing flipped
        assert!(!s.extended_value(1));
        assert!(s.extended_value(2));
        assert_eq!(s.stats().extended, 0);
    }

    #[test]
    fn test_later_blocks_replay_first() {
        // (1 ∨ 2) is blocked on 1 against (-1 ∨ -2); once it is gone,
        // (-1 ∨ -2) is vacuously blocked on -1
        let mut s = BasicSolver::default();
        s.var_of_int(1);
        s.push_clause_and_witness(&[1, 2], &[1]);
        s.push_clause_and_witness(&[-1, -2], &[-1]);
        s.extend();
        // all-false start: the newest block holds via -1, the older one
        // forces the flip of 1, which the newer block tolerates via -2
        assert!(s.extended_value(1));
        assert!(!s.extended_value(2));
    }

    #[test]
    fn test_traverse_witnesses_order_and_content() {
        let mut s = BasicSolver::default();
        s.var_of_int(2);
        s.push_clause_and_witness(&[1, 2], &[1]);
        s.push_clause_and_witness(&[-2, 3], &[-2]);
        let mut it = Collect(vec![]);
        assert!(s.traverse_witnesses(&mut it));
        assert_eq!(
            it.0,
            vec![(vec![-2, 3], vec![-2]), (vec![1, 2], vec![1])]
        );
        // every witness literal occurs in its clause
        for (c, w) in &it.0 {
            for wl in w {
                assert!(c.contains(wl));
            }
        }
    }

    #[test]
    fn test_traverse_skips_fixed_satisfied() {
        let mut s = BasicSolver::default();
        s.var_of_int(1);
        s.push_clause_and_witness(&[1, 2], &[1]);
        s.assign_unit(Lit::from_dimacs(2));
        let mut it = Collect(vec![]);
        assert!(s.traverse_witnesses(&mut it));
        assert!(it.0.is_empty());
    }

    #[test]
    fn test_traverse_stops_early() {
        struct StopFirst(u32);
        impl WitnessIterator for StopFirst {
            fn witness(&mut self, _c: &[i32], _w: &[i32]) -> bool {
                self.0 += 1;
                false
            }
        }
        let mut s = BasicSolver::default();
        s.var_of_int(1);
        s.push_clause_and_witness(&[1, 2], &[1]);
        s.push_clause_and_witness(&[-1, 2], &[-1]);
        let mut it = StopFirst(0);
        assert!(!s.traverse_witnesses(&mut it));
        assert_eq!(it.0, 1);
    }
}

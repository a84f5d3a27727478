//! Covered clause elimination.
//!
//! A clause is covered if asymmetric and covered literal addition extend
//! it into a tautology; removing it preserves satisfiability provided a
//! witness is recorded on the extension stack. The engine runs two
//! propagation engines to a fixed point per candidate: a watched-literal
//! propagator specialized to ignore the candidate, and an
//! occurrence-list propagator intersecting the resolution candidates.

use {
    crate::callbacks::Callbacks,
    crate::clause::{lbool, CRef, Lit, OccLists, Var, Watch},
    crate::core::{Solver, Values},
};

/// Scratch state for covering one candidate clause.
///
/// `added` is a queue, not a set: literals are processed strictly in
/// order of discovery, with two cursors chasing its tail.
pub(crate) struct Coveror {
    /// Literals asymmetrically or covered-assumed, in order.
    added: Vec<Lit>,
    /// Literals of the candidate that were unassigned on entry.
    clause: Vec<Lit>,
    /// Literals introduced by covered literal addition.
    covered: Vec<Lit>,
    /// Extension blocks collected for replay (external encoding,
    /// zero-separated).
    extend: Vec<i32>,
    /// Scratch of the covered propagator.
    intersection: Vec<Lit>,
    next_asymmetric: usize,
    next_covered: usize,
}

impl Coveror {
    pub fn new() -> Self {
        Self {
            added: vec![],
            clause: vec![],
            covered: vec![],
            extend: vec![],
            intersection: vec![],
            next_asymmetric: 0,
            next_covered: 0,
        }
    }

    /// Write the prefix of one extension block: the witness literal
    /// followed by the weakened clause without it. Exactly one occurrence
    /// of `lit` must be found among the combined literals.
    fn push_extension(&mut self, lit: Lit) {
        self.extend.push(0);
        self.extend.push(lit.to_dimacs());
        let mut found = false;
        for i in 0..self.clause.len() + self.covered.len() {
            let other = if i < self.clause.len() {
                self.clause[i]
            } else {
                self.covered[i - self.clause.len()]
            };
            if other == lit {
                debug_assert!(!found);
                found = true;
            } else {
                self.extend.push(other.to_dimacs());
            }
        }
        debug_assert!(found);
        let _ = found;
    }
}

/// Assume `lit` false at the synthetic decision level and queue it for
/// propagation.
fn asymmetric_literal_addition(values: &mut Values, coveror: &mut Coveror, lit: Lit) {
    trace!("asymmetric literal addition {:?}", lit);
    values.set_false(lit);
    coveror.added.push(lit);
}

impl<Cb: Callbacks> Solver<Cb> {
    fn covered_literal_addition(&mut self, lit: Lit, coveror: &mut Coveror) {
        debug_assert_eq!(self.values.level, 1);
        coveror.push_extension(lit);
        for i in 0..coveror.intersection.len() {
            let other = coveror.intersection[i];
            trace!("covered literal addition {:?}", other);
            self.values.set_false(other);
            coveror.covered.push(other);
            coveror.added.push(other);
        }
    }

    /// Asymmetric watched-literal propagation of the false literal `lit`,
    /// ignoring the candidate clause. Returns true if some clause became
    /// empty under the extended assignment, i.e. the candidate extension
    /// is subsumed and the candidate is a tautology.
    ///
    /// In essence this is `propagate` specialized for covering: it skips
    /// the candidate, derives asymmetric literals instead of enqueuing,
    /// and reports subsumption instead of conflicts.
    pub(crate) fn cover_propagate_asymmetric(
        &mut self,
        lit: Lit,
        ignore: CRef,
        coveror: &mut Coveror,
    ) -> bool {
        self.stats.propagations.cover += 1;
        debug_assert_eq!(self.values.lit(lit), lbool::FALSE);
        let mut subsumed = false;
        trace!("asymmetric literal propagation of {:?}", lit);

        let watches_ptr: *mut OccLists<Lit, Watch> = &mut self.watches;
        let ws = &mut self.watches[lit];
        let end = ws.len();
        let mut i = 0;
        let mut j = 0;
        while !subsumed && i < end {
            let w = ws[i];
            ws[j] = w;
            i += 1;
            j += 1;
            if w.cref == ignore {
                continue; // costly but necessary here
            }
            let b = self.values.lit(w.blit);
            if b == lbool::TRUE {
                continue;
            }
            if self.ca.get_ref(w.cref).garbage() {
                j -= 1;
                continue;
            }
            if w.binary() {
                if b == lbool::FALSE {
                    trace!("found subsuming binary");
                    subsumed = true;
                } else {
                    asymmetric_literal_addition(&mut self.values, coveror, !w.blit);
                }
            } else {
                // make sure the false literal is second
                let mut c = self.ca.get_mut(w.cref);
                let other = if c[0] == lit { c[1] } else { c[0] };
                c[0] = other;
                c[1] = lit;
                let u = self.values.lit(other);
                if u == lbool::TRUE {
                    ws[j - 1].blit = other;
                    continue;
                }
                // search a replacement from `pos`, wrapping around to 2
                let size = c.size() as usize;
                let pos = c.pos() as usize;
                debug_assert!(2 <= pos && pos <= size);
                let mut repl = None;
                for k in (pos..size).chain(2..pos) {
                    let r = c[k as u32];
                    let v = self.values.lit(r);
                    if v != lbool::FALSE {
                        repl = Some((k, r, v));
                        break;
                    }
                }
                match repl {
                    Some((k, r, v)) => {
                        c.set_pos(k as u32);
                        if v == lbool::TRUE {
                            ws[j - 1].blit = r;
                        } else {
                            // unwatch `lit`, watch `r` instead
                            trace!("unwatch {:?}", lit);
                            let cm = c.lits_mut();
                            cm[1] = r;
                            cm[k] = lit;
                            debug_assert_ne!(r, lit);
                            unsafe { &mut (&mut *watches_ptr)[r] }
                                .push(Watch::new(w.cref, lit, w.size));
                            j -= 1;
                        }
                    }
                    None => {
                        if u == lbool::UNDEF {
                            asymmetric_literal_addition(&mut self.values, coveror, !other);
                        } else {
                            trace!("found subsuming clause");
                            subsumed = true;
                        }
                    }
                }
            }
        }
        if j < i {
            while i < end {
                ws[j] = ws[i];
                j += 1;
                i += 1;
            }
            ws.truncate(j);
        }
        subsumed
    }

    /// Covered literal propagation of the false literal `lit` over the
    /// occurrence lists of its negation. Returns true if the candidate
    /// turned out blocked (all resolution candidates tautological).
    pub(crate) fn cover_propagate_covered(&mut self, lit: Lit, coveror: &mut Coveror) -> bool {
        debug_assert_eq!(self.values.lit(lit), lbool::FALSE);
        if self.frozen(lit) {
            trace!("no covered propagation on frozen literal {:?}", lit);
            return false;
        }
        self.stats.propagations.cover += 1;
        trace!("covered propagation of {:?}", lit);
        debug_assert!(coveror.intersection.is_empty());

        let nlit = !lit;
        let mut first = true;
        let len = self.occs[nlit].len();
        let mut idx = 0;
        while idx < len {
            let cref = self.occs[nlit][idx];
            if self.ca.get_ref(cref).garbage() {
                idx += 1;
                continue;
            }
            let mut blocked = false;
            {
                let c = self.ca.get_ref(cref);
                for &other in c.lits() {
                    if other == nlit {
                        continue;
                    }
                    let tmp = self.values.lit(other);
                    if tmp == lbool::FALSE {
                        continue;
                    }
                    if tmp == lbool::TRUE {
                        blocked = true;
                        break;
                    }
                    if first {
                        coveror.intersection.push(other);
                        self.marks.mark(other);
                    } else if self.marks.marked(other) > 0 {
                        self.marks.unmark(other);
                    }
                }
            }
            if blocked {
                trace!("blocked resolution candidate");
                self.marks.unmark_all(&coveror.intersection);
                coveror.intersection.clear();
                idx += 1;
                continue;
            }
            if !first {
                // keep the candidates this clause also contains
                let mut j = 0;
                for i in 0..coveror.intersection.len() {
                    let other = coveror.intersection[i];
                    coveror.intersection[j] = other;
                    j += 1;
                    let tmp = self.marks.marked(other);
                    debug_assert!(tmp >= 0);
                    if tmp > 0 {
                        j -= 1;
                        self.marks.unmark(other);
                    } else {
                        self.marks.mark(other);
                    }
                }
                coveror.intersection.truncate(j);
            }
            first = false;
            if coveror.intersection.is_empty() {
                // rotate this clause to the front so the next invocation
                // starts with it
                let os = &mut self.occs[nlit];
                let c = os[idx];
                for t in (1..=idx).rev() {
                    os[t] = os[t - 1];
                }
                os[0] = c;
                break;
            }
            idx += 1;
        }

        let mut res = false;
        if first {
            trace!("all resolution candidates with {:?} blocked", nlit);
            coveror.push_extension(lit);
            res = true;
        } else if coveror.intersection.is_empty() {
            trace!("empty intersection of resolution candidate literals");
        } else {
            trace!("non-empty intersection of resolution candidate literals");
            self.covered_literal_addition(lit, coveror);
            self.marks.unmark_all(&coveror.intersection);
            coveror.intersection.clear();
        }

        self.marks.unmark_all(&coveror.intersection);
        coveror.intersection.clear();

        res
    }

    /// Try to eliminate one candidate clause. Returns whether it was
    /// removed. The synthetic decision level and every assignment made
    /// here are reverted on all paths.
    pub(crate) fn cover_clause(&mut self, cref: CRef, coveror: &mut Coveror) -> bool {
        debug_assert!(!self.ca.get_ref(cref).garbage());
        trace!("trying covered clause elimination on {:?}", self.ca.get_ref(cref));

        let mut satisfied = false;
        for &l in self.ca.get_ref(cref).lits() {
            if self.values.lit(l) == lbool::TRUE {
                satisfied = true;
            }
        }
        if satisfied {
            debug!("clause already satisfied");
            self.mark_garbage(cref);
            return false;
        }

        debug_assert!(coveror.added.is_empty());
        debug_assert!(coveror.extend.is_empty());
        debug_assert!(coveror.clause.is_empty());
        debug_assert!(coveror.covered.is_empty());

        debug_assert_eq!(self.values.level, 0);
        self.values.level = 1;
        trace!("assuming literals of candidate clause");
        for &l in self.ca.get_ref(cref).lits() {
            if self.values.lit(l) == lbool::UNDEF {
                asymmetric_literal_addition(&mut self.values, coveror, l);
                coveror.clause.push(l);
            }
        }

        let mut tautological = false;
        coveror.next_asymmetric = 0;
        coveror.next_covered = 0;

        while !tautological {
            if coveror.next_asymmetric < coveror.added.len() {
                while !tautological && coveror.next_asymmetric < coveror.added.len() {
                    let l = coveror.added[coveror.next_asymmetric];
                    coveror.next_asymmetric += 1;
                    tautological = self.cover_propagate_asymmetric(l, cref, coveror);
                }
            } else if coveror.next_covered < coveror.added.len() {
                let l = coveror.added[coveror.next_covered];
                coveror.next_covered += 1;
                tautological = self.cover_propagate_covered(l, coveror);
            } else {
                break;
            }
        }

        if tautological {
            if coveror.covered.is_empty() {
                self.stats.cover.asymmetric += 1;
                self.stats.cover.total += 1;
                debug!("asymmetric tautological clause");
            } else {
                self.stats.cover.blocked += 1;
                self.stats.cover.total += 1;
                debug!("covered tautological clause");
            }
            self.mark_garbage(cref);

            // replay the collected blocks, inserting the
            // `0 witness 0 clause` framing
            let mut prev = i32::MIN;
            for &tok in &coveror.extend {
                if prev == 0 {
                    self.extension.push_zero();
                    self.extension.push_witness(tok);
                    self.extension.push_zero();
                }
                if tok != 0 {
                    self.extension.push_clause_lit(tok);
                }
                prev = tok;
            }
        }

        debug_assert_eq!(self.values.level, 1);
        for &l in &coveror.added {
            self.values.unset(l);
        }
        self.values.level = 0;

        coveror.covered.clear();
        coveror.extend.clear();
        coveror.clause.clear();
        coveror.added.clear();
        self.marks.check_clear();

        tautological
    }

    /// The covered clause elimination pass. Returns the number of
    /// eliminated clauses; 0 when disabled, unsatisfiable, terminated or
    /// without progress.
    pub fn cover(&mut self) -> u64 {
        if !self.opts().cover {
            return 0;
        }
        if !self.ok || self.terminating() || self.num_irredundant == 0 {
            return 0;
        }

        // Producing the clauses needed on the reconstruction stack for
        // extending the witness requires a covered literal addition step
        // which (empirically) conflicts with flushing while restoring
        // clauses, yielding invalid witnesses on rare traces. The
        // combination stays disabled until the root cause is understood.
        if self.opts().restoreflush {
            return 0;
        }

        self.stats.cover.count += 1;
        let mut covered = 0u64;

        // variable elimination may have left unpropagated units
        if self.values.propagated < self.values.trail.len() {
            self.connect_watches(false); // need to propagate over all clauses
            if self.propagate().is_some() {
                debug!("propagating units before covered clause elimination gives empty clause");
                self.ok = false;
            }
            self.reset_watches();
            if !self.ok {
                return 0;
            }
        }
        debug_assert_eq!(self.values.propagated, self.values.trail.len());

        self.connect_watches(true); // irredundant watches are enough

        let mut delta = self
            .stats
            .propagations
            .search
            .saturating_mul(self.opts().coverreleff as u64)
            / 1000;
        if delta < self.opts().covermineff {
            delta = self.opts().covermineff;
        }
        if delta > self.opts().covermaxeff {
            delta = self.opts().covermaxeff;
        }
        delta = delta.max(2 * self.active_vars());
        info!("covered clause elimination limit of {} propagations", delta);
        let limit = self.stats.propagations.cover + delta;

        // schedule all candidates, filling occurrence lists on the way;
        // untried clauses first, previously tried ones after them
        let mut schedule: Vec<CRef> = vec![];
        let mut untried = 0u64;
        for i in 0..self.clauses.len() {
            let cref = self.clauses[i];
            {
                let c = self.ca.get_ref(cref);
                debug_assert!(!c.frozen());
                if c.garbage() || c.redundant() {
                    continue;
                }
            }
            let mut satisfied = false;
            let mut allfrozen = true;
            {
                let c = self.ca.get_ref(cref);
                for &l in c.lits() {
                    if self.values.lit(l) == lbool::TRUE {
                        satisfied = true;
                        break;
                    } else if allfrozen && !self.frozen(l) {
                        allfrozen = false;
                    }
                }
            }
            if satisfied {
                self.mark_garbage(cref);
                continue;
            }
            if allfrozen {
                self.ca.get_mut(cref).set_frozen(true);
                continue;
            }
            debug_assert!(self.ca.get_ref(cref).size() >= 2);
            for &l in self.ca.get_ref(cref).lits() {
                self.occs[l].push(cref);
            }
            if self.ca.get_ref(cref).covered() {
                continue;
            }
            schedule.push(cref);
            untried += 1;
        }

        if schedule.is_empty() {
            info!("no previously untried clause left");
            for i in 0..self.clauses.len() {
                let cref = self.clauses[i];
                let (garbage, redundant, frozen) = {
                    let c = self.ca.get_ref(cref);
                    (c.garbage(), c.redundant(), c.frozen())
                };
                if garbage || redundant {
                    continue;
                }
                if frozen {
                    self.ca.get_mut(cref).set_frozen(false);
                    continue;
                }
                debug_assert!(self.ca.get_ref(cref).covered());
                self.ca.get_mut(cref).set_covered(false);
                schedule.push(cref);
            }
        } else {
            for i in 0..self.clauses.len() {
                let cref = self.clauses[i];
                let (garbage, redundant, frozen, covered_flag) = {
                    let c = self.ca.get_ref(cref);
                    (c.garbage(), c.redundant(), c.frozen(), c.covered())
                };
                if garbage || redundant {
                    continue;
                }
                if frozen {
                    self.ca.get_mut(cref).set_frozen(false);
                    continue;
                }
                if !covered_flag {
                    continue;
                }
                schedule.push(cref);
            }
        }

        // previously tried clauses sort before untried ones, shorter
        // before longer; processing pops from the back, so untried
        // clauses are not starved
        {
            let ca = &self.ca;
            schedule.sort_by_key(|&cr| {
                let c = ca.get_ref(cr);
                (!c.covered(), c.size())
            });
        }
        info!("scheduled {} clauses with {} untried", schedule.len(), untried);

        // shorter candidate resolvents first for faster intersection
        // shrinkage
        for vi in 0..self.num_vars() {
            if self.values.var(Var::from_idx(vi)) != lbool::UNDEF {
                continue;
            }
            for &sign in &[true, false] {
                let l = Lit::new(Var::from_idx(vi), sign);
                let ca = &self.ca;
                self.occs[l].sort_by_key(|&cr| ca.get_ref(cr).size());
            }
        }

        let mut coveror = Coveror::new();
        while !self.terminating() && !schedule.is_empty() && self.stats.propagations.cover < limit
        {
            let cref = schedule.pop().unwrap();
            self.ca.get_mut(cref).set_covered(true);
            if self.cover_clause(cref, &mut coveror) {
                covered += 1;
            }
        }

        info!("eliminated {} covered clauses", covered);
        self.reset_occs();
        self.reset_watches();
        covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Basic;
    use crate::core::Opts;
    use crate::BasicSolver;
    use std::cell::Cell;
    use std::rc::Rc;

    fn lit(i: i32) -> Lit {
        Lit::from_dimacs(i)
    }

    /// Check a formula in DIMACS notation against an assignment given as
    /// a bit mask over variables 1..=nvars.
    fn satisfies(f: &[Vec<i32>], mask: u32) -> bool {
        f.iter().all(|c| {
            c.iter().any(|&l| {
                let b = mask & (1 << (l.abs() - 1)) != 0;
                if l > 0 {
                    b
                } else {
                    !b
                }
            })
        })
    }

    /// Collect the non-garbage clauses of the solver in DIMACS notation.
    fn remaining(s: &BasicSolver) -> Vec<Vec<i32>> {
        s.iter_clauses()
            .filter(|&cr| !s.is_garbage(cr))
            .map(|cr| s.clause_lits(cr).iter().map(|l| l.to_dimacs()).collect())
            .collect()
    }

    #[test]
    fn test_blocked_pair_eliminated() {
        // both (1 ∨ 2) and (1 ∨ -2) are blocked on 1
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[1, -2]);
        assert_eq!(s.cover(), 2);
        assert_eq!(s.stats().cover.total, 2);
        assert_eq!(s.stats().cover.asymmetric, 2);
        assert_eq!(s.num_clauses(), 0);
        assert_eq!(s.extension_stack(), &[0, 1, 0, 1, -2, 0, 1, 0, 1, 2]);

        // reconstruction from the all-false model of the empty reduced
        // formula must flip 1
        s.assign_unit(lit(-1));
        s.assign_unit(lit(-2));
        s.extend();
        assert!(s.extended_value(1));
        assert!(!s.extended_value(2));
    }

    #[test]
    fn test_covered_clause_blocked_via_addition() {
        // covered literal addition on pivot -2 adds 1, after which
        // (-2 ∨ -3) is blocked on -3 against (-1 ∨ 3)
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[-1, 3]);
        s.add_dimacs(&[-2, -3]);
        assert_eq!(s.cover(), 3);
        assert_eq!(s.stats().cover.blocked, 2);
        assert_eq!(s.stats().cover.asymmetric, 1);

        // model recovery over every assignment of the (empty) reduced
        // formula
        let f = vec![vec![1, 2], vec![-1, 3], vec![-2, -3]];
        for mask in 0..8u32 {
            let mut t = BasicSolver::default();
            t.add_dimacs(&[1, 2]);
            t.add_dimacs(&[-1, 3]);
            t.add_dimacs(&[-2, -3]);
            assert_eq!(t.cover(), 3);
            for v in 1..=3i32 {
                let l = if mask & (1 << (v - 1)) != 0 { v } else { -v };
                t.assign_unit(lit(l));
            }
            t.extend();
            let mut out = 0u32;
            for v in 1..=3i32 {
                if t.extended_value(v) {
                    out |= 1 << (v - 1);
                }
            }
            assert!(satisfies(&f, out), "mask {:0>3b} gave {:0>3b}", mask, out);
        }
    }

    #[test]
    fn test_unsat_not_masked() {
        // unsatisfiable 2-variable formula; nothing is covered and the
        // reduced formula stays unsatisfiable
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[1, -2]);
        s.add_dimacs(&[-1, -2]);
        assert_eq!(s.cover(), 0);
        assert_eq!(s.num_clauses(), 4);
        let f = remaining(&s);
        assert!((0..4u32).all(|mask| !satisfies(&f, mask)));
    }

    #[test]
    fn test_long_covered_candidate() {
        // (1 ∨ 2 ∨ 3) is blocked: 2 has no negative occurrence
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2, 3]);
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-1, 3]);
        assert_eq!(s.cover(), 3);
        assert_eq!(
            &s.extension_stack()[..6],
            &[0, 2, 0, 2, 1, 3],
            "first block weakens the ternary clause with witness 2"
        );

        // any model of the reduced (empty) formula must extend to one
        // satisfying the ternary clause
        let f = vec![vec![1, 2, 3], vec![-1, 2], vec![-1, 3]];
        for mask in 0..8u32 {
            let mut t = BasicSolver::default();
            t.add_dimacs(&[1, 2, 3]);
            t.add_dimacs(&[-1, 2]);
            t.add_dimacs(&[-1, 3]);
            t.cover();
            let g = remaining(&t);
            if !satisfies(&g, mask) {
                continue;
            }
            for v in 1..=3i32 {
                let l = if mask & (1 << (v - 1)) != 0 { v } else { -v };
                if t.val(lit(l)) == lbool::UNDEF {
                    t.assign_unit(lit(l));
                }
            }
            t.extend();
            let mut out = 0u32;
            for v in 1..=3i32 {
                if t.extended_value(v) {
                    out |= 1 << (v - 1);
                }
            }
            assert!(satisfies(&f, out));
        }
    }

    #[test]
    fn test_cover_clause_keeps_watches_and_restores_state() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2, 3]);
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-1, 3]);
        s.connect_watches(true);
        for cref in s.iter_clauses().collect::<Vec<_>>() {
            for i in 0..s.clause_lits(cref).len() {
                let l = s.clause_lits(cref)[i];
                s.occs[l].push(cref);
            }
        }
        let candidate = s.iter_clauses().next().unwrap();
        let mut coveror = Coveror::new();
        assert!(s.cover_clause(candidate, &mut coveror));
        assert!(s.is_garbage(candidate));
        // synthetic level dropped, assignment fully reverted
        assert_eq!(s.values.level, 0);
        for v in 1..=3i32 {
            assert_eq!(s.val(lit(v)), lbool::UNDEF);
        }
        // watch invariant survives the early exits of the asymmetric
        // propagator
        s.check_watches(true);
        s.reset_occs();
        s.reset_watches();
    }

    #[test]
    fn test_empty_schedule_when_all_frozen() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.set_frozen(lit(1).var());
        s.set_frozen(lit(2).var());
        assert_eq!(s.cover(), 0);
        assert_eq!(s.num_clauses(), 1);
        assert!(s.extension_stack().is_empty());
        // the per-run frozen flag is cleared again
        let cr = s.iter_clauses().next().unwrap();
        assert!(!s.ca.get_ref(cr).frozen());
    }

    #[test]
    fn test_frozen_pivot_prevents_elimination() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[1, -2]);
        s.set_frozen(lit(1).var());
        assert_eq!(s.cover(), 0);
        assert_eq!(s.num_clauses(), 2);
        assert!(s.extension_stack().is_empty());
    }

    #[test]
    fn test_covered_flags_reset_when_all_tried() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[1, -2]);
        s.add_dimacs(&[-1, -2]);
        assert_eq!(s.cover(), 0);
        for cr in s.iter_clauses().collect::<Vec<_>>() {
            assert!(s.ca.get_ref(cr).covered());
        }
        // everything was tried; the next run reschedules all of it
        assert_eq!(s.cover(), 0);
        assert_eq!(s.stats().cover.count, 2);
        for cr in s.iter_clauses().collect::<Vec<_>>() {
            assert!(s.ca.get_ref(cr).covered());
        }
    }

    #[test]
    fn test_terminator_stops_between_candidates() {
        let calls = Rc::new(Cell::new(0u32));
        let mut cb = Basic::new();
        let c2 = calls.clone();
        cb.set_stop(move || {
            let n = c2.get() + 1;
            c2.set(n);
            n > 2
        });
        let mut s = crate::Solver::new(Opts::default(), cb);
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[1, -2]);
        // guard poll, then one candidate before the terminator fires
        assert_eq!(s.cover(), 1);
        assert_eq!(s.num_clauses(), 1);
    }

    #[test]
    fn test_restoreflush_guard() {
        let mut opts = Opts::default();
        opts.restoreflush = true;
        let mut s = crate::Solver::new(opts, Basic::new());
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[1, -2]);
        assert_eq!(s.cover(), 0);
        assert_eq!(s.stats().cover.count, 0);
    }

    #[test]
    fn test_disabled_by_option() {
        let mut opts = Opts::default();
        opts.cover = false;
        let mut s = crate::Solver::new(opts, Basic::new());
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[1, -2]);
        assert_eq!(s.cover(), 0);
    }

    #[test]
    fn test_pending_unit_conflict_derives_empty_clause() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-1, -2]);
        s.add_dimacs(&[1]);
        assert_eq!(s.cover(), 0);
        assert!(!s.is_ok());
        // further inprocessing is a no-op
        assert_eq!(s.cover(), 0);
        assert_eq!(s.transred(), 0);
    }

    #[test]
    fn test_satisfied_candidates_are_collected() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[3, 4]);
        s.assign_unit(lit(1));
        // (1 ∨ 2) is root-satisfied; scheduling garbage-collects it, and
        // (3 ∨ 4) alone is blocked either way
        let n = s.cover();
        assert!(s.is_garbage(s.iter_clauses().next().unwrap()));
        assert_eq!(n, 1);
    }

    // The multiplicative PRNG of MiniSat, enough for small random CNFs.
    fn drand(seed: &mut f64) -> f64 {
        *seed *= 1389796.0;
        let q = (*seed / 2147483647.0) as i32;
        *seed -= q as f64 * 2147483647.0;
        *seed / 2147483647.0
    }

    fn irand(seed: &mut f64, size: i32) -> i32 {
        (drand(seed) * size as f64) as i32
    }

    #[test]
    fn test_random_model_recovery() {
        let nvars = 5i32;
        for round in 0..40 {
            let mut seed = 91648253.0 + round as f64;
            let mut f: Vec<Vec<i32>> = vec![];
            let nclauses = 6 + irand(&mut seed, 8);
            for _ in 0..nclauses {
                let len = 2 + irand(&mut seed, 3);
                let mut c = vec![];
                while c.len() < len as usize {
                    let v = 1 + irand(&mut seed, nvars);
                    if c.iter().any(|&l: &i32| l.abs() == v) {
                        continue;
                    }
                    let l = if drand(&mut seed) < 0.5 { v } else { -v };
                    c.push(l);
                }
                f.push(c);
            }

            let mut s = BasicSolver::default();
            for c in &f {
                s.add_dimacs(c);
            }
            s.cover();
            assert!(s.is_ok());

            let g = remaining(&s);
            // every model of the reduced formula must extend to a model
            // of the original one
            for mask in 0..(1u32 << nvars) {
                if !satisfies(&g, mask) {
                    continue;
                }
                let mut t = BasicSolver::default();
                for c in &f {
                    t.add_dimacs(c);
                }
                t.cover();
                for v in 1..=nvars {
                    let l = if mask & (1 << (v - 1)) != 0 { v } else { -v };
                    if t.val(lit(l)) == lbool::UNDEF {
                        t.assign_unit(lit(l));
                    }
                }
                t.extend();
                let mut out = 0u32;
                for v in 1..=nvars {
                    if t.extended_value(v) {
                        out |= 1 << (v - 1);
                    }
                }
                assert!(
                    satisfies(&f, out),
                    "round {} mask {:0>5b} reconstructed {:0>5b}",
                    round,
                    mask,
                    out
                );
                break; // one model per round is plenty
            }
        }
    }
}

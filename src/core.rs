/*****************************************************************************************[core.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::callbacks::Callbacks,
    crate::clause::{lbool, CRef, ClauseAllocator, Lit, OccLists, VMap, Var, Watch},
    crate::extend::Extension,
    crate::intmap::IntMapBool,
    crate::reluctant::Reluctant,
};

#[cfg(feature = "logging")]
use crate::clause::display::Print;

/// The inprocessing core.
///
/// A `Solver` owns a clause database together with the assignment, watch,
/// occurrence and mark state needed by the simplification passes (covered
/// clause elimination and transitive reduction), plus the extension stack
/// used to reconstruct a model of the original formula afterwards.
///
/// It is parametrized by `Callbacks`, which mainly provides the
/// cooperative terminator.
pub struct Solver<Cb: Callbacks> {
    cb: Cb, // the callbacks
    opts: Opts,
    pub(crate) stats: Stats,

    /// List of all clauses (irredundant and redundant).
    pub(crate) clauses: Vec<CRef>,
    pub(crate) ca: ClauseAllocator,

    pub(crate) values: Values,
    pub(crate) marks: Marks,

    /// `watches[lit]` lists the clauses currently watching `lit`; scanned
    /// when `lit` becomes false. Built on entry to an inprocessing pass and
    /// torn down before it returns.
    pub(crate) watches: OccLists<Lit, Watch>,
    /// `occs[lit]` lists the clauses containing `lit`; only alive during
    /// covered clause elimination.
    pub(crate) occs: OccLists<Lit, CRef>,

    pub(crate) extension: Extension,
    reluctant: Reluctant,

    /// Literals pinned by the caller; they keep their external meaning and
    /// must not be used as elimination witnesses.
    frozen: IntMapBool<Var>,

    /// If `false`, the empty clause was derived. No simplification runs.
    pub(crate) ok: bool,

    next_var: Var,
    pub(crate) num_irredundant: u64,
    pub(crate) num_redundant: u64,
    /// Search propagation count at the end of the previous transitive
    /// reduction, for its effort budget.
    pub(crate) last_transred: u64,
}

/// The current root-level assignment, the trail and the synthetic
/// decision level used by covered clause elimination.
pub(crate) struct Values {
    vals: VMap<lbool>,
    pub(crate) trail: Vec<Lit>,
    /// Trail positions below this index have been propagated.
    pub(crate) propagated: usize,
    /// 0 outside of `cover_clause`, 1 inside.
    pub(crate) level: u32,
}

impl Values {
    fn new() -> Self {
        Self {
            vals: VMap::new(),
            trail: vec![],
            propagated: 0,
            level: 0,
        }
    }

    fn init_var(&mut self, v: Var) {
        self.vals.insert_default(v, lbool::UNDEF);
    }

    #[inline(always)]
    pub fn var(&self, v: Var) -> lbool {
        self.vals[v]
    }

    #[inline(always)]
    pub fn lit(&self, l: Lit) -> lbool {
        self.vals[l.var()] ^ !l.sign()
    }

    /// Make `l` true and record it on the trail.
    pub fn assign(&mut self, l: Lit) {
        debug_assert_eq!(self.lit(l), lbool::UNDEF, "lit {:?} should be undef", l);
        self.vals[l.var()] = lbool::new(l.sign());
        self.trail.push(l);
    }

    /// Make `l` false without touching the trail. Only valid at the
    /// synthetic decision level; the caller records `l` for unwinding.
    pub fn set_false(&mut self, l: Lit) {
        debug_assert_eq!(self.level, 1);
        debug_assert_eq!(self.lit(l), lbool::UNDEF);
        self.vals[l.var()] = lbool::new(!l.sign());
    }

    #[inline]
    pub fn unset(&mut self, l: Lit) {
        self.vals[l.var()] = lbool::UNDEF;
    }
}

/// Signed per-literal scratch marks.
///
/// Borrowed by covered propagation and the binary-graph search; every
/// scope must return them all-zero (checked in debug builds).
pub(crate) struct Marks {
    map: VMap<i8>,
}

impl Marks {
    fn new() -> Self {
        Self { map: VMap::new() }
    }

    fn init_var(&mut self, v: Var) {
        self.map.insert_default(v, 0);
    }

    pub fn mark(&mut self, l: Lit) {
        debug_assert_eq!(self.map[l.var()], 0);
        self.map[l.var()] = if l.sign() { 1 } else { -1 };
    }

    /// Positive if `l` itself is marked, negative if its negation is.
    #[inline(always)]
    pub fn marked(&self, l: Lit) -> i8 {
        let m = self.map[l.var()];
        if l.sign() {
            m
        } else {
            -m
        }
    }

    #[inline]
    pub fn unmark(&mut self, l: Lit) {
        self.map[l.var()] = 0;
    }

    pub fn unmark_all(&mut self, lits: &[Lit]) {
        for &l in lits {
            self.unmark(l);
        }
    }

    /// Debug check for the all-clear invariant at scope boundaries.
    pub fn check_clear(&self) {
        debug_assert!(self.map.iter().all(|(_, &m)| m == 0));
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(Opts::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    pub fn new(opts: Opts, cb: Cb) -> Self {
        assert!(opts.check());
        let mut reluctant = Reluctant::new();
        if opts.restart_period > 0 {
            reluctant.enable(opts.restart_period, opts.restart_limit);
        }
        Self {
            cb,
            opts,
            stats: Stats::default(),
            clauses: vec![],
            ca: ClauseAllocator::new(),
            values: Values::new(),
            marks: Marks::new(),
            watches: OccLists::new(),
            occs: OccLists::new(),
            extension: Extension::new(),
            reluctant,
            frozen: IntMapBool::new(),
            ok: true,
            next_var: Var::from_idx(0),
            num_irredundant: 0,
            num_redundant: 0,
            last_transred: 0,
        }
    }

    #[inline(always)]
    pub fn num_vars(&self) -> u32 {
        self.next_var.idx()
    }
    pub fn num_clauses(&self) -> u64 {
        self.num_irredundant
    }
    pub fn num_redundant(&self) -> u64 {
        self.num_redundant
    }
    pub fn is_ok(&self) -> bool {
        self.ok
    }
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Poll the cooperative terminator.
    pub(crate) fn terminating(&self) -> bool {
        self.cb.stop()
    }

    pub fn new_var(&mut self) -> Var {
        let v = self.next_var;
        self.next_var = Var::from_idx(self.next_var.idx() + 1);
        self.values.init_var(v);
        self.marks.init_var(v);
        self.frozen.reserve(v);
        self.watches.init(Lit::new(v, false));
        self.watches.init(Lit::new(v, true));
        self.occs.init(Lit::new(v, false));
        self.occs.init(Lit::new(v, true));
        v
    }

    /// Get the variable of the given index, creating it if needed.
    pub fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.num_vars() {
            self.new_var();
        }
        let var = Var::from_idx(v_idx);
        debug_assert_eq!(var.idx(), v_idx);
        var
    }

    /// Value of a literal under the current assignment.
    #[inline(always)]
    pub fn val(&self, l: Lit) -> lbool {
        self.values.lit(l)
    }

    /// Root-level value of a literal (same as `val` outside of the
    /// synthetic covering scope).
    pub(crate) fn fixed(&self, l: Lit) -> lbool {
        debug_assert_eq!(self.values.level, 0);
        self.values.lit(l)
    }

    /// Pin a variable: it will not be used as an elimination witness.
    pub fn set_frozen(&mut self, v: Var) {
        self.frozen.insert(v);
    }

    /// Release a pinned variable.
    pub fn melt(&mut self, v: Var) {
        self.frozen.set(v, false);
    }

    #[inline(always)]
    pub fn frozen(&self, l: Lit) -> bool {
        self.frozen[l.var()]
    }

    /// Add an irredundant clause. The passed vector is reused as scratch.
    /// Returns `false` if the empty clause was derived.
    pub fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add clause {:?}", clause);
        self.new_clause(clause, false, false)
    }

    /// Add a redundant (learnt) clause; `hyper` tags hyper binary
    /// resolvents, which transitive reduction skips.
    pub fn add_redundant_clause_reuse(&mut self, clause: &mut Vec<Lit>, hyper: bool) -> bool {
        debug!("add redundant clause {:?}", clause);
        self.new_clause(clause, true, hyper)
    }

    fn new_clause(&mut self, clause: &mut Vec<Lit>, redundant: bool, hyper: bool) -> bool {
        debug_assert!(!hyper || redundant);
        if !self.ok {
            return false;
        }
        debug_assert_eq!(self.values.level, 0);
        clause.sort_unstable();

        // remove duplicates, root-satisfied and root-falsified literals
        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.values.lit(lit_i);
            if value == lbool::TRUE || lit_i == !last_lit {
                return true; // tautological or already satisfied
            } else if value != lbool::FALSE && lit_i != last_lit {
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }
        clause.resize(j, Lit::UNDEF);

        if clause.is_empty() {
            self.ok = false;
            return false;
        } else if clause.len() == 1 {
            self.values.assign(clause[0]);
        } else {
            let cr = self.ca.alloc(&clause, redundant, hyper);
            self.clauses.push(cr);
            if redundant {
                self.num_redundant += 1;
            } else {
                self.num_irredundant += 1;
            }
        }
        true
    }

    /// Assign a unit literal at the root level.
    pub fn assign_unit(&mut self, l: Lit) {
        debug_assert_eq!(self.values.level, 0);
        self.values.assign(l);
    }

    /// Iterate over all clause handles (including garbage ones).
    pub fn iter_clauses(&self) -> impl Iterator<Item = CRef> + '_ {
        self.clauses.iter().copied()
    }

    pub fn clause_lits(&self, cref: CRef) -> &[Lit] {
        self.ca.get_ref(cref).lits()
    }

    pub fn is_garbage(&self, cref: CRef) -> bool {
        self.ca.get_ref(cref).garbage()
    }

    /// Mark a clause garbage. The transition is monotone; the clause is
    /// reclaimed later by `collect_garbage`.
    pub fn mark_garbage(&mut self, cref: CRef) {
        debug_assert!(!self.ca.get_ref(cref).garbage());
        {
            let c = self.ca.get_ref(cref);
            self.cb.on_delete_clause(c.lits());
        }
        let redundant = self.ca.get_ref(cref).redundant();
        self.ca.get_mut(cref).set_garbage(true);
        if redundant {
            self.num_redundant -= 1;
        } else {
            self.num_irredundant -= 1;
        }
        self.ca.free(cref);
    }

    /// Reclaim garbage clauses by rebuilding the arena.
    ///
    /// Watches and occurrences must be torn down (they hold clause
    /// handles, which this invalidates).
    pub fn collect_garbage(&mut self) {
        let mut to = ClauseAllocator::with_start_cap(self.ca.len() - self.ca.wasted());
        let ca = &self.ca;
        let mut kept = Vec::with_capacity(self.clauses.len());
        for &cref in &self.clauses {
            let c = ca.get_ref(cref);
            if c.garbage() {
                continue;
            }
            kept.push(to.alloc_copy(c));
        }
        debug!("collected {} dead clauses", self.clauses.len() - kept.len());
        self.clauses = kept;
        self.ca = to;
    }

    /// Fill the watch lists from the clause database. With
    /// `irredundant_only` redundant clauses are left unwatched.
    pub(crate) fn connect_watches(&mut self, irredundant_only: bool) {
        for i in 0..self.clauses.len() {
            let cref = self.clauses[i];
            let (l0, l1, size) = {
                let c = self.ca.get_ref(cref);
                if c.garbage() {
                    continue;
                }
                if irredundant_only && c.redundant() {
                    continue;
                }
                debug_assert!(c.size() >= 2);
                (c[0], c[1], c.size())
            };
            self.watches[l0].push(Watch::new(cref, l1, size));
            self.watches[l1].push(Watch::new(cref, l0, size));
        }
    }

    pub(crate) fn reset_watches(&mut self) {
        self.watches.clear_all();
    }

    pub(crate) fn reset_occs(&mut self) {
        self.occs.clear_all();
    }

    /// Stable-sort every watch list so binary watches come first; the
    /// binary implication scans stop at the first long watch.
    pub(crate) fn sort_watches(&mut self) {
        for vi in 0..self.next_var.idx() {
            for &sign in &[true, false] {
                let l = Lit::new(Var::from_idx(vi), sign);
                self.watches[l].sort_by_key(|w| !w.binary());
            }
        }
    }

    /// Number of unassigned variables.
    pub(crate) fn active_vars(&self) -> u64 {
        let mut n = 0;
        for vi in 0..self.next_var.idx() {
            if self.values.var(Var::from_idx(vi)) == lbool::UNDEF {
                n += 1;
            }
        }
        n
    }

    /// Propagates all enqueued facts over the connected watch lists.
    ///
    /// If a conflict arises the conflicting clause is returned, otherwise
    /// `None`. The propagation queue is empty afterwards either way.
    pub fn propagate(&mut self) -> Option<CRef> {
        let mut confl = None;

        'trail: while self.values.propagated < self.values.trail.len() {
            let p = self.values.trail[self.values.propagated];
            self.values.propagated += 1;
            self.stats.propagations.search += 1;
            let lit = !p; // now false; scan its watchers
            trace!("propagating {:?}", p);

            let watches_ptr: *mut OccLists<Lit, Watch> = &mut self.watches;
            let ws = &mut self.watches[lit];
            let end = ws.len();
            let mut i = 0;
            let mut j = 0;
            'watches: while i < end {
                let w = ws[i];
                ws[j] = w;
                i += 1;
                j += 1;
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
                        confl = Some(w.cref);
                        break 'watches;
                    }
                    self.values.assign(w.blit);
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
                                // move the watch from `lit` to `r`
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
                            // unit or conflicting under the assignment
                            if u == lbool::UNDEF {
                                self.values.assign(other);
                            } else {
                                confl = Some(w.cref);
                                break 'watches;
                            }
                        }
                    }
                }
            }
            if confl.is_some() {
                while i < end {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                }
            }
            ws.truncate(j);
            if confl.is_some() {
                self.values.propagated = self.values.trail.len();
                break 'trail;
            }
        }

        #[cfg(feature = "logging")]
        {
            if let Some(cr) = confl {
                debug!("conflict in {}", self.ca.get_ref(cr).lits().pp_dimacs());
            }
        }
        confl
    }

    /// Advance the reluctant restart sequence by one conflict.
    pub fn restart_tick(&mut self) {
        self.reluctant.tick();
    }

    /// One-shot read of the restart trigger; consuming a raised trigger
    /// also fires the restart callback.
    pub fn restart_triggered(&mut self) -> bool {
        if self.reluctant.triggered() {
            self.cb.on_restart();
            true
        } else {
            false
        }
    }

    /// (Re)configure the reluctant sequence; `limit == 0` means no ceiling.
    pub fn enable_restarts(&mut self, period: u64, limit: u64) {
        self.reluctant.enable(period, limit);
    }

    pub fn disable_restarts(&mut self) {
        self.reluctant.disable();
    }

    /// The persisted extension stack: a flat sequence of signed external
    /// literals with zeros delimiting witness and clause blocks.
    pub fn extension_stack(&self) -> &[i32] {
        self.extension.stack()
    }
}

#[cfg(test)]
impl<Cb: Callbacks> Solver<Cb> {
    /// Test helper: add an irredundant clause in DIMACS notation.
    pub(crate) fn add_dimacs(&mut self, lits: &[i32]) -> bool {
        let mut v = Vec::with_capacity(lits.len());
        for &i in lits {
            let l = Lit::from_dimacs(i);
            self.var_of_int(l.var().idx());
            v.push(l);
        }
        self.add_clause_reuse(&mut v)
    }

    /// Test helper: add a redundant clause in DIMACS notation.
    pub(crate) fn add_dimacs_redundant(&mut self, lits: &[i32], hyper: bool) -> bool {
        let mut v = Vec::with_capacity(lits.len());
        for &i in lits {
            let l = Lit::from_dimacs(i);
            self.var_of_int(l.var().idx());
            v.push(l);
        }
        self.add_redundant_clause_reuse(&mut v, hyper)
    }

    /// Test helper: check the two-watched invariant over the connected
    /// watch lists.
    pub(crate) fn check_watches(&self, irredundant_only: bool) {
        use std::collections::HashMap;
        let mut counts: HashMap<CRef, u32> = HashMap::new();
        for (l, ws) in self.watches.iter() {
            for w in ws.iter() {
                let c = self.ca.get_ref(w.cref);
                if c.garbage() {
                    continue; // dropped lazily
                }
                assert!(
                    c.lits()[0] == l || c.lits()[1] == l,
                    "watched literal {:?} not in first two of {:?}",
                    l,
                    c.lits()
                );
                assert_eq!(w.size, c.size());
                *counts.entry(w.cref).or_insert(0) += 1;
            }
        }
        for &cref in &self.clauses {
            let c = self.ca.get_ref(cref);
            if c.garbage() || (irredundant_only && c.redundant()) {
                continue;
            }
            assert_eq!(counts.get(&cref), Some(&2), "clause {:?} not watched twice", c.lits());
        }
    }
}

/// Runtime statistics of the covered clause elimination pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverStats {
    /// Number of `cover()` invocations.
    pub count: u64,
    /// Eliminated clauses in total.
    pub total: u64,
    /// Eliminated as asymmetric tautologies.
    pub asymmetric: u64,
    /// Eliminated as blocked/covered tautologies.
    pub blocked: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Propagations {
    pub search: u64,
    pub cover: u64,
    pub transred: u64,
}

/// Counters kept by the core; all publicly readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub cover: CoverStats,
    pub propagations: Propagations,
    /// Number of `transred()` invocations.
    pub transreds: u64,
    /// Binary clauses removed as transitive.
    pub transitive: u64,
    /// Failed literals found during transitive reduction.
    pub failed: u64,
    /// Units derived from failed literals.
    pub transredunits: u64,
    /// Clauses weakened onto the extension stack.
    pub weakened: u64,
    pub weakenedlen: u64,
    /// Number of `extend()` runs.
    pub extensions: u64,
    /// Literal flips performed during extension.
    pub extended: u64,
}

/// Solver options.
///
/// Relative efforts are in per mille of the search propagation count;
/// the `mineff`/`maxeff` pairs clamp the resulting budget.
pub struct Opts {
    /// Master enable for covered clause elimination.
    pub cover: bool,
    /// Covered clause elimination refuses to run when this is set; see
    /// the note in `cover()`.
    pub restoreflush: bool,
    pub coverreleff: u32,
    pub covermineff: u64,
    pub covermaxeff: u64,
    /// Master enable for transitive reduction.
    pub transred: bool,
    pub transredreleff: u32,
    pub transredmineff: u64,
    pub transredmaxeff: u64,
    /// Base interval of the reluctant restart sequence; 0 disables it.
    pub restart_period: u64,
    /// Ceiling for the reluctant sequence; 0 means unlimited.
    pub restart_limit: u64,
}

impl Default for Opts {
    fn default() -> Opts {
        Self {
            cover: true,
            restoreflush: false,
            coverreleff: 4,
            covermineff: 100_000,
            covermaxeff: 10_000_000,
            transred: true,
            transredreleff: 10,
            transredmineff: 100_000,
            transredmaxeff: 10_000_000,
            restart_period: 0,
            restart_limit: 0,
        }
    }
}

impl Opts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        self.coverreleff >= 1
            && self.covermineff <= self.covermaxeff
            && self.transredreleff >= 1
            && self.transredmineff <= self.transredmaxeff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BasicSolver;
    use crate::clause::lbool;

    #[test]
    fn test_value_negation() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.assign_unit(Lit::from_dimacs(1));
        for i in &[1i32, 2, -1, -2] {
            let l = Lit::from_dimacs(*i);
            assert_eq!(s.val(l), -s.val(!l));
        }
        assert_eq!(s.val(Lit::from_dimacs(1)), lbool::TRUE);
        assert_eq!(s.val(Lit::from_dimacs(-1)), lbool::FALSE);
        assert_eq!(s.val(Lit::from_dimacs(2)), lbool::UNDEF);
    }

    #[test]
    fn test_add_clause_simplifies() {
        let mut s = BasicSolver::default();
        // tautology is dropped
        assert!(s.add_dimacs(&[1, -1, 2]));
        assert_eq!(s.num_clauses(), 0);
        // duplicate literals collapse
        assert!(s.add_dimacs(&[3, 3, 4]));
        assert_eq!(s.num_clauses(), 1);
        let cr = s.iter_clauses().next().unwrap();
        assert_eq!(s.clause_lits(cr).len(), 2);
    }

    #[test]
    fn test_unit_conflict_sets_not_ok() {
        let mut s = BasicSolver::default();
        assert!(s.add_dimacs(&[1]));
        assert!(!s.add_dimacs(&[-1]));
        assert!(!s.is_ok());
    }

    #[test]
    fn test_propagate_chain() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-2, 3]);
        s.add_dimacs(&[-3, 4, 5]);
        s.assign_unit(Lit::from_dimacs(1));
        s.connect_watches(false);
        assert!(s.propagate().is_none());
        assert_eq!(s.val(Lit::from_dimacs(2)), lbool::TRUE);
        assert_eq!(s.val(Lit::from_dimacs(3)), lbool::TRUE);
        assert_eq!(s.val(Lit::from_dimacs(4)), lbool::UNDEF);
        s.check_watches(false);
        s.reset_watches();
    }

    #[test]
    fn test_propagate_conflict() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-1, -2]);
        s.assign_unit(Lit::from_dimacs(1));
        s.connect_watches(false);
        assert!(s.propagate().is_some());
        s.reset_watches();
    }

    #[test]
    fn test_propagate_long_clause_moves_watch() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2, 3, 4]);
        s.connect_watches(false);
        s.assign_unit(Lit::from_dimacs(-1));
        assert!(s.propagate().is_none());
        s.check_watches(false);
        s.assign_unit(Lit::from_dimacs(-3));
        s.assign_unit(Lit::from_dimacs(-4));
        assert!(s.propagate().is_none());
        // clause became unit on 2
        assert_eq!(s.val(Lit::from_dimacs(2)), lbool::TRUE);
        s.reset_watches();
    }

    #[test]
    fn test_collect_garbage() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[1, 2]);
        s.add_dimacs(&[2, 3]);
        s.add_dimacs(&[3, 4]);
        let dead = s.iter_clauses().nth(1).unwrap();
        s.mark_garbage(dead);
        assert_eq!(s.num_clauses(), 2);
        s.collect_garbage();
        assert_eq!(s.iter_clauses().count(), 2);
        let lits: Vec<Vec<i32>> = s
            .iter_clauses()
            .map(|cr| s.clause_lits(cr).iter().map(|l| l.to_dimacs()).collect())
            .collect();
        assert!(lits.contains(&vec![1, 2]));
        assert!(lits.contains(&vec![3, 4]));
    }

    #[test]
    fn test_solver_restart_trigger() {
        let mut opts = Opts::default();
        opts.restart_period = 3;
        let mut s: BasicSolver = Solver::new(opts, Default::default());
        let mut gaps = vec![];
        let mut n = 0;
        while gaps.len() < 7 {
            s.restart_tick();
            n += 1;
            if s.restart_triggered() {
                gaps.push(n);
                n = 0;
            }
        }
        assert_eq!(gaps, vec![3, 3, 6, 3, 3, 6, 12]);
    }

    #[test]
    fn test_frozen_api() {
        let mut s = BasicSolver::default();
        let v = s.var_of_int(0);
        assert!(!s.frozen(Lit::new(v, true)));
        s.set_frozen(v);
        assert!(s.frozen(Lit::new(v, true)));
        assert!(s.frozen(Lit::new(v, false)));
        s.melt(v);
        assert!(!s.frozen(Lit::new(v, false)));
    }
}

//! Transitive reduction of the binary implication graph.
//!
//! A binary clause is removed if another path between its implication
//! endpoints exists that does not use the clause itself. Keeping the
//! binary graph reduced matters for hyper binary resolution, which would
//! otherwise produce too many resolvents. The search also detects failed
//! literals: a root reaching both polarities of some literal.

use {
    crate::callbacks::Callbacks,
    crate::clause::{lbool, Lit},
    crate::core::Solver,
};

impl<Cb: Callbacks> Solver<Cb> {
    /// The transitive reduction pass. Returns the number of binary
    /// clauses removed.
    pub fn transred(&mut self) -> u64 {
        if !self.opts().transred {
            return 0;
        }
        if !self.ok || self.terminating() {
            return 0;
        }
        if self.num_irredundant + self.num_redundant == 0 {
            return 0;
        }
        debug_assert_eq!(self.values.level, 0);
        self.stats.transreds += 1;

        // Bounded like the other inprocessing passes, relative to the
        // search propagations since the previous run.
        let mut limit = self
            .stats
            .propagations
            .search
            .saturating_sub(self.last_transred)
            .saturating_mul(self.opts().transredreleff as u64)
            / 1000;
        if limit < self.opts().transredmineff {
            limit = self.opts().transredmineff;
        }
        if limit > self.opts().transredmaxeff {
            limit = self.opts().transredmaxeff;
        }
        info!("transitive reduction limit of {} propagations", limit);

        self.connect_watches(false);
        if self.values.propagated < self.values.trail.len() {
            if self.propagate().is_some() {
                debug!("propagating pending units gives empty clause");
                self.ok = false;
            }
            if !self.ok {
                self.reset_watches();
                return 0;
            }
        }

        // Binary watches to the front, so scanning a watch list can stop
        // at the first long watch.
        self.sort_watches();

        // Find the first clause not checked for being transitive yet; if
        // there is none, reschedule all.
        let n = self.clauses.len();
        let mut start = n;
        for i in 0..n {
            let c = self.ca.get_ref(self.clauses[i]);
            if c.garbage() {
                continue;
            }
            if c.size() != 2 {
                continue;
            }
            if c.redundant() && c.hyper() {
                continue;
            }
            if !c.transred() {
                start = i;
                break;
            }
        }
        if start == n {
            info!("rescheduling all clauses since no clauses to check left");
            for i in 0..n {
                let cref = self.clauses[i];
                if self.ca.get_ref(cref).transred() {
                    self.ca.get_mut(cref).set_transred(false);
                }
            }
            start = 0;
        }

        // This working stack plays the role of the trail during standard
        // propagation.
        let mut work: Vec<Lit> = vec![];

        let mut propagations = 0u64;
        let mut units = 0u64;
        let mut removed = 0u64;

        let mut i = start;
        while self.ok && i < n && !self.terminating() && propagations < limit {
            let cref = self.clauses[i];
            i += 1;

            // Candidates are binary and not the result of hyper binary
            // resolution; those come in large numbers and are
            // non-transitive at the point they are added.
            {
                let c = self.ca.get_ref(cref);
                if c.garbage() {
                    continue;
                }
                if c.size() != 2 {
                    continue;
                }
                if c.redundant() && c.hyper() {
                    continue;
                }
                if c.transred() {
                    continue; // checked before
                }
            }
            self.ca.get_mut(cref).set_transred(true); // marked as checked
            trace!("checking transitive reduction of {:?}", self.ca.get_ref(cref));

            let (l0, l1, candidate_redundant) = {
                let c = self.ca.get_ref(cref);
                (c[0], c[1], c.redundant())
            };
            let mut src = !l0;
            let mut dst = l1;
            if self.values.lit(src) != lbool::UNDEF || self.values.lit(dst) != lbool::UNDEF {
                continue;
            }
            // A path src ⇒ dst exists iff a path ¬dst ⇒ ¬src does, so the
            // search direction is free; widen the initial cone.
            if self.watches[!src].len() < self.watches[dst].len() {
                let tmp = dst;
                dst = !src;
                src = !tmp;
            }
            trace!("searching path from {:?} to {:?}", src, dst);

            // An irredundant candidate must only be reduced through
            // irredundant binaries; redundant ones may carry implications
            // not justified by the irredundant kernel.
            let irredundant = !candidate_redundant;

            debug_assert!(work.is_empty());
            self.marks.mark(src);
            work.push(src);

            let mut transitive = false; // found a path from src to dst?
            let mut failed = false; // src a failed literal?
            let mut j = 0; // `propagated` of the BFS

            while !transitive && !failed && j < work.len() {
                let lit = work[j];
                j += 1;
                debug_assert!(self.marks.marked(lit) > 0);
                propagations += 1;
                let ws = &self.watches[!lit];
                for w in ws.iter() {
                    if !w.binary() {
                        break; // watches sorted binary-first
                    }
                    if w.cref == cref {
                        continue;
                    }
                    {
                        let d = self.ca.get_ref(w.cref);
                        if irredundant && d.redundant() {
                            continue;
                        }
                        if d.garbage() {
                            continue;
                        }
                    }
                    let other = w.blit;
                    if other == dst {
                        transitive = true; // reached
                    } else {
                        let tmp = self.marks.marked(other);
                        if tmp > 0 {
                            continue;
                        } else if tmp < 0 {
                            trace!("found both {:?} and {:?} reachable", !other, other);
                            failed = true;
                        } else {
                            self.marks.mark(other);
                            work.push(other);
                        }
                    }
                    if transitive || failed {
                        break;
                    }
                }
            }

            while let Some(l) = work.pop() {
                self.marks.unmark(l);
            }
            self.marks.check_clear();

            if transitive {
                removed += 1;
                self.stats.transitive += 1;
                debug!("transitive redundant {:?}", self.ca.get_ref(cref));
                self.mark_garbage(cref);
            } else if failed {
                units += 1;
                debug!("found failed literal {:?} during transitive reduction", src);
                self.stats.failed += 1;
                self.stats.transredunits += 1;
                self.assign_unit(!src);
                if self.propagate().is_some() {
                    debug!("propagating new unit results in conflict");
                    self.ok = false;
                }
            }
        }

        self.last_transred = self.stats.propagations.search;
        self.stats.propagations.transred += propagations;
        self.reset_watches();

        info!("removed {} transitive clauses, found {} units", removed, units);
        removed
    }
}

#[cfg(test)]
mod tests {
    use crate::clause::{lbool, Lit};
    use crate::BasicSolver;

    fn lit(i: i32) -> Lit {
        Lit::from_dimacs(i)
    }

    #[test]
    fn test_transitive_binary_removed() {
        // (-1 ∨ 3) follows from (-1 ∨ 2) and (-2 ∨ 3)
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-2, 3]);
        s.add_dimacs(&[-1, 3]);
        assert_eq!(s.transred(), 1);
        assert_eq!(s.stats().transitive, 1);
        let dead: Vec<_> = s
            .iter_clauses()
            .filter(|&cr| s.is_garbage(cr))
            .map(|cr| {
                s.clause_lits(cr)
                    .iter()
                    .map(|l| l.to_dimacs())
                    .collect::<Vec<_>>()
            })
            .collect();
        assert_eq!(dead, vec![vec![-1, 3]]);
    }

    #[test]
    fn test_failed_literal_assigns_unit() {
        // from 1 both 2 and -2 are reachable without using (-1 ∨ 3)
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-1, -2]);
        s.add_dimacs(&[-1, 3]);
        assert_eq!(s.transred(), 0);
        assert_eq!(s.stats().failed, 1);
        assert_eq!(s.stats().transredunits, 1);
        assert_eq!(s.val(lit(-1)), lbool::TRUE);
        assert!(s.is_ok());
    }

    #[test]
    fn test_hyper_binaries_skipped() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-2, 3]);
        s.add_dimacs_redundant(&[-1, 3], true);
        assert_eq!(s.transred(), 0);
        assert_eq!(s.stats().transitive, 0);
    }

    #[test]
    fn test_redundant_binary_reduced() {
        // a redundant non-hyper binary may be reduced via the full graph
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-2, 3]);
        s.add_dimacs_redundant(&[-1, 3], false);
        assert_eq!(s.transred(), 1);
        assert_eq!(s.stats().transitive, 1);
    }

    #[test]
    fn test_irredundant_candidate_needs_irredundant_path() {
        // the only path uses redundant binaries, which must not justify
        // removing an irredundant clause
        let mut s = BasicSolver::default();
        s.add_dimacs_redundant(&[-1, 2], false);
        s.add_dimacs_redundant(&[-2, 3], false);
        s.add_dimacs(&[-1, 3]);
        assert_eq!(s.transred(), 0);
        assert_eq!(s.stats().transitive, 0);
    }

    #[test]
    fn test_long_clauses_ignored() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2, 4]);
        s.add_dimacs(&[-2, 3, 4]);
        s.add_dimacs(&[-1, 3]);
        assert_eq!(s.transred(), 0);
    }

    #[test]
    fn test_reschedule_after_all_checked() {
        let mut s = BasicSolver::default();
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-2, 3]);
        s.add_dimacs(&[-1, 3]);
        assert_eq!(s.transred(), 1);
        // all remaining candidates carry the checked flag; the next run
        // resets and re-examines them without further removals
        assert_eq!(s.transred(), 0);
        assert_eq!(s.stats().transreds, 2);
        assert_eq!(s.num_clauses(), 2);
    }

    #[test]
    fn test_disabled_by_option() {
        let mut opts = crate::Opts::default();
        opts.transred = false;
        let mut s = crate::Solver::new(opts, crate::BasicCallbacks::new());
        s.add_dimacs(&[-1, 2]);
        s.add_dimacs(&[-2, 3]);
        s.add_dimacs(&[-1, 3]);
        assert_eq!(s.transred(), 0);
        assert_eq!(s.stats().transreds, 0);
    }
}

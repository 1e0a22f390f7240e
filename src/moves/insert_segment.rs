use super::monte_carlo_move::{MonteCarloMove, RandomSource};
use crate::configuration::seglist;
use crate::configuration::{
    check_invariant, config_sign, Configuration, Segment, Tau, CHECK_INVARIANTS,
};
use crate::det::Determinant;
use crate::work_data::WorkData;
use log::{debug, trace};

#[derive(Debug, PartialEq, Eq)]
enum MoveState {
    Idle,
    Proposed,
}

/// The insert-segment move.
///
/// Proposes one new occupation segment on a randomly chosen color, inside a
/// randomly chosen unoccupied window. The acceptance weight is the product
/// of three ratios: the local trace ratio (chemical potential, static
/// interaction overlaps and, when active, retarded-kernel overlaps), the
/// hybridization determinant ratio from the per-color determinant manager,
/// and the proposal-combinatorics ratio that restores detailed balance.
///
/// # Fields
/// - `accept_count`: number of committed trials.
/// - `reject_count`: number of discarded trials (degenerate proposals
///   included).
#[derive(Debug)]
pub struct InsertSegment {
    state: MoveState,
    color: usize,
    prop_seg: Option<Segment>,
    det_sign: f64,
    det_trial_pending: bool,
    pub accept_count: usize,
    pub reject_count: usize,
}

impl Default for InsertSegment {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertSegment {
    pub fn new() -> Self {
        Self {
            state: MoveState::Idle,
            color: 0,
            prop_seg: None,
            det_sign: 1.0,
            det_trial_pending: false,
            accept_count: 0,
            reject_count: 0,
        }
    }
}

impl<D: Determinant> MonteCarloMove<D> for InsertSegment {
    fn propose<R: RandomSource>(
        &mut self,
        config: &Configuration,
        wdata: &mut WorkData<D>,
        rng: &mut R,
    ) -> f64 {
        assert!(
            self.state == MoveState::Idle,
            "propose() while a trial is still outstanding"
        );
        self.state = MoveState::Proposed;
        self.det_trial_pending = false;
        self.prop_seg = None;

        let n_color = config.n_color();
        self.color = rng.draw(n_color);
        let sl = &config.seglists[self.color];
        debug!("Attempting insertion at color {}", self.color);

        if seglist::has_full_line(sl) {
            debug!("Full line, cannot insert");
            return 0.0;
        }

        // Insertion window: the whole circle for an empty color, otherwise
        // the gap running from a randomly chosen segment's annihilation time
        // forward to the cyclically following segment's creation time. The
        // window edge is the forward end; proposal times are drawn backwards
        // from it.
        let (window_edge, window_length) = if sl.is_empty() {
            (Tau::beta(config.beta), config.beta)
        } else {
            let idx = rng.draw(sl.len());
            let gap_start = sl[idx].tau_cdag;
            let gap_end = sl[(idx + 1) % sl.len()].tau_c;
            (gap_end, (gap_end - gap_start).value())
        };
        trace!(
            "Insertion window: edge {}, length {}",
            window_edge,
            window_length
        );

        let mut dt1 = rng.draw_time(window_length);
        let mut dt2 = rng.draw_time(window_length);
        if dt1 == dt2 {
            debug!("Drew equal times");
            return 0.0;
        }
        // The creation time takes the larger offset. When inserting into an
        // empty color the two draw orders are distinct insertions (one of
        // them wraps around the origin), so the draw order is kept.
        if dt1 < dt2 && !sl.is_empty() {
            std::mem::swap(&mut dt1, &mut dt2);
        }
        let prop_seg = Segment::new(window_edge - dt1, window_edge - dt2);
        trace!("Proposed segment {}", prop_seg);

        // Trace ratio.
        let mut ln_trace_ratio = wdata.mu[self.color] * prop_seg.length();
        for c in 0..n_color {
            if c != self.color {
                ln_trace_ratio -=
                    wdata.u[[self.color, c]] * seglist::overlap(&config.seglists[c], &prop_seg);
            }
        }
        if wdata.has_dt {
            let k = wdata.k.as_deref().expect("has_dt requires the K kernel");
            for c in 0..n_color {
                ln_trace_ratio += seglist::k_overlap(
                    &config.seglists[c],
                    prop_seg.tau_c,
                    prop_seg.tau_cdag,
                    k,
                    self.color,
                    c,
                );
            }
            // The segment interacts with itself through the kernel overlap
            // above; subtract that double counting.
            ln_trace_ratio -= k.eval(prop_seg.length(), self.color, self.color);
        }
        let trace_ratio = ln_trace_ratio.exp();

        // Determinant ratio: the new annihilation time enters as a row, the
        // new creation time as a column, each at its sorted position.
        let det = &mut wdata.dets[self.color];
        let n = det.size();
        let row_pos = seglist::lower_bound(n, prop_seg.tau_cdag, |i| det.get_y(i));
        let col_pos = seglist::lower_bound(n, prop_seg.tau_c, |i| det.get_x(i));
        let det_ratio = det.try_insert(row_pos, col_pos, prop_seg.tau_cdag, prop_seg.tau_c);
        self.det_trial_pending = true;

        // Proposal ratio. Inserting into an empty color has no "swap the two
        // offsets" ambiguity, hence the denominator 1 instead of 2.
        let n_seg = sl.len() as f64;
        let denominator = if sl.is_empty() { 1.0 } else { 2.0 };
        let prop_ratio =
            (n_seg.max(1.0) * window_length * window_length / denominator) / (n_seg + 1.0);

        trace!(
            "trace_ratio = {}, det_ratio = {}, prop_ratio = {}",
            trace_ratio,
            det_ratio,
            prop_ratio
        );

        self.det_sign = if det_ratio > 0.0 { 1.0 } else { -1.0 };
        self.prop_seg = Some(prop_seg);

        let prod = trace_ratio * det_ratio * prop_ratio;
        if prod.is_finite() {
            prod
        } else {
            debug!("Weight ratio overflowed, degrading to the determinant sign");
            self.det_sign
        }
    }

    fn accept(&mut self, config: &mut Configuration, wdata: &mut WorkData<D>) -> f64 {
        assert!(
            self.state == MoveState::Proposed,
            "accept() without an outstanding trial"
        );
        let prop_seg = self
            .prop_seg
            .take()
            .unwrap_or_else(|| panic!("accept() on a degenerate proposal"));
        debug!("Accepting insertion at color {}", self.color);

        let initial_sign = config_sign(config, &wdata.dets);
        wdata.dets[self.color].complete_operation();
        config.insert_segment(self.color, prop_seg);
        if CHECK_INVARIANTS {
            check_invariant(config, &wdata.dets);
        }

        let final_sign = config_sign(config, &wdata.dets);
        let sign_ratio = final_sign / initial_sign;
        if sign_ratio * self.det_sign != 1.0 {
            panic!(
                "Sign invariant violated by insertion: determinant sign {}, \
                 configuration sign ratio {}. Configuration:\n{}",
                self.det_sign, sign_ratio, config
            );
        }

        self.state = MoveState::Idle;
        self.det_trial_pending = false;
        self.accept_count += 1;
        sign_ratio
    }

    fn reject(&mut self, wdata: &mut WorkData<D>) {
        assert!(
            self.state == MoveState::Proposed,
            "reject() without an outstanding trial"
        );
        debug!("Rejecting insertion at color {}", self.color);
        if self.det_trial_pending {
            wdata.dets[self.color].reject_last_try();
        }
        self.det_trial_pending = false;
        self.prop_seg = None;
        self.state = MoveState::Idle;
        self.reject_count += 1;
    }
}

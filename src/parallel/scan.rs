//! Two-level scan (spec.md §4.5): intra-workgroup Hillis-Steele over each
//! thread's local partial sum, a per-workgroup exclusive scan of those
//! partials, then a uniform add of each workgroup's carry across
//! workgroups.

use std::cell::RefCell;

use crate::error::KernelError;

use super::context::ParallelContext;
use super::executor::{CpuSimulator, ParallelExecutor, ParallelKernel};
use super::monoid::Monoid;
use super::reduce::validate_dispatch_shape;

struct ScanKernel<'a, T: Copy> {
    data: &'a [T],
    monoid: Monoid<T>,
    workgroup_size: u32,
    grain_size: u32,
    inclusive: bool,
    /// Per-element results, shared across every workgroup in the
    /// dispatch; each workgroup only ever touches its own disjoint index
    /// range, so the single `RefCell` never sees contending borrows.
    output: &'a RefCell<Vec<T>>,
}

impl<'a, T: Copy> ParallelKernel for ScanKernel<'a, T> {
    type Elem = T;

    fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    fn num_phases(&self) -> usize {
        // phase 0: per-thread local scan; phases 1..=log2: Hillis-Steele
        // over thread totals; one final phase: fold the thread prefix
        // back into each thread's local elements.
        2 + self.workgroup_size.trailing_zeros() as usize
    }

    fn phase(&self, ctx: &mut ParallelContext<T>, phase: usize) {
        let log2 = self.workgroup_size.trailing_zeros() as usize;
        let elems_per_wg = self.workgroup_size * self.grain_size;
        let base = ctx.id.workgroup_id * elems_per_wg + ctx.id.local_id * self.grain_size;

        if phase == 0 {
            let mut acc = self.monoid.identity;
            let mut out = self.output.borrow_mut();
            for g in 0..self.grain_size {
                let idx = (base + g) as usize;
                if idx < out.len() {
                    out[idx] = acc;
                }
                let v = self.data.get(idx).copied().unwrap_or(self.monoid.identity);
                acc = self.monoid.combine(acc, v);
            }
            ctx.write(acc);
        } else if phase <= log2 {
            let step = 1u32 << (phase - 1);
            let i = ctx.id.local_id;
            if i >= step {
                let a = ctx.prev[(i - step) as usize];
                let b = ctx.prev[i as usize];
                ctx.write(self.monoid.combine(a, b));
            }
        } else {
            let i = ctx.id.local_id;
            let thread_prefix = if i == 0 { self.monoid.identity } else { ctx.prev[(i - 1) as usize] };
            let mut out = self.output.borrow_mut();
            for g in 0..self.grain_size {
                let idx = (base + g) as usize;
                if idx >= out.len() {
                    continue;
                }
                let local_exclusive = out[idx];
                let exclusive = self.monoid.combine(thread_prefix, local_exclusive);
                out[idx] = if self.inclusive {
                    let v = self.data.get(idx).copied().unwrap_or(self.monoid.identity);
                    self.monoid.combine(exclusive, v)
                } else {
                    exclusive
                };
            }
        }
    }
}

/// Inclusive or exclusive scan of `data` under `monoid`, same length as
/// `data`. `workgroup_size` must be a nonzero power of two.
pub fn scan<T: Copy>(data: &[T], monoid: &Monoid<T>, workgroup_size: u32, grain_size: u32, inclusive: bool) -> Result<Vec<T>, KernelError> {
    validate_dispatch_shape(workgroup_size, grain_size)?;
    let elems_per_wg = workgroup_size * grain_size;
    let num_workgroups = (data.len() as u32).div_ceil(elems_per_wg).max(1);

    let output = RefCell::new(vec![monoid.identity; data.len()]);
    let kernel = ScanKernel { data, monoid: *monoid, workgroup_size, grain_size, inclusive, output: &output };
    CpuSimulator.dispatch(&kernel, num_workgroups, monoid.identity);
    let mut out = output.into_inner();

    // Uniform add: carry each workgroup's total into every later workgroup.
    let mut workgroup_prefix = monoid.identity;
    for wg in 0..num_workgroups {
        let start = (wg * elems_per_wg) as usize;
        if start >= data.len() {
            break;
        }
        let end = ((wg + 1) * elems_per_wg).min(data.len() as u32) as usize;
        for idx in start..end {
            out[idx] = monoid.combine(workgroup_prefix, out[idx]);
        }
        let wg_total = data[start..end].iter().copied().fold(monoid.identity, |a, b| monoid.combine(a, b));
        workgroup_prefix = monoid.combine(workgroup_prefix, wg_total);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_scan_of_one_to_four() {
        let data = vec![1i64, 2, 3, 4];
        let sum = Monoid::new(0i64, |a, b| a + b);
        let result = scan(&data, &sum, 4, 1, false).unwrap();
        assert_eq!(result, vec![0, 1, 3, 6]);
    }

    #[test]
    fn inclusive_scan_of_one_to_four() {
        let data = vec![1i64, 2, 3, 4];
        let sum = Monoid::new(0i64, |a, b| a + b);
        let result = scan(&data, &sum, 4, 1, true).unwrap();
        assert_eq!(result, vec![1, 3, 6, 10]);
    }

    #[test]
    fn scan_carries_across_workgroups() {
        let data: Vec<i64> = (1..=8).collect();
        let sum = Monoid::new(0i64, |a, b| a + b);
        let result = scan(&data, &sum, 4, 1, false).unwrap();
        assert_eq!(result, vec![0, 1, 3, 6, 10, 15, 21, 28]);
    }

    #[test]
    fn scan_with_grain_size_matches_serial_exclusive_scan() {
        let data: Vec<i64> = (1..=16).collect();
        let sum = Monoid::new(0i64, |a, b| a + b);
        let result = scan(&data, &sum, 4, 2, false).unwrap();
        let mut expected = Vec::with_capacity(16);
        let mut acc = 0i64;
        for &v in &data {
            expected.push(acc);
            acc += v;
        }
        assert_eq!(result, expected);
    }

    #[test]
    fn max_monoid_scan_is_running_maximum() {
        let data = vec![3i64, 1, 4, 1, 5, 9, 2, 6];
        let max = Monoid::new(i64::MIN, |a: i64, b: i64| a.max(b));
        let result = scan(&data, &max, 4, 1, true).unwrap();
        assert_eq!(result, vec![3, 3, 4, 4, 5, 9, 9, 9]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// spec.md §8: `scan(xs)[i] = fold(op, identity, xs[0..i])` for an
        /// exclusive scan, across arbitrary dispatch shapes.
        #[test]
        fn exclusive_scan_matches_serial_prefix_fold(
            data in prop::collection::vec(-1000i64..1000, 0..200),
            wg_pow in 0u32..4,
            grain in 1u32..5,
        ) {
            let workgroup_size = 1u32 << wg_pow;
            let sum = Monoid::new(0i64, |a, b| a + b);
            let result = scan(&data, &sum, workgroup_size, grain, false).unwrap();
            let mut acc = 0i64;
            for (i, &v) in data.iter().enumerate() {
                prop_assert_eq!(result[i], acc);
                acc += v;
            }
        }
    }
}

//! Blelloch-style tree reduction (spec.md §4.5): one output per
//! workgroup, arbitrary associative `BinaryOp` with `identity`.

use crate::error::KernelError;

use super::context::ParallelContext;
use super::executor::{CpuSimulator, ParallelExecutor, ParallelKernel};
use super::monoid::Monoid;

struct ReduceKernel<'a, T: Copy> {
    data: &'a [T],
    monoid: Monoid<T>,
    workgroup_size: u32,
    grain_size: u32,
}

impl<'a, T: Copy> ParallelKernel for ReduceKernel<'a, T> {
    type Elem = T;

    fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    fn num_phases(&self) -> usize {
        1 + self.workgroup_size.trailing_zeros() as usize
    }

    fn phase(&self, ctx: &mut ParallelContext<T>, phase: usize) {
        if phase == 0 {
            let elems_per_wg = self.workgroup_size * self.grain_size;
            let base = ctx.id.workgroup_id * elems_per_wg + ctx.id.local_id * self.grain_size;
            let mut acc = self.monoid.identity;
            for g in 0..self.grain_size {
                let idx = (base + g) as usize;
                let v = self.data.get(idx).copied().unwrap_or(self.monoid.identity);
                acc = self.monoid.combine(acc, v);
            }
            ctx.write(acc);
        } else {
            let step = 1u32 << (phase - 1);
            let i = ctx.id.local_id;
            if i % (step * 2) == 0 {
                let partner = (i + step) as usize;
                let b = ctx.prev.get(partner).copied().unwrap_or(self.monoid.identity);
                ctx.write(self.monoid.combine(ctx.prev[i as usize], b));
            }
        }
    }
}

/// Reduce `data` with `monoid`, one output element per workgroup of
/// `workgroup_size * grain_size` input elements. `workgroup_size` must be
/// a nonzero power of two (the Blelloch tree needs `log2(workgroup_size)`
/// halving phases). Trailing elements that don't fill a full workgroup
/// read as `monoid.identity`, matching spec.md §4.5's out-of-range
/// tolerance requirement.
pub fn reduce<T: Copy>(data: &[T], monoid: &Monoid<T>, workgroup_size: u32, grain_size: u32) -> Result<Vec<T>, KernelError> {
    validate_dispatch_shape(workgroup_size, grain_size)?;
    let elems_per_wg = workgroup_size * grain_size;
    let num_workgroups = (data.len() as u32).div_ceil(elems_per_wg).max(1);
    let kernel = ReduceKernel { data, monoid: *monoid, workgroup_size, grain_size };
    let results = CpuSimulator.dispatch(&kernel, num_workgroups, monoid.identity);
    Ok(results.into_iter().map(|buf| buf[0]).collect())
}

pub(super) fn validate_dispatch_shape(workgroup_size: u32, grain_size: u32) -> Result<(), KernelError> {
    if workgroup_size == 0 || !workgroup_size.is_power_of_two() {
        return Err(KernelError::InvalidConfiguration(format!("workgroup_size {workgroup_size} must be a nonzero power of two")));
    }
    if grain_size == 0 {
        return Err(KernelError::InvalidConfiguration("grain_size must be nonzero".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_matches_fold_for_each_workgroup() {
        let data: Vec<i64> = (1..=8).collect();
        let sum = Monoid::new(0i64, |a, b| a + b);
        let result = reduce(&data, &sum, 4, 1).unwrap();
        assert_eq!(result, vec![10, 26]);
    }

    #[test]
    fn reduce_of_1_to_1024_with_workgroup_64_grain_4_equals_524800() {
        let data: Vec<i64> = (1..=1024).collect();
        let sum = Monoid::new(0i64, |a, b| a + b);
        let result = reduce(&data, &sum, 64, 4).unwrap();
        assert_eq!(result.iter().sum::<i64>(), 524800);
    }

    #[test]
    fn trailing_partial_workgroup_reads_identity_out_of_range() {
        let data: Vec<i64> = vec![1, 2, 3];
        let sum = Monoid::new(0i64, |a, b| a + b);
        let result = reduce(&data, &sum, 4, 1).unwrap();
        assert_eq!(result, vec![6]);
    }

    #[test]
    fn non_power_of_two_workgroup_size_is_rejected() {
        let data: Vec<i64> = vec![1, 2, 3];
        let sum = Monoid::new(0i64, |a, b| a + b);
        assert!(reduce(&data, &sum, 3, 1).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// spec.md §8: for any associative op with identity,
        /// `reduce(xs) = fold(op, identity, xs)` per workgroup.
        #[test]
        fn reduce_matches_fold_for_arbitrary_inputs(
            data in prop::collection::vec(-1000i64..1000, 0..200),
            wg_pow in 0u32..4,
            grain in 1u32..5,
        ) {
            let workgroup_size = 1u32 << wg_pow;
            let sum = Monoid::new(0i64, |a, b| a + b);
            let elems_per_wg = (workgroup_size * grain) as usize;
            let result = reduce(&data, &sum, workgroup_size, grain).unwrap();
            for (wg, &r) in result.iter().enumerate() {
                let expected: i64 = data
                    .iter()
                    .skip(wg * elems_per_wg)
                    .take(elems_per_wg)
                    .sum();
                prop_assert_eq!(r, expected);
            }
        }
    }
}

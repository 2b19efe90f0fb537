//! Histogram (spec.md §4.5): workgroup-local atomic add into a shared
//! bin array, followed by a strided global flush. The CPU simulator has
//! no real concurrency hazard, so "atomic add" is simulated as ordinary
//! per-workgroup accumulation into a local bin array; the strided flush
//! into the global bins is the part worth keeping explicit, since on
//! real hardware it is what avoids every workgroup contending on the
//! same global atomics.

use crate::error::KernelError;

/// Histogram `data` into `num_bins` buckets using `key_of` (values are
/// taken modulo `num_bins`, matching a real kernel's wraparound bit-mask
/// indexing rather than panicking on an out-of-range bin).
pub fn histogram<T>(data: &[T], key_of: impl Fn(&T) -> u32, num_bins: u32, workgroup_size: u32, grain_size: u32) -> Result<Vec<u32>, KernelError> {
    if num_bins == 0 {
        return Err(KernelError::InvalidConfiguration("num_bins must be nonzero".to_string()));
    }
    if workgroup_size == 0 || grain_size == 0 {
        return Err(KernelError::InvalidConfiguration("workgroup_size and grain_size must be nonzero".to_string()));
    }

    let elems_per_wg = workgroup_size * grain_size;
    let num_workgroups = (data.len() as u32).div_ceil(elems_per_wg).max(1);

    let mut global = vec![0u32; num_bins as usize];
    for wg in 0..num_workgroups {
        let mut local = vec![0u32; num_bins as usize];
        let base = wg * elems_per_wg;
        for i in 0..elems_per_wg {
            let Some(item) = data.get((base + i) as usize) else { continue };
            let bin = key_of(item) % num_bins;
            local[bin as usize] += 1;
        }
        for (bin, count) in local.into_iter().enumerate() {
            global[bin] += count;
        }
    }
    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_matches_a_direct_count() {
        let data = vec![0u32, 1, 1, 2, 2, 2, 5, 5];
        let result = histogram(&data, |&v| v, 6, 4, 2).unwrap();
        assert_eq!(result, vec![1, 2, 3, 0, 0, 2]);
    }

    #[test]
    fn out_of_range_keys_wrap_into_their_bin() {
        let data = vec![7u32];
        let result = histogram(&data, |&v| v, 4, 4, 1).unwrap();
        assert_eq!(result, vec![0, 0, 0, 1]);
    }

    #[test]
    fn empty_input_histogram_is_all_zero() {
        let data: Vec<u32> = Vec::new();
        let result = histogram(&data, |&v| v, 4, 4, 1).unwrap();
        assert_eq!(result, vec![0, 0, 0, 0]);
    }
}

//! The `ParallelKernel`/`ParallelExecutor` pair (spec.md §4.5): a kernel
//! describes a sequence of barrier-separated phases; an executor runs it
//! over some number of workgroups and returns each workgroup's final
//! shared-memory contents.

use super::context::{DispatchSize, InvocationId, ParallelContext};

/// A kernel built from explicit phases, each separated by an implicit
/// `workgroupBarrier` (spec.md §5). `Elem` is the type stored in
/// per-workgroup shared memory; built-in primitives (reduce, scan) use
/// the value type they operate over directly.
pub trait ParallelKernel {
    type Elem: Copy;

    fn workgroup_size(&self) -> u32;

    /// Total number of barrier-separated phases this kernel runs.
    fn num_phases(&self) -> usize;

    /// Run phase `phase` for one invocation. Invocations for which this
    /// phase is a no-op simply don't call `ctx.write*` — the executor
    /// seeds `next` as a copy of `prev` before the phase starts, so an
    /// untouched slot carries its previous value forward automatically.
    fn phase(&self, ctx: &mut ParallelContext<Self::Elem>, phase: usize);
}

/// Launches a `ParallelKernel` over a dispatch. The only executor this
/// crate implements is the CPU simulator below — GPU execution is out of
/// scope (spec.md §1) — but the trait keeps the same algorithmic source
/// pluggable against a future hardware-backed executor.
pub trait ParallelExecutor {
    fn dispatch<K: ParallelKernel>(&self, kernel: &K, num_workgroups: u32, init: K::Elem) -> Vec<Vec<K::Elem>>;
}

/// Runs a kernel's phases bulk-synchronously (spec.md §5): every
/// invocation in a workgroup completes phase `k` before any of them
/// begins phase `k + 1`. Since the simulator is already single-threaded,
/// this is modeled directly — no coroutine suspension is needed, phase
/// `k + 1`'s `prev` is simply phase `k`'s finished `next` buffer.
pub struct CpuSimulator;

impl ParallelExecutor for CpuSimulator {
    fn dispatch<K: ParallelKernel>(&self, kernel: &K, num_workgroups: u32, init: K::Elem) -> Vec<Vec<K::Elem>> {
        let workgroup_size = kernel.workgroup_size();
        let dispatch = DispatchSize { workgroup_size, num_workgroups };
        let wg_size = workgroup_size as usize;

        (0..num_workgroups)
            .map(|workgroup_id| {
                let mut buf = vec![init; wg_size];
                for phase in 0..kernel.num_phases() {
                    let prev = buf.clone();
                    let mut next = prev.clone();
                    for local_id in 0..workgroup_size {
                        let id = InvocationId { local_id, workgroup_id, global_id: workgroup_id * workgroup_size + local_id };
                        let mut ctx = ParallelContext::new(id, dispatch, &prev, &mut next);
                        kernel.phase(&mut ctx, phase);
                    }
                    buf = next;
                }
                buf
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoKernel {
        workgroup_size: u32,
    }

    impl ParallelKernel for EchoKernel {
        type Elem = u32;

        fn workgroup_size(&self) -> u32 {
            self.workgroup_size
        }

        fn num_phases(&self) -> usize {
            1
        }

        fn phase(&self, ctx: &mut ParallelContext<u32>, _phase: usize) {
            ctx.write(ctx.id.local_id);
        }
    }

    #[test]
    fn each_invocation_writes_its_own_local_id() {
        let kernel = EchoKernel { workgroup_size: 4 };
        let results = CpuSimulator.dispatch(&kernel, 2, 0);
        assert_eq!(results, vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3]]);
    }
}

//! Row-parallel sweep helpers.
//!
//! Each helper splits a field into its `n`-long runs of constant x (one run per
//! grid column in the `idx` layout) and visits them on the rayon pool when the
//! grid is large enough, sequentially otherwise. A helper returns only after
//! every run has been written, so consecutive sweeps never overlap.

use rayon::prelude::*;
use std::sync::OnceLock;

const PAR_THRESHOLD_DEFAULT: usize = 16_384;
const PAR_MIN_WORK_PER_THREAD: usize = 1024;

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("DYEFLOW_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

pub(crate) fn should_parallel(len: usize) -> bool {
    if len < parallel_threshold() {
        return false;
    }
    let threads = rayon::current_num_threads().max(1);
    len / threads >= PAR_MIN_WORK_PER_THREAD
}

/// Visit every column `i` of `data` as a mutable slice indexed by `j`.
pub(crate) fn for_each_column<F>(data: &mut [f64], n: usize, f: F)
where
    F: Fn(usize, &mut [f64]) + Sync + Send,
{
    if should_parallel(data.len()) {
        data.par_chunks_mut(n).enumerate().for_each(|(i, col)| f(i, col));
    } else {
        data.chunks_mut(n).enumerate().for_each(|(i, col)| f(i, col));
    }
}

/// Like [`for_each_column`], over two fields of the same grid in lockstep.
pub(crate) fn for_each_column_pair<F>(a: &mut [f64], b: &mut [f64], n: usize, f: F)
where
    F: Fn(usize, &mut [f64], &mut [f64]) + Sync + Send,
{
    debug_assert_eq!(a.len(), b.len());
    if should_parallel(a.len()) {
        a.par_chunks_mut(n)
            .zip(b.par_chunks_mut(n))
            .enumerate()
            .for_each(|(i, (ca, cb))| f(i, ca, cb));
    } else {
        a.chunks_mut(n)
            .zip(b.chunks_mut(n))
            .enumerate()
            .for_each(|(i, (ca, cb))| f(i, ca, cb));
    }
}

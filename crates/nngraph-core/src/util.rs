//! Row-parallel helpers.

/// Maps `f` over `0..rows`, on the rayon pool when `parallel` is set.
///
/// Results are returned in row order either way.
pub(crate) fn map_rows<T, F>(rows: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if parallel {
        use rayon::prelude::*;
        return (0..rows).into_par_iter().map(f).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (0..rows).map(f).collect()
}

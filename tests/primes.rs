use std::collections::BTreeSet;

use rand::Rng;
use workq::range::chunk::partition;
use workq::{
    find_primes, trial_division, RangeProcessor, RayonThreadPool, Result, ThreadPool, WorkQueue,
    WorkqError,
};

const PRIMES_TO_100: [u64; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

#[test]
fn primes_to_100() -> Result<()> {
    let expected: BTreeSet<u64> = PRIMES_TO_100.into_iter().collect();
    for threads in [1, 2, 3, 5] {
        assert_eq!(find_primes(100, threads)?, expected);
    }
    Ok(())
}

#[test]
fn primes_to_1000() -> Result<()> {
    for threads in [1, 2, 5] {
        let primes = find_primes(1000, threads)?;
        assert_eq!(primes.len(), 168);
        assert_eq!(primes.first(), Some(&2));
        assert_eq!(primes.last(), Some(&997));
    }
    Ok(())
}

#[test]
fn empty_ranges() -> Result<()> {
    assert!(find_primes(0, 1)?.is_empty());
    assert!(find_primes(1, 1)?.is_empty());
    assert_eq!(find_primes(2, 4)?.into_iter().collect::<Vec<_>>(), vec![2]);
    Ok(())
}

#[test]
fn matches_baseline_for_all_thread_counts() -> Result<()> {
    for max in [0, 1, 2, 3, 10, 97, 100, 101, 999, 3000] {
        let expected = trial_division(max);
        for threads in [1, 2, 3, 5, 8] {
            assert_eq!(
                find_primes(max, threads)?,
                expected,
                "max = {max}, threads = {threads}"
            );
        }
    }
    Ok(())
}

#[test]
fn matches_baseline_for_random_bounds() -> Result<()> {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let max = rng.gen_range(0..5000);
        let threads = rng.gen_range(1..=8);
        assert_eq!(
            find_primes(max, threads)?,
            trial_division(max),
            "max = {max}, threads = {threads}"
        );
    }
    Ok(())
}

#[test]
fn invalid_arguments_are_rejected() {
    assert!(matches!(
        find_primes(100, 0),
        Err(WorkqError::InvalidThreadCount(0))
    ));
    assert!(matches!(
        find_primes(-1, 3),
        Err(WorkqError::NegativeBound(-1))
    ));
}

#[test]
fn processor_reuses_its_pool() -> Result<()> {
    let finder = RangeProcessor::new(WorkQueue::new(3)?);
    for max in [100, 10, 1000, 0, 100] {
        assert_eq!(finder.process(max)?, trial_division(max));
        assert_eq!(finder.pool().pending(), 0);
    }
    assert!(matches!(
        finder.process(-5),
        Err(WorkqError::NegativeBound(-5))
    ));
    finder.into_pool().join()
}

#[test]
fn processor_on_rayon_pool() -> Result<()> {
    let finder = RangeProcessor::new(RayonThreadPool::new(4)?);
    for max in [1, 500, 2000] {
        assert_eq!(finder.process(max)?, trial_division(max));
    }
    finder.into_pool().join()
}

#[test]
fn chunk_count_does_not_change_the_result() -> Result<()> {
    let expected = trial_division(1500);
    for chunks_per_thread in [0, 1, 2, 7, 64] {
        let finder =
            RangeProcessor::new(WorkQueue::new(3)?).with_chunks_per_thread(chunks_per_thread);
        assert_eq!(finder.process(1500)?, expected);
        finder.into_pool().join()?;
    }
    Ok(())
}

#[test]
fn huge_chunk_count_is_clamped_to_the_range() -> Result<()> {
    let finder = RangeProcessor::new(WorkQueue::new(2)?).with_chunks_per_thread(usize::MAX);
    assert_eq!(finder.process(10)?, trial_division(10));
    assert_eq!(finder.process(0)?, BTreeSet::new());
    finder.into_pool().join()?;

    let finder =
        RangeProcessor::new(RayonThreadPool::new(3)?).with_chunks_per_thread(usize::MAX / 2);
    assert_eq!(finder.process(500)?, trial_division(500));
    finder.into_pool().join()
}

#[test]
fn custom_predicate() -> Result<()> {
    let finder = RangeProcessor::new(WorkQueue::new(2)?).with_predicate(|n| n % 10 == 0);
    let found: Vec<u64> = finder.process(55)?.into_iter().collect();
    assert_eq!(found, vec![10, 20, 30, 40, 50]);
    finder.into_pool().join()
}

#[test]
fn panicking_chunk_yields_no_matches() -> Result<()> {
    const MAX: u64 = 200;
    const THREADS: usize = 2;
    const CHUNKS_PER_THREAD: usize = 4;

    fn fails_at_150(n: u64) -> bool {
        if n == 150 {
            panic_control::disable_hook_in_current_thread();
            panic!("predicate failure");
        }
        workq::is_prime(n)
    }

    let finder = RangeProcessor::new(WorkQueue::new(THREADS)?)
        .with_predicate(fails_at_150)
        .with_chunks_per_thread(CHUNKS_PER_THREAD);
    let found = finder.process(MAX as i64)?;

    let failed = partition(MAX, THREADS * CHUNKS_PER_THREAD)
        .into_iter()
        .find(|chunk| chunk.contains(150))
        .unwrap();
    let expected: BTreeSet<u64> = trial_division(MAX as i64)
        .into_iter()
        .filter(|&p| !failed.contains(p))
        .collect();
    assert_eq!(found, expected);

    // The pool survives the failure.
    assert_eq!(finder.process(100)?.len(), 25);
    finder.into_pool().join()
}

use std::collections::BTreeSet;

use log::debug;

use crate::range::RangeProcessor;
use crate::thread_pool::{ThreadPool, WorkQueue};
use crate::{Result, WorkqError};

/// Returns `true` if `n` is prime, using trial division by odd divisors.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }

    let mut divisor = 3;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Returns every prime less than or equal to `max`, computed on the calling
/// thread. A bound below 2 yields the empty set.
pub fn trial_division(max: i64) -> BTreeSet<u64> {
    let max = u64::try_from(max).unwrap_or(0);
    (1..=max).filter(|&n| is_prime(n)).collect()
}

/// Returns every prime less than or equal to `max`, computed on a
/// [`WorkQueue`] with `threads` workers.
///
/// The queue is joined before returning, so no worker thread outlives the
/// call.
///
/// # Errors
///
/// Returns [`WorkqError::InvalidThreadCount`] if `threads` is zero and
/// [`WorkqError::NegativeBound`] if `max` is negative. Both are checked
/// before any thread is started.
pub fn find_primes(max: i64, threads: usize) -> Result<BTreeSet<u64>> {
    if threads == 0 {
        return Err(WorkqError::InvalidThreadCount(threads));
    }
    if max < 0 {
        return Err(WorkqError::NegativeBound(max));
    }

    let finder = RangeProcessor::new(WorkQueue::new(threads)?);
    let primes = finder.process(max)?;
    finder.into_pool().join()?;

    debug!("Found {} primes up to {max} with {threads} threads", primes.len());
    Ok(primes)
}

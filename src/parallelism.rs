use crossbeam_channel::TryRecvError;
use log::trace;
use std::thread;

/// Partial results that can be combined in any order.
pub trait ParResult {
    fn add(&mut self, other: Self);
}

impl ParResult for crate::frequency::WordFrequencyTable {
    fn add(&mut self, other: Self) {
        self.merge(&other);
    }
}

/// Run `runner` for every job `0..jobs` on a pool of worker threads.
///
/// Each thread accumulates into its own result built with `builder`; the
/// thread totals are then combined with [ParResult::add].
pub fn compute_parallel<TParResult, TBuilder, TRunner>(
    builder: TBuilder,
    runner: TRunner,
    jobs: usize,
) -> TParResult
where
    TParResult: ParResult + Send,
    TBuilder: Fn() -> TParResult + Send + Copy,
    TRunner: Fn(usize, &mut TParResult) + Send + Copy,
{
    let mut total = builder();
    if jobs == 0 {
        return total;
    }
    let (s1, r1) = crossbeam_channel::unbounded();
    for job in 0..jobs {
        s1.send(job).expect("receiver is alive");
    }
    drop(s1);
    let nthreads = num_cpus::get().min(jobs);
    trace!(target: "gender_analysis", "{jobs} jobs, {nthreads} threads");
    thread::scope(|scope| {
        let (s2, r2) = crossbeam_channel::unbounded();
        for _ in 0..nthreads {
            let r1 = r1.clone();
            let s2 = s2.clone();
            scope.spawn(move || {
                let mut thread_total = builder();
                loop {
                    match r1.try_recv() {
                        Ok(job) => {
                            runner(job, &mut thread_total);
                        }
                        Err(TryRecvError::Empty) => unreachable!(),
                        Err(TryRecvError::Disconnected) => break,
                    }
                }
                s2.send(thread_total).expect("receiver is alive");
            });
        }
        drop(s2);
        while let Ok(thread_total) = r2.recv() {
            total.add(thread_total);
        }
    });
    total
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frequency::WordFrequencyTable;

    struct Sum(usize);

    impl ParResult for Sum {
        fn add(&mut self, other: Self) {
            self.0 += other.0;
        }
    }

    #[test]
    fn sum_of_jobs() {
        let r = compute_parallel(|| Sum(0), |job, r| r.0 += job, 1000);
        assert_eq!(r.0, 999 * 1000 / 2);
    }

    #[test]
    fn no_jobs() {
        let r = compute_parallel(|| Sum(7), |_, _| unreachable!(), 0);
        assert_eq!(r.0, 7);
    }

    #[test]
    fn merge_tables() {
        let words = ["a", "b", "c"];
        let r = compute_parallel(
            WordFrequencyTable::new,
            |job, t| t.add(words[job % 3], 1),
            30,
        );
        assert_eq!(r.get("a"), 10);
        assert_eq!(r.total(), 30);
    }
}

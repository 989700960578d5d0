use dphash::PerfectMap;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

fn main() {
    const NUM_THREADS: u64 = 16;
    const KEY_MAX: u64 = 2560;

    let keep_running = Arc::new(AtomicBool::new(true));
    let map = Arc::new(PerfectMap::new());
    let threads: Vec<_> = (0..NUM_THREADS)
        .map(|residue| {
            let keep_running = keep_running.clone();
            let map = map.clone();

            thread::spawn(move || {
                while keep_running.load(Ordering::Relaxed) {
                    for key in (0..KEY_MAX).filter(|key| key % NUM_THREADS == residue) {
                        assert!(map.insert(key, key));
                        assert_eq!(map.remove(key), Some(key));
                    }
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_secs(5));
    keep_running.store(false, Ordering::Relaxed);

    let results = threads.into_iter().map(|t| t.join());

    for result in results.into_iter() {
        assert!(result.is_ok());
    }

    map.check_invariants();
    println!("{} pairs left after churn", map.len());
}

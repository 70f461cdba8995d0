use ramlog_sync::SpinLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn guard_unlocks_on_drop() {
    let l = SpinLock::new(0u32);

    {
        let mut g = l.lock();
        *g = 7;
    }

    // re-acquiring proves the drop released the lock
    assert_eq!(*l.lock(), 7);
}

#[test]
fn try_lock_fails_while_held() {
    let l = SpinLock::new(());

    let g = l.try_lock();
    assert!(g.is_some());
    assert!(l.try_lock().is_none());

    drop(g);
    assert!(l.try_lock().is_some());
}

#[test]
fn with_lock_returns_closure_result() {
    let l = SpinLock::new(vec![1u8, 2]);
    let len = l.with_lock(|v| {
        v.push(3);
        v.len()
    });
    assert_eq!(len, 3);
    assert_eq!(l.lock().as_slice(), &[1, 2, 3]);
}

#[test]
fn get_mut_bypasses_locking() {
    let mut l = SpinLock::new(1u32);
    *l.get_mut() += 1;
    assert_eq!(*l.lock(), 2);
}

#[test]
fn contended_counting_is_exact() {
    let threads = 8;
    let iters = 5_000;

    let lock = Arc::new(SpinLock::new(0usize));
    let in_critical = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let in_critical = Arc::clone(&in_critical);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for _ in 0..iters {
                    lock.with_lock(|v| {
                        assert_eq!(
                            in_critical.fetch_add(1, Ordering::SeqCst),
                            0,
                            "mutual exclusion violated"
                        );
                        *v += 1;
                        in_critical.fetch_sub(1, Ordering::SeqCst);
                    });
                    thread::yield_now();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(lock.with_lock(|v| *v), threads * iters);
}

/// `SpinLock<T>` must be shareable whenever `T` can be sent between contexts.
#[test]
fn spinlock_is_sync_for_send_t() {
    fn takes_sync<S: Sync>(_s: &S) {}
    let l = SpinLock::new(0u8);
    takes_sync(&l);
}

//! Concurrent usage of one shared emitter from many tasks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wildcast_core::{arg, Arg, Emitter, ListenerId};

const EVENTS: [&str; 3] = ["order.created", "order.shipped", "order.*"];

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn random_interleaved_operations_leave_a_consistent_registry() {
    let emitter = Emitter::new();
    let invocations = Arc::new(AtomicUsize::new(0));

    let mut workers = Vec::new();
    for worker in 0..10u64 {
        let emitter = emitter.clone();
        let invocations = Arc::clone(&invocations);
        workers.push(tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(0xCA57 + worker);
            let mut registered: Vec<(usize, ListenerId)> = Vec::new();

            for _ in 0..100 {
                let event_idx = rng.gen_range(0..EVENTS.len());
                match rng.gen_range(0..3) {
                    0 => {
                        let invocations = Arc::clone(&invocations);
                        let id = emitter.on(EVENTS[event_idx], move |_: &[Arg]| {
                            invocations.fetch_add(1, Ordering::Relaxed);
                        });
                        registered.push((event_idx, id));
                    }
                    1 => {
                        if let Some((idx, id)) = registered.pop() {
                            emitter.remove_listener(EVENTS[idx], id);
                        }
                    }
                    _ => {
                        emitter.emit_async(EVENTS[event_idx], vec![arg(worker)]);
                    }
                }
            }

            registered
        }));
    }

    let mut surviving: Vec<(usize, ListenerId)> = Vec::new();
    for worker in workers {
        surviving.extend(worker.await.unwrap());
    }

    // Final counts must reflect exactly the net register/remove effect:
    // exact listeners plus the glob listeners that cover each name.
    let count_for = |idx: usize| surviving.iter().filter(|(i, _)| *i == idx).count();
    let glob = count_for(2);
    assert_eq!(emitter.listeners_count("order.created"), count_for(0) + glob);
    assert_eq!(emitter.listeners_count("order.shipped"), count_for(1) + glob);

    // Every surviving listener is still individually removable.
    for (idx, id) in surviving {
        emitter.remove_listener(EVENTS[idx], id);
    }
    assert_eq!(emitter.listeners_count("order.created"), 0);
    assert_eq!(emitter.listeners_count("order.shipped"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrently_registered_once_listeners_each_fire_once() {
    let emitter = Emitter::new();
    let fired = Arc::new(AtomicUsize::new(0));

    let mut workers = Vec::new();
    for _ in 0..10 {
        let emitter = emitter.clone();
        let fired = Arc::clone(&fired);
        workers.push(tokio::spawn(async move {
            for _ in 0..10 {
                let fired = Arc::clone(&fired);
                emitter.once("batch.ready", move |_: &[Arg]| {
                    fired.fetch_add(1, Ordering::SeqCst);
                });
            }
        }));
    }
    for worker in workers {
        worker.await.unwrap();
    }

    assert_eq!(emitter.listeners_count("batch.ready"), 100);

    emitter.emit_sync("batch.ready", &[]);

    assert_eq!(fired.load(Ordering::SeqCst), 100);
    assert_eq!(emitter.listeners_count("batch.ready"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn emitters_shared_across_tasks_deliver_to_all_registrations() {
    let emitter = Emitter::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut workers = Vec::new();
    for worker in 0..8u32 {
        let emitter = emitter.clone();
        let tx = tx.clone();
        workers.push(tokio::spawn(async move {
            let tx = tx.clone();
            emitter.on("fanout", move |args: &[Arg]| {
                let round = args[0].downcast_ref::<u32>().copied().unwrap_or(0);
                let _ = tx.send((worker, round));
            });
        }));
    }
    drop(tx);
    for worker in workers {
        worker.await.unwrap();
    }

    emitter.emit_async("fanout", vec![arg(1u32)]);

    let mut deliveries = Vec::new();
    for _ in 0..8 {
        let delivery = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        deliveries.push(delivery);
    }
    deliveries.sort();
    let workers_seen: Vec<u32> = deliveries.iter().map(|(w, _)| *w).collect();
    assert_eq!(workers_seen, (0..8).collect::<Vec<u32>>());
    assert!(deliveries.iter().all(|(_, round)| *round == 1));
}

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nodeaddr_io::prelude::*;

type Save = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A log of saved values and a factory for saves that append to it.
fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Save) {
    let saved = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&saved);
    let save = move |n: u32| {
        let sink = Arc::clone(&sink);
        Box::pin(async move {
            sink.lock().unwrap().push(n);
        }) as Save
    };
    (saved, save)
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_the_last_write() {
    let debouncer = Debouncer::new(AutosaveOptions::default());
    let (saved, save) = recorder();

    for n in 1..=3 {
        debouncer.schedule("doc-1", save(n));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(saved.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(*saved.lock().unwrap(), vec![3]);
    assert_eq!(debouncer.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn keys_are_debounced_independently() {
    let debouncer = Debouncer::new(AutosaveOptions {
        delay: Duration::from_millis(50),
    });
    let (saved, save) = recorder();

    debouncer.schedule("a", save(1));
    debouncer.schedule("b", save(2));
    assert_eq!(debouncer.pending_count(), 2);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let mut got = saved.lock().unwrap().clone();
    got.sort();
    assert_eq!(got, vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_the_pending_save() {
    let debouncer = Debouncer::new(AutosaveOptions::default());
    let (saved, save) = recorder();

    debouncer.schedule("doc-1", save(1));
    assert!(debouncer.is_pending(&"doc-1"));
    assert!(debouncer.cancel(&"doc-1"));
    assert!(!debouncer.cancel(&"doc-1"));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(saved.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn edits_spaced_beyond_the_delay_all_save() {
    let debouncer = Debouncer::new(AutosaveOptions {
        delay: Duration::from_millis(10),
    });
    let (saved, save) = recorder();

    debouncer.schedule("doc-1", save(1));
    tokio::time::sleep(Duration::from_millis(20)).await;
    debouncer.schedule("doc-1", save(2));
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(*saved.lock().unwrap(), vec![1, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tight_reschedule_loop_saves_only_the_last_value() {
    let debouncer = Debouncer::new(AutosaveOptions {
        delay: Duration::from_millis(100),
    });
    let (saved, save) = recorder();

    for n in 1..=500 {
        debouncer.schedule("doc-1", save(n));
    }
    assert_eq!(debouncer.pending_count(), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(*saved.lock().unwrap(), vec![500]);
    assert!(!debouncer.is_pending(&"doc-1"));
}

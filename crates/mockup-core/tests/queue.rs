use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use mockup_core::{CoreError, QueueStats, TaskQueue};
use tokio::sync::oneshot;

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, payload: String) -> impl Future<Output = Result<(), CoreError>> + Send + 'static {
    let log = Arc::clone(log);
    async move {
        log.lock().unwrap().push(payload);
        Ok(())
    }
}

#[tokio::test]
async fn two_tasks_run_in_submission_order() {
    let queue = TaskQueue::new("test");
    let log: Log = Arc::default();

    queue.add_task_with("push", "A".to_string(), |p| push(&log, p)).unwrap();
    queue.add_task_with("push", "B".to_string(), |p| push(&log, p)).unwrap();
    queue.wait_idle().await;

    assert_eq!(*log.lock().unwrap(), vec!["A", "B"]);
}

#[tokio::test(start_paused = true)]
async fn burst_runs_each_task_once_in_order() {
    let queue = TaskQueue::new("burst");
    let log: Log = Arc::default();

    let ids: Vec<_> = (0..50)
        .map(|i| {
            let log = Arc::clone(&log);
            queue
                .add_task(format!("task-{i}"), async move {
                    // later tasks finish faster; order must still hold
                    tokio::time::sleep(Duration::from_millis(50 - i)).await;
                    log.lock().unwrap().push(i.to_string());
                    Ok::<_, CoreError>(())
                })
                .unwrap()
        })
        .collect();
    queue.wait_idle().await;

    let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
    assert_eq!(*log.lock().unwrap(), expected);
    assert_eq!(ids, (0..50).collect::<Vec<u64>>());
    assert_eq!(queue.stats().completed, 50);
}

#[tokio::test(start_paused = true)]
async fn tasks_never_overlap() {
    let queue = TaskQueue::new("serial");
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    for _ in 0..10 {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        queue
            .add_task("overlap-probe", async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, CoreError>(())
            })
            .unwrap();
    }
    queue.wait_idle().await;

    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_task_does_not_stop_the_queue() {
    let queue = TaskQueue::new("failing");
    let log: Log = Arc::default();

    queue.add_task_with("push", "before".to_string(), |p| push(&log, p)).unwrap();
    queue
        .add_task("broken", async { Err::<(), _>("crm unavailable") })
        .unwrap();
    queue.add_task_with("push", "after".to_string(), |p| push(&log, p)).unwrap();
    queue.wait_idle().await;

    assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
    assert_eq!(
        queue.stats(),
        QueueStats { pending: 0, draining: false, completed: 2, failed: 1 }
    );
}

#[tokio::test]
async fn panicking_task_does_not_stop_the_queue() {
    let queue = TaskQueue::new("panicking");
    let log: Log = Arc::default();

    queue
        .add_task("explodes", async {
            if true {
                panic!("task blew up");
            }
            Ok::<_, CoreError>(())
        })
        .unwrap();
    queue.add_task_with("push", "survivor".to_string(), |p| push(&log, p)).unwrap();
    queue.wait_idle().await;

    assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    assert_eq!(queue.stats().failed, 1);
}

#[tokio::test]
async fn draining_flag_clears_only_when_pending_is_empty() {
    let queue = TaskQueue::new("flag");
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let log: Log = Arc::default();

    queue
        .add_task("gate", async move {
            let _ = release_rx.await;
            Ok::<_, CoreError>(())
        })
        .unwrap();
    queue.add_task_with("push", "tail".to_string(), |p| push(&log, p)).unwrap();

    // add_task returned while the first task is still blocked
    let stats = queue.stats();
    assert!(stats.draining);
    assert!(!queue.is_idle());

    release_tx.send(()).unwrap();
    queue.wait_idle().await;

    let stats = queue.stats();
    assert!(!stats.draining);
    assert_eq!(stats.pending, 0);
    assert_eq!(*log.lock().unwrap(), vec!["tail"]);
}

#[tokio::test]
async fn queue_reactivates_after_idle() {
    let queue = TaskQueue::new("reactivate");
    let log: Log = Arc::default();

    queue.add_task_with("push", "first".to_string(), |p| push(&log, p)).unwrap();
    queue.wait_idle().await;
    assert!(queue.is_idle());

    queue.add_task_with("push", "second".to_string(), |p| push(&log, p)).unwrap();
    queue.wait_idle().await;

    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn wait_idle_on_fresh_queue_returns() {
    let queue = TaskQueue::new("fresh");
    queue.wait_idle().await;
    assert_eq!(queue.stats(), QueueStats::default());
}

#[tokio::test]
async fn clones_share_one_worker() {
    let queue = TaskQueue::new("shared");
    let other = queue.clone();
    let log: Log = Arc::default();

    queue.add_task_with("push", "a".to_string(), |p| push(&log, p)).unwrap();
    other.add_task_with("push", "b".to_string(), |p| push(&log, p)).unwrap();
    other.wait_idle().await;

    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    assert_eq!(queue.stats().completed, 2);
}

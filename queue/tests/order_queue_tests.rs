use std::sync::Arc;

use uuid::Uuid;

use dispatch_core::coordinate::Coordinate;
use dispatch_core::job::{Job, Stop, StopType};
use dispatch_core::order::{Order, OrderStatus};
use queue::manager::OrderQueue;
use queue::model::{CancelOutcome, Stage};
use queue::store::memory_store::InMemoryOrderStore;

fn order_at(created_at_secs: u64) -> Order {
    Order::new_raw(
        Uuid::new_v4(),
        Coordinate::new(1.0, 1.0),
        Coordinate::new(1.01, 1.01),
        None,
        created_at_secs,
        None,
    )
}

fn single_job(order: &Order) -> Job {
    Job::new(
        Uuid::new_v4(),
        vec![
            Stop {
                stop_type: StopType::Pickup,
                order_id: order.id,
                coordinate: order.pickup,
                pickup_location_id: order.merchant_id.clone(),
            },
            Stop {
                stop_type: StopType::Dropoff,
                order_id: order.id,
                coordinate: order.dropoff,
                pickup_location_id: None,
            },
        ],
        vec![order.id],
        60.0,
        1.0,
        0.0,
    )
}

async fn new_queue() -> OrderQueue<InMemoryOrderStore> {
    OrderQueue::new(Arc::new(InMemoryOrderStore::new()))
        .await
        .unwrap()
}

#[tokio::test]
async fn enqueue_raw_is_idempotent() {
    let q = new_queue().await;
    let o = order_at(0);

    q.enqueue_raw(o.clone(), 0).await.unwrap();
    q.enqueue_raw(o.clone(), 0).await.unwrap();

    let moved = q.advance_to_batching(1000, 0, 1000, 10).await;
    assert_eq!(moved.len(), 1);
}

#[tokio::test]
async fn advance_to_batching_respects_limit_and_arrival_order() {
    let q = new_queue().await;
    let o1 = order_at(0);
    let o2 = order_at(1);
    let o3 = order_at(2);

    q.enqueue_raw(o1.clone(), 0).await.unwrap();
    q.enqueue_raw(o2.clone(), 1).await.unwrap();
    q.enqueue_raw(o3.clone(), 2).await.unwrap();

    let moved = q.advance_to_batching(100, 0, 0, 2).await;
    assert_eq!(moved.len(), 2);
    assert_eq!(moved[0].id, o1.id);
    assert_eq!(moved[1].id, o2.id);
}

#[tokio::test]
async fn order_ages_out_even_with_unmet_ready_horizon() {
    let q = new_queue().await;
    let mut o = order_at(0);
    o.ready_at_secs = Some(10_000);
    q.enqueue_raw(o.clone(), 0).await.unwrap();

    // ready_horizon_sec = 60, ready_at is far in the future, but
    // max_raw_age_sec forces it through anyway.
    let moved = q.advance_to_batching(500, 60, 500, 10).await;
    assert_eq!(moved.len(), 1);
}

#[tokio::test]
async fn commit_jobs_moves_orders_to_ready_and_pop_ready_is_fifo() {
    let q = new_queue().await;
    let o1 = order_at(0);
    let o2 = order_at(1);
    q.enqueue_raw(o1.clone(), 0).await.unwrap();
    q.enqueue_raw(o2.clone(), 1).await.unwrap();
    q.advance_to_batching(100, 0, 0, 10).await;

    let job1 = single_job(&o1);
    let job2 = single_job(&o2);
    q.commit_jobs(vec![job1.clone()], 100).await;
    q.commit_jobs(vec![job2.clone()], 101).await;

    let popped = q.pop_ready(10).await;
    assert_eq!(popped.len(), 2);
    assert_eq!(popped[0].id, job1.id);
    assert_eq!(popped[1].id, job2.id);
}

#[tokio::test]
#[should_panic(expected = "is not in BATCHING")]
async fn commit_jobs_panics_on_order_not_in_batching() {
    let q = new_queue().await;
    let o = order_at(0);
    let job = single_job(&o);
    // o was never advanced to BATCHING.
    q.commit_jobs(vec![job], 0).await;
}

#[tokio::test]
async fn cancel_removes_raw_order() {
    let q = new_queue().await;
    let o = order_at(0);
    q.enqueue_raw(o.clone(), 0).await.unwrap();

    let outcome = q.cancel(o.id).await.unwrap();
    assert_eq!(outcome, CancelOutcome::Removed);

    let moved = q.advance_to_batching(1000, 0, 0, 10).await;
    assert!(moved.is_empty());
}

#[tokio::test]
async fn cancel_of_order_in_ready_job_reports_the_job_id() {
    let q = new_queue().await;
    let o = order_at(0);
    q.enqueue_raw(o.clone(), 0).await.unwrap();
    q.advance_to_batching(100, 0, 0, 10).await;
    let job = single_job(&o);
    q.commit_jobs(vec![job.clone()], 100).await;

    let outcome = q.cancel(o.id).await.unwrap();
    assert_eq!(outcome, CancelOutcome::PartOfReadyJob(job.id));
}

#[tokio::test]
async fn cancel_of_unknown_order_is_not_found() {
    let q = new_queue().await;
    let outcome = q.cancel(Uuid::new_v4()).await.unwrap();
    assert_eq!(outcome, CancelOutcome::NotFound);
}

#[tokio::test]
async fn shatter_job_returns_orders_to_raw() {
    let q = new_queue().await;
    let o = order_at(0);
    q.enqueue_raw(o.clone(), 0).await.unwrap();
    q.advance_to_batching(100, 0, 0, 10).await;
    let job = single_job(&o);
    q.commit_jobs(vec![job.clone()], 100).await;

    let shattered = q.shatter_job(job.id, 200).await;
    assert_eq!(shattered, vec![o.id]);

    let wait = q.wait_seconds_in(Stage::Raw, o.id, 250).await;
    assert_eq!(wait, Some(50));
}

#[tokio::test]
async fn mark_assigned_transitions_reconstructed_orders_to_assigned() {
    let q = new_queue().await;
    let o = order_at(0);
    q.enqueue_raw(o.clone(), 0).await.unwrap();
    q.advance_to_batching(100, 0, 0, 10).await;
    let job = single_job(&o);
    q.commit_jobs(vec![job.clone()], 100).await;

    let assigned = q.mark_assigned(&job, 200).unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, o.id);
    assert_eq!(assigned[0].status, OrderStatus::Assigned);
}

#[tokio::test]
async fn wait_seconds_in_is_none_when_absent() {
    let q = new_queue().await;
    let wait = q.wait_seconds_in(Stage::Raw, Uuid::new_v4(), 10).await;
    assert_eq!(wait, None);
}

#[tokio::test]
async fn order_status_reflects_lifecycle_stage() {
    let mut o = order_at(0);
    assert_eq!(o.status, OrderStatus::Raw);
    o.status = OrderStatus::Batching;
    assert_eq!(o.status.to_string(), "BATCHING");
}

use crate::monitor::model::SummaryModel;
use crate::workflow::runner::Runner;
use anyhow::Result;
use serde_json::json;
use spscore::prelude::Candidate;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn monitor_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

/// Bridge that hosts the run-summary HTTP endpoint and clusters incoming
/// candidate batches.
pub struct MonitorBridge {
    state: Arc<RwLock<SummaryModel>>,
}

impl MonitorBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        let state = Arc::new(RwLock::new(SummaryModel::default()));
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("summary")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<SummaryModel>>| warp::reply::json(&*state.read().unwrap()));

        let post_route = warp::path("ingest")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |batch: Vec<Candidate>,
                 state: Arc<RwLock<SummaryModel>>,
                 runner: Arc<Runner>| async move {
                    let batch_len = batch.len();
                    match runner.cluster_batch(batch) {
                        Ok(survivors) => {
                            let kept = survivors.len();
                            let mut guard = state.write().unwrap();
                            guard.input_candidates = batch_len;
                            guard.groups_kept = kept;
                            guard.survivors = survivors;
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "ingested": batch_len,
                                    "kept": kept
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            eprintln!("ingest error: {}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(post_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(monitor_bind_address()).await;
            });
        });

        Self { state }
    }

    pub fn publish(&self, model: &SummaryModel) -> Result<()> {
        let mut guard = self.state.write().unwrap();
        *guard = model.clone();
        println!(
            "[monitor] buffers: {}, candidates in: {}, kept: {}",
            guard.buffers_emitted, guard.input_candidates, guard.groups_kept
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[monitor] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SummaryModel {
        self.state.read().unwrap().clone()
    }
}

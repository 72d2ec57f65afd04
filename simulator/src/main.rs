use anyhow::Context;
use clap::Parser;
use generator::profile::{build_scenario_from_config, GeneratorConfig};
use monitor::bridge::MonitorBridge;
use monitor::model::SummaryModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod monitor;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Single-pulse search pipeline driver")]
struct Args {
    /// Run one synthetic observation offline and emit a baseline summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 16)]
    channels: usize,
    #[arg(long, default_value_t = 256)]
    spectra: usize,
    #[arg(long, default_value_t = 12)]
    blocks: usize,
    /// Keep the monitor bridge alive for incoming candidate batches
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.channels, args.spectra, args.blocks)
    };

    let runner = Runner::new(workflow_config.clone());
    let monitor = MonitorBridge::new(Arc::new(runner.clone()));
    let generator = GeneratorConfig::from_workflow(&workflow_config);
    let scenario = build_scenario_from_config(&generator)?;

    if args.offline {
        let result = runner.execute(&scenario)?;

        println!(
            "Offline run -> buffers {}, candidates in {}, kept {}",
            result.buffers_emitted, result.input_candidates, result.groups_kept
        );

        let model = SummaryModel {
            buffers_emitted: result.buffers_emitted,
            input_candidates: result.input_candidates,
            groups_kept: result.groups_kept,
            survivors: result.survivors.clone(),
            notes: result.notes.clone(),
        };

        monitor.publish(&model)?;
        monitor.publish_status("Offline workflow results ready.");

        let report = format!(
            "buffers={} candidates_in={} kept={} notes={:?}\n",
            result.buffers_emitted, result.input_candidates, result.groups_kept, result.notes
        );
        let report_path = PathBuf::from("tools/data/offline_search.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        monitor.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

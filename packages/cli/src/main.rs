use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use fedtime_core::{BaseTime, Int64Time};
use fedtime_sync::adapters::{deliver_callbacks, CheckpointStore, LoopbackFederation, LoopbackRti};
use fedtime_sync::{ExecutiveConfig, FederateExecutive, ManualClock, ScenarioTimeline, SimTimeline, SyncPntState};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// fedtime - federated time translation and rendezvous
#[derive(Parser, Debug)]
#[command(name = "fedtime")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Executive configuration (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "fedtime_sync=debug"
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert scenario times to simulation time and logical time
    Convert(ConvertArgs),
    /// Run a timed pause point across in-process federates
    Demo(DemoArgs),
    /// List stored checkpoints or print one
    Inspect {
        /// Checkpoint store directory
        #[arg(short, long)]
        store: PathBuf,
        /// Checkpoint to print; lists all when omitted
        name: Option<String>,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Scenario epoch in seconds
    #[arg(long)]
    epoch: Option<f64>,
    /// Simulation offset in seconds
    #[arg(long)]
    sim_offset: Option<f64>,
    /// Logical time offset in seconds
    #[arg(long)]
    hlt_offset: Option<f64>,
    /// Logical time resolution (seconds, milliseconds, microseconds, ...)
    #[arg(long)]
    base_time: Option<BaseTime>,
    /// Scenario times in seconds
    #[arg(required = true, allow_negative_numbers = true)]
    times: Vec<f64>,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Number of federates
    #[arg(short, long, default_value_t = 3)]
    federates: usize,
    /// Pause point label
    #[arg(long, default_value = "FREEZE")]
    label: String,
    /// Logical time of the pause point, in seconds
    #[arg(long, default_value_t = 2.0)]
    freeze_at: f64,
    /// Frames to run
    #[arg(long, default_value_t = 40)]
    frames: u32,
    /// Wall seconds per frame
    #[arg(long, default_value_t = 0.1)]
    frame: f64,
    /// Save every federate's final checkpoint to this store
    #[arg(long)]
    store: Option<PathBuf>,
}

type Federate = FederateExecutive<ManualClock, LoopbackRti>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert(args) => convert(config, &args),
        Commands::Demo(args) => demo(config, &args),
        Commands::Inspect { store, name } => inspect(&store, name.as_deref()),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ExecutiveConfig> {
    let Some(path) = path else {
        return Ok(ExecutiveConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid configuration in {}", path.display()))
}

// ============================================================================
// convert
// ============================================================================

fn convert(mut config: ExecutiveConfig, args: &ConvertArgs) -> Result<()> {
    let timeline = &mut config.timeline;
    if let Some(epoch) = args.epoch {
        timeline.scenario_epoch = epoch;
    }
    if let Some(offset) = args.sim_offset {
        timeline.sim_offset = offset;
    }
    if let Some(offset) = args.hlt_offset {
        timeline.hlt_offset = offset;
    }
    if let Some(base) = args.base_time {
        timeline.base_time = base;
    }

    let sim = SimTimeline::with_epoch(ManualClock::new(), timeline.sim_epoch);
    let scenario = ScenarioTimeline::from_config(&sim, timeline).context("Timeline offsets are not representable")?;

    for &time in &args.times {
        let hlt = scenario
            .compute_hlt(time)
            .with_context(|| format!("Scenario time {time} has no logical time"))?;
        let row = json!({
            "scenario": time,
            "simulation": scenario.compute_simulation_time(time),
            "hlt_ticks": hlt.base_time(),
            "hlt_seconds": hlt.to_seconds_in(scenario.base_time()),
            "scenario_from_hlt": scenario.time_from_hlt(hlt),
        });
        println!("{row}");
    }
    Ok(())
}

// ============================================================================
// demo
// ============================================================================

fn pump(federates: &mut [Federate]) {
    for exec in federates.iter_mut() {
        let handle = exec.sync().rti().handle();
        for e in deliver_callbacks(exec.sync_mut()) {
            warn!(federate = %handle, error = %e, "callback rejected");
        }
    }
}

fn demo(config: ExecutiveConfig, args: &DemoArgs) -> Result<()> {
    if args.federates == 0 {
        return Err(anyhow!("at least one federate is required"));
    }
    let at = Int64Time::from_seconds_in(args.freeze_at, config.timeline.base_time)?;

    let federation = LoopbackFederation::new();
    let mut federates = Vec::with_capacity(args.federates);
    for _ in 0..args.federates {
        let mut exec = FederateExecutive::new(config.clone(), ManualClock::new(), federation.join())?;
        exec.initialize()?;
        federates.push(exec);
    }
    let base = config.timeline.base_time;
    info!(
        federates = args.federates,
        label = %args.label,
        freeze_at = %at.display_in(base),
        "🚀 loopback federation ready"
    );

    if let Some((first, rest)) = federates.split_first_mut() {
        first.add_pause_point(&args.label, at)?;
        for exec in rest {
            exec.sync_mut().add_timed_sync_point(&args.label, &config.pause_list, at)?;
        }
    }
    pump(&mut federates);

    for frame in 1..=args.frames {
        for exec in federates.iter_mut().filter(|exec| !exec.is_frozen()) {
            let requested = exec
                .sync()
                .get_sync_point(&args.label)
                .is_some_and(|p| p.base().achieve_requested());
            if exec.sync().state_of(&args.label) == Some(SyncPntState::Announced) && !requested {
                exec.sync_mut().achieve_sync_point(&args.label)?;
            }
        }
        pump(&mut federates);

        for exec in federates.iter_mut().filter(|exec| !exec.is_frozen()) {
            exec.sim_timeline().clock().advance(args.frame);
            let request = exec.pre_advance()?;
            for label in exec.post_advance(request)? {
                info!(
                    frame,
                    federate = %exec.sync().rti().handle(),
                    %label,
                    granted = %exec.granted().display_in(base),
                    "pause point reached"
                );
            }
        }

        if federates.iter().all(Federate::is_frozen) {
            info!(frame, "⏸️ every federate frozen");
            break;
        }
    }

    let store = args.store.as_deref().map(CheckpointStore::new).transpose()?;
    for exec in federates.iter_mut() {
        let handle = exec.sync().rti().handle();
        print!("{handle}: {}", exec.pause().render(exec.sync()));
        let checkpoint = exec.shutdown();
        if let Some(store) = &store {
            let meta = store.save(&format!("federate_{}", handle.id()), &checkpoint, exec.granted(), base)?;
            info!(name = %meta.name, revision = meta.revision, bytes = meta.bytes, "💾 checkpoint saved");
        }
    }
    Ok(())
}

// ============================================================================
// inspect
// ============================================================================

fn inspect(path: &Path, name: Option<&str>) -> Result<()> {
    let store = CheckpointStore::new(path)?;
    let Some(name) = name else {
        for meta in store.list()? {
            println!(
                "{:<24} rev {:<4} granted {:<12} lists {:<3} records {:<4} {} bytes",
                meta.name,
                meta.revision,
                meta.granted.display_in(meta.base_time).to_string(),
                meta.lists,
                meta.records,
                meta.bytes
            );
        }
        return Ok(());
    };

    let checkpoint = store
        .load(name)?
        .ok_or_else(|| anyhow!("no checkpoint named '{name}'"))?;
    let base = store.meta(name)?.map(|meta| meta.base_time).unwrap_or_default();
    for (list, record) in checkpoint.records() {
        let label = record.label()?;
        let state = record
            .state()
            .map_or_else(|_| format!("<invalid {}>", record.state_code()), |s| s.to_string());
        match record.time() {
            Some(ticks) => {
                let time = Int64Time::from_base_time(ticks).display_in(base);
                println!("{list}: [{label}/{time}] -- {state}");
            }
            None => println!("{list}: [{label}] -- {state}"),
        }
    }
    Ok(())
}

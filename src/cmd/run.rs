use crate::reports;
use clap::Args;
use hftrigger::calibration::JsonCalibrationProvider;
use hftrigger::calo::CaloClusterCuts;
use hftrigger::config::FilterConfig;
use hftrigger::dalitz::{DalitzSelector, ElectronTrackCut, PairCut, PairMassCut, TrackCut};
use hftrigger::error::TrResult;
use hftrigger::filter::HfFilter;
use hftrigger::monitoring::CountingSink;
use hftrigger::track::Event;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: FilterConfig,

    /// Events as a JSON array
    #[arg(short, long)]
    pub events: String,

    /// Directory holding `<path>.json` calibration objects
    #[arg(long)]
    pub calib_dir: Option<String>,

    /// Per-event trigger bitmaps as CSV
    #[arg(short, long)]
    pub output: Option<String>,

    /// Skim calorimeter clusters with the default time and M02 windows
    #[arg(long, default_value_t = false)]
    pub calo: bool,

    /// Tag Dalitz pairs below this e+e- mass
    #[arg(long)]
    pub dalitz_max_mass: Option<f32>,
}

pub fn run(args: RunArgs, config: FilterConfig) -> TrResult<()> {
    println!("\n🚀 Initializing HF trigger...");
    let mut filter = HfFilter::from_config(&config)?;

    if let Some(dir) = &args.calib_dir {
        if config.pid.compute_tpc_post_calib {
            println!("📐 Loading TPC post-calibration from: {}", dir);
            filter = filter.load_calibration(&JsonCalibrationProvider::new(dir), &config)?;
        } else {
            warn!("--calib-dir given but --compute-tpc-post-calib is off, maps not loaded");
        }
    }

    if config.ml.apply_ml {
        warn!("No model store is reachable from the command line, BDT gating is disabled");
    }

    if args.calo {
        filter = filter.with_calo_cuts(CaloClusterCuts::default());
    }

    if let Some(max_mass) = args.dalitz_max_mass {
        let track_cuts: Vec<Box<dyn TrackCut>> = vec![Box::new(ElectronTrackCut::new("electron"))];
        let pair_cuts: Vec<Box<dyn PairCut>> = vec![Box::new(PairMassCut::new("mee", max_mass))];
        filter = filter.with_dalitz(DalitzSelector::new(track_cuts, pair_cuts)?);
    }

    let sink = Arc::new(CountingSink::new());
    let filter = filter.with_sink(sink.clone());

    println!("📂 Loading Events: {}", args.events);
    let events: Vec<Event> = serde_json::from_str(&fs::read_to_string(&args.events)?)?;

    let start = Instant::now();
    let decisions = filter.process_events(&events);
    let elapsed = start.elapsed();

    reports::print_trigger_summary(&decisions);
    if config.general.qa_level > 0 {
        reports::print_monitoring_summary(&sink);
    }
    println!(
        "⏱  {} events in {:.2?} ({:.0} events/s)",
        events.len(),
        elapsed,
        events.len() as f64 / elapsed.as_secs_f64().max(1e-9)
    );

    if let Some(path) = &args.output {
        reports::write_decisions_csv(path, &decisions)?;
        println!("💾 Wrote decisions to: {}", path);
    }

    Ok(())
}

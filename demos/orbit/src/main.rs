//! `orbit`: a ring of sources orbiting its centroid, streamed over OSC/UDP.
//!
//! Builds one macro of sources in a ring, sets it orbiting around its
//! centroid, and streams every frame to a renderer over OSC/UDP.  Halfway
//! through, a control thread pulls the ring in with an animated
//! concentration, as a live control surface would.
//!
//! ```text
//! cargo run -p orbit -- [config.json]
//! RUST_LOG=debug cargo run -p orbit
//! ```
//!
//! Every config field is optional; see `DemoConfig::default`.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sm_core::EngineConfig;
use sm_engine::{Behavior, Command, EngineBuilder, FormationParams, MacroSpec, OutputTransport, Target};
use sm_motion::{Concentration, Easing};
use sm_output::{CsvTransport, OscConfig, Tee, UdpOscTransport};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    engine:    EngineConfig,
    osc:       OscConfig,
    group:     String,
    count:     usize,
    formation: String,
    layout:    FormationParams,
    behavior:  Behavior,
    params:    BTreeMap<String, f64>,
    /// Frames to run.
    frames:    u64,
    /// Sleep between frames to match `engine.frame_rate`.
    realtime:  bool,
    /// Also write CSV files here.
    csv_dir:   Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            engine:    EngineConfig { seed: 42, ..EngineConfig::default() },
            osc:       OscConfig::default(),
            group:     "ring".to_owned(),
            count:     8,
            formation: "circle".to_owned(),
            layout:    FormationParams { radius: 3.0, ..FormationParams::default() },
            behavior:  Behavior::Orbit,
            params:    BTreeMap::from([("speed".to_owned(), 0.5)]),
            frames:    600,
            realtime:  true,
            csv_dir:   None,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path.as_deref())?;
    println!("=== orbit: spat_motion demo ===");
    println!(
        "Group: {} × {} ({})  |  Behavior: {}  |  Target: {}",
        cfg.count, cfg.group, cfg.formation, cfg.behavior, cfg.osc.target
    );
    println!();

    // 1. Transport: UDP always, CSV on request.
    let udp = UdpOscTransport::connect(cfg.osc.clone())?;
    let csv = match &cfg.csv_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Some(CsvTransport::new(dir)?)
        }
        None => None,
    };

    // 2. Engine and the group.
    let mut engine = EngineBuilder::new(cfg.engine.clone()).transport(Tee(udp, csv)).build()?;
    let mut spec = MacroSpec::with_count(&cfg.group, cfg.count, &cfg.formation)
        .layout(cfg.layout)
        .behavior(cfg.behavior);
    for (name, value) in &cfg.params {
        spec = spec.param(name, *value);
    }
    engine.create_macro(spec)?;
    engine.set_component(cfg.group.as_str(), "pull", Concentration::new(1.0)?)?;

    // 3. Control thread: pull the group in halfway through.
    let tx = engine.command_sender();
    let frame_dt = Duration::from_secs_f64(engine.clock().default_dt());
    let halfway = frame_dt * u32::try_from(cfg.frames / 2).unwrap_or(u32::MAX);
    let group = cfg.group.clone();
    let control = std::thread::spawn(move || {
        std::thread::sleep(halfway);
        tx.send(Command::AnimateConcentration {
            target:   Target::Macro(group),
            key:      "pull".into(),
            factor:   0.2,
            duration: 2.0,
            easing:   Easing::EaseInOut,
        })
    });

    // 4. Run.
    let t0 = Instant::now();
    let mut faults = 0;
    let mut commands = 0;
    for _ in 0..cfg.frames {
        let frame_start = Instant::now();
        let report = engine.update(None)?;
        faults += report.faults;
        commands += report.commands_applied;
        if cfg.realtime {
            if let Some(rest) = frame_dt.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
    let elapsed = t0.elapsed();
    if control.join().is_err() {
        eprintln!("control thread panicked");
    }

    let Tee(udp, csv) = engine.transport_mut();
    if let Some(csv) = csv {
        csv.finish()?;
        if let Some(e) = csv.take_error() {
            eprintln!("output error: {e}");
        }
    }
    let sent = udp.stats();
    info!(frames = cfg.frames, sent = sent.sent, failed = sent.failed, "run complete");

    // 5. Summary.
    println!("Ran {} frames in {:.3} s", engine.frame().0, elapsed.as_secs_f64());
    println!("  OSC messages : {} sent, {} failed", sent.sent, sent.failed);
    println!("  faults       : {faults}");
    println!("  commands     : {commands}");
    println!();

    println!("{:<10} {:>9} {:>9} {:>9}", "Source", "x", "y", "z");
    println!("{}", "-".repeat(40));
    for id in engine.macro_members(&cfg.group)? {
        if let Some(s) = engine.state(*id) {
            let p = s.position;
            println!("{:<10} {:>9.3} {:>9.3} {:>9.3}", id.0, p.x, p.y, p.z);
        }
    }

    Ok(())
}

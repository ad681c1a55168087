use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use pad_fc::clock::TokioClock;
use pad_fc::state::StatusHandle;
use pad_fc::FcConfig;
use pad_nav::{doctor, LandingParams, Maneuvers, NavParams};
use pad_proto::Waypoint;
use pad_sim::{SimConfig, Simulator};

#[derive(Debug, Parser)]
#[command(name = "padctl", version, about = "padlander - marker landing and waypoint control")]
struct Cli {
    /// TOML config. Every section is optional.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the configuration.
    Doctor,
    /// Land on the marker in the simulator.
    Land {
        #[arg(long)]
        alt: Option<f64>,
        #[arg(long)]
        marker_x: Option<f64>,
        #[arg(long)]
        marker_y: Option<f64>,
        #[arg(long)]
        marker_yaw: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Navigate to a waypoint in the simulator.
    Goto {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long, default_value_t = 0.0)]
        z: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        yaw_offset: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct Config {
    fc: FcConfig,
    landing: LandingParams,
    nav: NavParams,
    sim: SimConfig,
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let Some(path) = path else { return Ok(Config::default()) };
    let s = std::fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
    toml::from_str(&s).context("parse config toml")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Doctor => check(&cfg),
        Command::Land { alt, marker_x, marker_y, marker_yaw, seed } => {
            let sim = &mut cfg.sim;
            if let Some(v) = alt { sim.start_alt_m = v; }
            if let Some(v) = marker_x { sim.marker_x = v; }
            if let Some(v) = marker_y { sim.marker_y = v; }
            if let Some(v) = marker_yaw { sim.marker_heading_deg = v; }
            if seed.is_some() { sim.seed = seed; }
            check(&cfg)?;
            land(&cfg).await
        }
        Command::Goto { x, y, z, yaw_offset, seed } => {
            if seed.is_some() { cfg.sim.seed = seed; }
            check(&cfg)?;
            goto(&cfg, Waypoint { x, y, z, yaw_offset }).await
        }
    }
}

fn check(cfg: &Config) -> Result<()> {
    doctor::check_loop(&cfg.fc)?;
    doctor::check_landing(&cfg.landing)?;
    doctor::check_nav(&cfg.nav)?;
    cfg.sim.validate()?;
    info!("doctor: OK");
    Ok(())
}

fn build(cfg: &Config, sim: &Simulator) -> Maneuvers {
    let m = Maneuvers::new(
        sim.marker_slot(),
        Arc::new(sim.telemetry()),
        Box::new(sim.actuator()),
        Arc::new(TokioClock::new()),
        cfg.fc.clone(),
    )
    .with_landing_params(cfg.landing.clone())
    .with_nav_params(cfg.nav.clone());

    // Ctrl-C stops the maneuver at its next iteration
    let abort = m.abort_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt: aborting maneuver");
            abort.abort();
        }
    });
    spawn_status_reporter(m.status(), Duration::from_millis(cfg.fc.status_log_ms.max(100)));
    m
}

fn spawn_status_reporter(status: StatusHandle, every: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        loop {
            tick.tick().await;
            let st = status.snapshot();
            let Some(kind) = st.active else { continue };
            info!(
                "status: {:?} phase={} iters={} t={:.1}s lands={} last={:?}",
                kind,
                st.phase,
                st.iterations,
                st.running_for().unwrap_or_default().as_secs_f64(),
                st.land_attempts,
                st.last_command
            );
        }
    });
}

/// Log how the maneuver ended. A dead sim task outranks the maneuver's own error.
fn finished(m: &Maneuvers, sim: &Simulator) -> Result<()> {
    if let Some(note) = m.status().snapshot().last_note {
        info!("maneuver finished: {}", note);
    }
    sim.ensure_running().context("simulator")
}

async fn land(cfg: &Config) -> Result<()> {
    let sim = Simulator::spawn(cfg.sim.clone())?;
    let mut m = build(cfg, &sim);

    let res = m.land_on_marker().await;
    finished(&m, &sim)?;
    let report = res.context("landing maneuver")?;
    let st = sim.state();
    println!("LANDED attempts={} iterations={} climbs={}", report.land_attempts, report.iterations, report.climb_nudges);
    println!("elapsed={:.2}s touchdown_alt={:.2}m", report.elapsed_s, report.touchdown_alt_m);
    println!(
        "position=({:.3}, {:.3}) marker=({:.3}, {:.3}) heading={:.1}",
        st.x, st.y, cfg.sim.marker_x, cfg.sim.marker_y, st.heading_deg
    );
    if let Some(p) = report.final_pose {
        println!("final_pose x={:.3} y={:.3} yaw={:.1}", p.x, p.y, p.yaw_deg);
    }
    Ok(())
}

async fn goto(cfg: &Config, target: Waypoint) -> Result<()> {
    let sim = Simulator::spawn(cfg.sim.clone())?;
    let mut m = build(cfg, &sim);

    let res = m.navigate_to(target).await;
    finished(&m, &sim)?;
    let report = res.context("navigation maneuver")?;
    println!(
        "ARRIVED target=({:.2}, {:.2}) at=({:.2}, {:.2})",
        target.x, target.y, report.final_position.x, report.final_position.y
    );
    println!("elapsed={:.2}s iterations={} stale_skips={}", report.elapsed_s, report.iterations, report.stale_skips);
    Ok(())
}

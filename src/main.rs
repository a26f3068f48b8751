// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod config;
mod report;

use std::error::Error;

use clap::Parser;
use log::{info, warn};
use spacelink_core::{Dashboard, DashboardEvent, DashboardSnapshot, LinkState, Session};
use tokio::sync::broadcast::error::RecvError;

use config::AppConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Simulated satellite tracking and space company network console
#[derive(Parser, Debug)]
#[command(name = "spacelink", version, about)]
struct Args {
    /// Stop after this many telemetry ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Telemetry tick period in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Connect a company on startup (repeatable)
    #[arg(long = "connect", value_name = "COMPANY_ID")]
    connect: Vec<String>,

    /// Connect every company on startup
    #[arg(long)]
    connect_all: bool,

    /// Follow a satellite on startup
    #[arg(long, value_name = "SATELLITE_ID")]
    follow: Option<String>,

    /// Open a company's database view on startup
    #[arg(long, value_name = "COMPANY_ID")]
    view: Option<String>,

    /// Print each tick's full snapshot as JSON instead of a summary line
    #[arg(long)]
    json: bool,

    /// Ignore the config file and use defaults
    #[arg(long)]
    no_config: bool,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,

    /// Print the config file location and exit
    #[arg(long)]
    print_config_path: bool,
}

impl Args {
    /// Command-line values take precedence over the config file
    fn apply(&self, config: &mut AppConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(interval_ms) = self.interval_ms {
            config.tick_interval_ms = interval_ms;
        }
        for company_id in &self.connect {
            if !config.auto_connect.contains(company_id) {
                config.auto_connect.push(company_id.clone());
            }
        }
        if self.connect_all {
            config.connect_all_on_start = true;
        }
        if let Some(satellite_id) = &self.follow {
            config.follow = Some(satellite_id.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut config = if args.no_config {
        AppConfig::default()
    } else {
        AppConfig::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        })
    };
    args.apply(&mut config);

    if args.save_config {
        config.save()?;
        info!("Configuration saved to {}", AppConfig::get_config_path()?.display());
    }

    let dashboard = Dashboard::seeded(&config.session_config())?;
    info!(
        "Tracking {} satellites across {} companies",
        dashboard.satellites().len(),
        dashboard.companies().len()
    );

    let mut session = Session::spawn(dashboard);
    let mut events = session.subscribe();

    for company_id in &config.auto_connect {
        session.toggle_connect(company_id.clone());
    }
    if config.connect_all_on_start {
        session.connect_all();
    }
    if let Some(satellite_id) = &config.follow {
        session.toggle_follow(satellite_id.clone());
    }
    if let Some(company_id) = &args.view {
        session.select_company_for_view(company_id.clone());
    }

    info!("Session running, press Ctrl-C to stop");
    let result = run(&session, &mut events, args.ticks, args.json).await;

    session.shutdown();
    session.stopped().await;
    info!("Session stopped");

    result
}

async fn run(
    session: &Session,
    events: &mut tokio::sync::broadcast::Receiver<DashboardEvent>,
    max_ticks: Option<u64>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut snapshots = session.watch();
    let mut last_tick = 0;
    let mut last_viewed: Option<String> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                info!("Interrupted");
                return Ok(());
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("Session ended unexpectedly");
                    return Ok(());
                }
                let snapshot = snapshots.borrow_and_update().clone();

                let viewed = snapshot.viewed.as_ref().map(|c| c.id.clone());
                if viewed != last_viewed {
                    if let Some(company) = &snapshot.viewed {
                        let link = LinkState::of(&snapshot.connections, &company.id);
                        println!("{}", report::company_detail(company, link));
                    }
                    last_viewed = viewed;
                }

                if snapshot.tick != last_tick {
                    last_tick = snapshot.tick;
                    print_tick(&snapshot, json)?;
                    if max_ticks.is_some_and(|max| snapshot.tick >= max) {
                        return Ok(());
                    }
                }
            }

            event = events.recv() => match event {
                Ok(DashboardEvent::NotificationPosted(notification)) => {
                    info!("{}", report::notification_line(&notification));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    warn!("Console fell behind, missed {} dashboard events", missed);
                }
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}

fn print_tick(snapshot: &DashboardSnapshot, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!("{}", report::summary_line(snapshot));
    }
    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use wifimap_common::MetricConfig;
use wifimap_core::format_metric_value;

pub mod wifimap {
    tonic::include_proto!("wifimap");
}

mod config;
mod floorplan;
mod render;

use tonic::transport::Channel;
use wifimap::{
    samples_client::SamplesClient, survey_client::SurveyClient, AddSampleRequest, BandReport,
    CreateProjectRequest, Empty, Floorplan, HeatmapRequest, ProjectRequest, ScanRequest,
    SetFloorplanRequest,
};

/// Matches the daemon's limit so floor plans fit in one message
const MAX_MESSAGE_BYTES: usize = 32 * 1024 * 1024;

const WATCH_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "wifimap-cli")]
#[command(about = "Query the wifimap survey daemon and record samples")]
struct Args {
    /// Path to wifimap-cli.toml
    #[arg(long, short = 'c', default_value = "wifimap-cli.toml")]
    config: PathBuf,

    /// wifimap-surveyd gRPC address (overrides config file)
    #[arg(long, short = 'a')]
    address: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Current Wi-Fi association
    Meta {
        /// Print the RSSI twice a second until Ctrl+C
        #[arg(long, short = 'w')]
        watch: bool,
    },
    /// Neighbouring networks
    Scan {
        /// Ignore the daemon's scan cache
        #[arg(long)]
        force: bool,
    },
    /// Channel congestion and recommendations
    Channels {
        #[arg(long)]
        force: bool,
    },
    /// Metrics a heat map can show
    Metrics,
    Projects,
    NewProject {
        name: String,
    },
    /// List the samples of a project
    Samples {
        #[arg(long, short = 'p')]
        project: Option<String>,
    },
    /// Measure at floor plan position (x, y) and store the sample
    Sample {
        x: f64,
        y: f64,
        #[arg(long, short = 'p')]
        project: Option<String>,
    },
    /// Delete all samples of a project
    Reset {
        #[arg(long, short = 'p')]
        project: Option<String>,
    },
    /// Show, upload or remove a project's floor plan
    Floorplan {
        #[arg(long, short = 'p')]
        project: Option<String>,
        #[command(subcommand)]
        action: Option<FloorplanAction>,
    },
    /// Render a heat map as text
    Heatmap {
        #[arg(long, short = 'p')]
        project: Option<String>,
        #[arg(long, short = 'm')]
        metric: Option<String>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        /// Only samples taken on this band (2.4, 5, 6)
        #[arg(long)]
        band: Option<String>,
        /// Scale colours to the observed min/max
        #[arg(long)]
        auto_scale: bool,
        #[arg(long)]
        high_contrast: bool,
    },
}

#[derive(Subcommand, Debug)]
enum FloorplanAction {
    /// Upload an image. Sample positions are in its pixel coordinates.
    Set {
        file: PathBuf,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
    },
    /// Write the stored image to a file
    Save {
        output: Option<PathBuf>,
    },
    Clear,
}

async fn samples_client(address: String) -> Result<SamplesClient<Channel>, Box<dyn std::error::Error>> {
    Ok(SamplesClient::connect(address)
        .await?
        .max_decoding_message_size(MAX_MESSAGE_BYTES)
        .max_encoding_message_size(MAX_MESSAGE_BYTES))
}

async fn watch_rssi(client: &mut SurveyClient<Channel>) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(WATCH_INTERVAL);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            },
            _ = ticker.tick() => {
                let meta = client.get_meta(Empty {}).await?.into_inner();
                match meta.rssi_dbm {
                    Some(rssi) => println!("{:>4.0} dBm |{}", rssi, render::signal_bar(rssi)),
                    None => println!("   - dBm |"),
                }
            },
        }
    }

    Ok(())
}

fn dbm(value: Option<f64>) -> String {
    value.map(|v| format!("{} dBm", v)).unwrap_or_else(|| "-".to_string())
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn print_band(title: &str, report: &Option<BandReport>) {
    let Some(report) = report else {
        return;
    };

    println!("{}", title);
    if let Some(recommended) = &report.recommended {
        println!(
            "  Recommended: channel {} @ {} MHz",
            recommended.channel, recommended.width_mhz
        );
        println!("  {}", recommended.reason);
    }
    if report.scores.is_empty() {
        println!("  No networks seen");
    }
    for score in &report.scores {
        println!("  ch {:>3}  {:>6.2}", score.channel, score.score);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
        .ok();

    let args = Args::parse();
    let cfg = config::load_config(&args.config)?;
    let address = args.address.unwrap_or(cfg.address.clone());
    let project = |p: Option<String>| p.unwrap_or_else(|| cfg.survey.project.clone());

    log::debug!("Connecting to {}", address);

    match args.command {
        Command::Meta { watch } => {
            let mut client = SurveyClient::connect(address).await?;
            if watch {
                return watch_rssi(&mut client).await;
            }

            let meta = client.get_meta(Empty {}).await?.into_inner();

            println!("SSID:     {}", text(&meta.ssid));
            println!("BSSID:    {}", text(&meta.bssid));
            println!("Band:     {}", if meta.band.is_empty() { "-" } else { meta.band.as_str() });
            println!(
                "Channel:  {}",
                meta.channel.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
            );
            println!("RSSI:     {}", dbm(meta.rssi_dbm));
            println!("Noise:    {}", dbm(meta.noise_dbm));
            println!("Mode:     {}", meta.mode);
            println!("Platform: {}", meta.platform);
        }
        Command::Scan { force } => {
            let mut client = SurveyClient::connect(address).await?;
            let scan = client.scan(ScanRequest { force }).await?.into_inner();

            println!(
                "{} networks via {}{}",
                scan.networks.len(),
                scan.source,
                if scan.cache_hit { " (cached)" } else { "" }
            );
            println!("{:<32} {:<18} {:>4} {:>4} {:>9}", "SSID", "BSSID", "BAND", "CH", "RSSI");
            for network in &scan.networks {
                println!(
                    "{:<32} {:<18} {:>4} {:>4} {:>9}",
                    text(&network.ssid),
                    text(&network.bssid),
                    network.band,
                    network.channel.map(|c| c.to_string()).unwrap_or_default(),
                    dbm(network.rssi_dbm)
                );
            }
        }
        Command::Channels { force } => {
            let mut client = SurveyClient::connect(address).await?;
            let channels = client.get_channels(ScanRequest { force }).await?.into_inner();

            println!("Scan via {}{}\n", channels.source, if channels.cache_hit { " (cached)" } else { "" });
            print_band("2.4 GHz", &channels.band24);
            println!();
            print_band("5 GHz", &channels.band5);
        }
        Command::Metrics => {
            let mut client = samples_client(address).await?;
            let metrics = client.get_metrics(Empty {}).await?.into_inner();

            for metric in &metrics.metrics {
                println!(
                    "{:<16} {:<24} good {:>6} bad {:>6}",
                    metric.key, metric.label, metric.good, metric.bad
                );
            }
        }
        Command::Projects => {
            let mut client = samples_client(address).await?;
            let projects = client.list_projects(Empty {}).await?.into_inner();

            for p in &projects.projects {
                println!("{:<24} {:<32} {} samples", p.id, p.name, p.sample_count);
            }
        }
        Command::NewProject { name } => {
            let mut client = samples_client(address).await?;
            let created = client
                .create_project(CreateProjectRequest { name })
                .await?
                .into_inner();

            println!("Created project '{}' ({})", created.name, created.id);
        }
        Command::Samples { project: p } => {
            let mut client = samples_client(address).await?;
            let samples = client
                .list_samples(ProjectRequest { project: project(p) })
                .await?
                .into_inner();

            for sample in &samples.samples {
                let values: Vec<String> = sample
                    .metrics
                    .iter()
                    .map(|m| {
                        format!(
                            "{}={}",
                            m.key,
                            m.value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
                        )
                    })
                    .collect();
                println!(
                    "#{} ({:.1}, {:.1}) {} {}",
                    sample.id,
                    sample.x,
                    sample.y,
                    text(&sample.ssid),
                    values.join(" ")
                );
            }
        }
        Command::Sample { x, y, project: p } => {
            let mut client = samples_client(address).await?;
            let sample = client
                .add_sample(AddSampleRequest { project: project(p), x, y })
                .await?
                .into_inner();

            println!("Sample #{} at ({:.1}, {:.1})", sample.id, sample.x, sample.y);
            for m in &sample.metrics {
                println!(
                    "  {:<16} {}",
                    m.key,
                    m.value.map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string())
                );
            }
        }
        Command::Reset { project: p } => {
            let mut client = samples_client(address).await?;
            client
                .reset_samples(ProjectRequest { project: project(p) })
                .await?;

            println!("Samples cleared.");
        }
        Command::Floorplan { project: p, action } => {
            let mut client = samples_client(address).await?;
            let project = project(p);

            match action {
                None => {
                    let response = client
                        .get_floorplan(ProjectRequest { project })
                        .await?
                        .into_inner();
                    match response.floorplan {
                        Some(plan) => println!(
                            "{} x {} ({}, {} bytes)",
                            plan.width,
                            plan.height,
                            plan.content_type,
                            plan.image.len()
                        ),
                        None => println!("No floor plan."),
                    }
                }
                Some(FloorplanAction::Set { file, width, height }) => {
                    let image = tokio::fs::read(&file).await?;
                    client
                        .set_floorplan(SetFloorplanRequest {
                            project,
                            floorplan: Some(Floorplan {
                                image,
                                content_type: floorplan::content_type(&file).to_string(),
                                width,
                                height,
                            }),
                        })
                        .await?;

                    println!("Floor plan set to {} ({} x {}).", file.display(), width, height);
                }
                Some(FloorplanAction::Save { output }) => {
                    let response = client
                        .get_floorplan(ProjectRequest { project })
                        .await?
                        .into_inner();
                    let Some(plan) = response.floorplan else {
                        println!("No floor plan.");
                        return Ok(());
                    };

                    let output = output.unwrap_or_else(|| {
                        PathBuf::from(format!("floorplan.{}", floorplan::extension(&plan.content_type)))
                    });
                    tokio::fs::write(&output, &plan.image).await?;

                    println!("Saved {}.", output.display());
                }
                Some(FloorplanAction::Clear) => {
                    client
                        .set_floorplan(SetFloorplanRequest {
                            project,
                            floorplan: None,
                        })
                        .await?;

                    println!("Floor plan removed.");
                }
            }
        }
        Command::Heatmap {
            project: p,
            metric,
            width,
            height,
            band,
            auto_scale,
            high_contrast,
        } => {
            let mut client = samples_client(address).await?;
            let heatmap = client
                .get_heatmap(HeatmapRequest {
                    project: project(p),
                    metric: metric.unwrap_or_else(|| cfg.survey.metric.clone()),
                    width: width.or(cfg.survey.width),
                    height: height.or(cfg.survey.height),
                    band: band.unwrap_or_default(),
                    auto_scale,
                    high_contrast,
                })
                .await?
                .into_inner();

            let cells: Vec<render::Cell> = heatmap
                .cells
                .iter()
                .map(|c| render::Cell {
                    x: c.x,
                    y: c.y,
                    intensity: c.intensity,
                })
                .collect();

            if cells.is_empty() {
                println!("No samples to draw.");
                return Ok(());
            }

            for row in render::render_cells(&cells, heatmap.step) {
                println!("|{}", row);
            }

            if let Some(metric) = heatmap.metric {
                let config = MetricConfig::new(&metric.key, &metric.label, metric.good, metric.bad);
                let (low, high) = match (heatmap.range_min, heatmap.range_max) {
                    (Some(min), Some(max)) => (min, max),
                    _ => (metric.bad, metric.good),
                };
                println!(
                    "\n{}: '{}' {}  ..  '{}' {}",
                    metric.label,
                    render::PALETTE[1] as char,
                    format_metric_value(Some(low), &config),
                    render::PALETTE[render::PALETTE.len() - 1] as char,
                    format_metric_value(Some(high), &config)
                );
            }
        }
    }

    Ok(())
}

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use compute::analysis::{RegionalAnalysis, Statistics};
use foundation::geo::SurfaceSize;
use foundation::time::Year;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::{Viewer, ViewerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Temperature anomaly map renderer")]
struct Args {
    /// JSON viewer config; unspecified fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overlay density multiplier (overrides the config)
    #[arg(long, global = true)]
    resolution_factor: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one composed frame to a PNG
    Render {
        /// Anomaly dataset JSON ({ "tempanomalies": [...] })
        #[arg(long)]
        dataset: PathBuf,

        #[arg(long)]
        year: Year,

        /// Background map image
        #[arg(long)]
        base: Option<PathBuf>,

        #[arg(long, default_value_t = 1440)]
        width: u32,

        #[arg(long, default_value_t = 720)]
        height: u32,

        #[arg(long)]
        out: PathBuf,
    },

    /// Simulate playback and write one PNG per displayed year
    Animate {
        #[arg(long)]
        dataset: PathBuf,

        #[arg(long)]
        from: Year,

        /// Stop after this year (default: play to the end)
        #[arg(long)]
        to: Option<Year>,

        /// Speed multiplier: 1, 2, 5 or 10
        #[arg(long)]
        speed: Option<u32>,

        #[arg(long)]
        base: Option<PathBuf>,

        #[arg(long, default_value_t = 720)]
        width: u32,

        #[arg(long, default_value_t = 360)]
        height: u32,

        /// Output directory for frame_<year>.png
        #[arg(long, default_value = "frames")]
        out_dir: PathBuf,
    },

    /// Print mean anomalies of latitude rows for a year
    Stats {
        #[arg(long)]
        dataset: PathBuf,

        #[arg(long)]
        year: Year,

        /// Latitude to summarize; repeatable
        #[arg(long = "lat", required = true, allow_negative_numbers = true)]
        lats: Vec<f64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(r) = args.resolution_factor {
        config.resolution_factor = r;
    }

    match args.command {
        Command::Render {
            dataset,
            year,
            base,
            width,
            height,
            out,
        } => {
            config.validate()?;
            let mut viewer = open_viewer(config, &dataset, base.as_deref(), width, height)?;
            let applied = viewer.jump_to_year(year);
            if applied.corrected {
                eprintln!("year {year} out of range, using {}", applied.value);
            }
            viewer.frame().save(&out)?;
            info!(year = applied.value, out = %out.display(), "frame written");
            Ok(())
        }
        Command::Animate {
            dataset,
            from,
            to,
            speed,
            base,
            width,
            height,
            out_dir,
        } => {
            if let Some(speed) = speed {
                config.speed = speed;
            }
            let start = config.set_start_year(from);
            if start.corrected {
                eprintln!("year {from} out of range, using {}", start.value);
            }
            config.validate()?;
            fs::create_dir_all(&out_dir)?;

            let mut viewer = open_viewer(config, &dataset, base.as_deref(), width, height)?;
            let frames = viewer.play_through(to, |year, frame| {
                let path = out_dir.join(format!("frame_{year}.png"));
                frame.save(&path)?;
                info!(year, path = %path.display(), "frame written");
                Ok::<(), Box<dyn Error>>(())
            })?;
            viewer.dispose();
            info!(frames, out_dir = %out_dir.display(), "animation written");
            Ok(())
        }
        Command::Stats {
            dataset,
            year,
            lats,
        } => {
            let dataset = formats::load_dataset(&dataset)?;
            println!("lat\tyear\tmean\tmin\tmax\tcells");
            for lat in lats {
                let cells = RegionalAnalysis::latitude_cells(&dataset, lat);
                let values: Vec<f64> = cells.iter().filter_map(|c| c.value(year)).collect();
                match (Statistics::mean(&values), Statistics::min_max(&values)) {
                    (Some(mean), Some((min, max))) => println!(
                        "{lat}\t{year}\t{mean:.3}\t{min:.3}\t{max:.3}\t{}/{}",
                        values.len(),
                        cells.len()
                    ),
                    _ => println!("{lat}\t{year}\tNA\tNA\tNA\t0/{}", cells.len()),
                }
            }
            Ok(())
        }
    }
}

fn open_viewer(
    config: ViewerConfig,
    dataset: &Path,
    base: Option<&Path>,
    width: u32,
    height: u32,
) -> Result<Viewer, Box<dyn Error>> {
    let dataset = formats::load_dataset(dataset)?;
    let mut viewer = Viewer::new(config, dataset);
    if let Some(path) = base {
        let image = image::open(path)?.to_rgba8();
        viewer.set_base_image(path.display().to_string(), image);
    }
    viewer.resize(SurfaceSize::new(width, height));
    Ok(viewer)
}

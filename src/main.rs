use clap::{Parser, Subcommand};
use enhance_image::config::{self, Settings, UPSCALE_OPTIONS};
use enhance_image::imaging::ProcessingOptions;
use enhance_image::source::ImageRef;
use enhance_image::{output, process};
use std::path::PathBuf;

/// Per-run overrides of the configured defaults.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Image to process: a path, file:// or http(s):// URL, or data:image/...;base64 URI
    image: String,

    /// Megapixel budget (one of 6, 8, 12, 24, 32, 64, 108)
    #[arg(short, long, value_parser = parse_megapixels)]
    megapixels: Option<u32>,

    /// Apply the subtle saturation/contrast boost even if the config turns it off
    #[arg(long, conflicts_with = "no_enhance")]
    enhance: bool,

    /// Skip the subtle saturation/contrast boost
    #[arg(long)]
    no_enhance: bool,

    /// Apply the stronger preset (overrides --no-enhance)
    #[arg(long)]
    detailed: bool,

    /// Do not request 300 DPI (informational only; no metadata is written either way)
    #[arg(long)]
    no_dpi: bool,
}

impl RunArgs {
    fn options(&self, settings: &Settings) -> ProcessingOptions {
        let defaults = settings.default_options();
        ProcessingOptions {
            target_megapixels: self.megapixels.unwrap_or(defaults.target_megapixels),
            enhance: (defaults.enhance || self.enhance) && !self.no_enhance,
            detailed_enhance: defaults.detailed_enhance || self.detailed,
            set_dpi_300: defaults.set_dpi_300 && !self.no_dpi,
        }
    }
}

fn parse_megapixels(value: &str) -> Result<u32, String> {
    let mp: u32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    if config::is_upscale_option(mp) {
        Ok(mp)
    } else {
        Err(format!("must be one of {:?}", UPSCALE_OPTIONS))
    }
}

#[derive(Parser)]
#[command(name = "enhance-image")]
#[command(about = "Enhance and upscale generated images for download")]
#[command(long_about = "\
Enhance and upscale generated images for download

Takes an image (typically a data URI returned by an image generator), applies
an optional colour preset at native resolution, upscales it to a megapixel
budget with Lanczos3 resampling, and writes a high-quality JPEG named
enhanced-image-<N>MP.jpeg.

Presets:
  default      saturate(1.1) contrast(1.1)
  --detailed   saturate(1.2) contrast(1.25) brightness(1.05)
  --no-enhance none
  --enhance    turn the default preset back on when the config disables it

Images already at or above the budget keep their size; nothing is downscaled.

Run 'enhance-image gen-config' to generate a documented enhance-image.toml.")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ./enhance-image.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enhance, upscale and save an image
    Upscale {
        #[command(flatten)]
        run: RunArgs,

        /// Output directory (overrides output.directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the output size, preset and filename without rendering
    Plan {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print a stock enhance-image.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Upscale { run, output: out_dir } => {
            let settings = config::load_settings(cli.config.as_deref())?;
            let image_ref = ImageRef::parse(&run.image)?;
            let options = run.options(&settings);
            let image = process::process(&image_ref, &options, &settings)?;
            let dir = out_dir.unwrap_or_else(|| settings.output.directory.clone());
            let path = image.save_in(&dir)?;
            if cli.json {
                let summary = serde_json::json!({
                    "path": path,
                    "width": image.dimensions.width,
                    "height": image.dimensions.height,
                    "filter": image.filter,
                    "bytes": image.bytes.len(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                output::print_saved(&image, &path);
            }
        }
        Command::Plan { run } => {
            let settings = config::load_settings(cli.config.as_deref())?;
            let image_ref = ImageRef::parse(&run.image)?;
            let plan = process::plan_only(&image_ref, &run.options(&settings), &settings)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&image_ref, &plan);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

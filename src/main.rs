use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use f3kdb::models::{ClipFormat, DebandConfig};
use f3kdb::services::DebandPipeline;
use f3kdb_core::{detect, Params, PixelMode};

#[derive(Parser)]
#[command(name = "f3kdb")]
#[command(about = "flash3kyuu deband - remove banding from raw planar YUV clips")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// 8-bit samples
    Low,
    /// MSB plane followed by LSB plane
    Stacked,
    /// Little-endian 16-bit samples
    Interleaved,
}

impl From<Layout> for PixelMode {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Low => PixelMode::LowBitDepth,
            Layout::Stacked => PixelMode::HighBitDepthStacked,
            Layout::Interleaved => PixelMode::HighBitDepthInterleaved,
        }
    }
}

impl Layout {
    /// Integer value used by the `output_mode` setting.
    fn config_value(self) -> i32 {
        match self {
            Layout::Low => 0,
            Layout::Stacked => 1,
            Layout::Interleaved => 2,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Deband a raw planar clip
    Process {
        /// Input clip (packed Y, Cb, Cr planes per frame)
        #[arg(short, long)]
        input: PathBuf,

        /// Output clip
        #[arg(short, long)]
        output: PathBuf,

        /// Frame width in pixels
        #[arg(long)]
        width: usize,

        /// Frame height in pixels
        #[arg(long)]
        height: usize,

        /// Chroma width subsampling shift
        #[arg(long, default_value_t = 1)]
        subsampling_w: u8,

        /// Chroma height subsampling shift
        #[arg(long, default_value_t = 1)]
        subsampling_h: u8,

        /// Input sample layout
        #[arg(long, value_enum, default_value = "low")]
        layout: Layout,

        /// Input bit depth (defaults to 8 for low, 16 otherwise)
        #[arg(long)]
        depth: Option<u8>,

        /// Number of frames (derived from the file size when omitted)
        #[arg(long)]
        frames: Option<usize>,

        /// YAML file with deband settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Reference range
        #[arg(long)]
        range: Option<u16>,

        /// Luma threshold
        #[arg(long)]
        y: Option<u16>,

        /// Cb threshold
        #[arg(long)]
        cb: Option<u16>,

        /// Cr threshold
        #[arg(long)]
        cr: Option<u16>,

        /// Luma grain
        #[arg(long)]
        grain_y: Option<u16>,

        /// Chroma grain
        #[arg(long)]
        grain_c: Option<u16>,

        /// Random seed
        #[arg(long)]
        seed: Option<u32>,

        /// Dither algorithm (1 none, 2 ordered, 3 Floyd-Steinberg)
        #[arg(long)]
        dither_algo: Option<i32>,

        /// Output layout
        #[arg(long, value_enum)]
        output_layout: Option<Layout>,

        /// Output bit depth
        #[arg(long)]
        output_depth: Option<u8>,

        /// Process chroma on a second thread
        #[arg(long)]
        mt: bool,
    },
    /// Show the detected CPU tier and default settings
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "f3kdb=info,f3kdb_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Some(Commands::Process {
            input,
            output,
            width,
            height,
            subsampling_w,
            subsampling_h,
            layout,
            depth,
            frames,
            config,
            range,
            y,
            cb,
            cr,
            grain_y,
            grain_c,
            seed,
            dither_algo,
            output_layout,
            output_depth,
            mt,
        }) => {
            let file_config = match &config {
                Some(path) => DebandConfig::load(path)?,
                None => DebandConfig::default(),
            };
            let overrides = DebandConfig {
                range,
                y,
                cb,
                cr,
                grain_y,
                grain_c,
                seed,
                dither_algo,
                output_mode: output_layout.map(Layout::config_value),
                output_depth,
                mt: mt.then_some(true),
                ..Default::default()
            };
            let settings = file_config.overlay(&overrides);
            let params = settings.to_params()?;

            let layout = PixelMode::from(layout);
            let format = ClipFormat::new(width, height, frames.unwrap_or(0))
                .subsampling(subsampling_w, subsampling_h)
                .format(layout, depth.unwrap_or_else(|| layout.default_depth()));

            let stats = DebandPipeline::process_file(
                format,
                &params,
                settings.mt.unwrap_or(false),
                &input,
                &output,
            )?;
            println!(
                "Debanded {} frames in {:.2}s",
                stats.frames,
                stats.elapsed.as_secs_f64()
            );
            Ok(())
        }
        Some(Commands::Info) | None => {
            run_info_command();
            Ok(())
        }
    }
}

fn run_info_command() {
    let defaults = Params::default();
    println!("f3kdb v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Detected CPU tier: {}", detect());
    println!();
    println!("Defaults:");
    println!("  range:         {}", defaults.range);
    println!("  Y/Cb/Cr:       {}/{}/{}", defaults.y, defaults.cb, defaults.cr);
    println!("  grainY/grainC: {}/{}", defaults.grain_y, defaults.grain_c);
    println!("  sample_mode:   {}", defaults.sample_mode);
    println!("  blur_first:    {}", defaults.blur_first);
    println!("  dither_algo:   {:?}", defaults.dither_algo);
    println!();
    println!("Run 'f3kdb process --help' for clip options.");
}

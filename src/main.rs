use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tilescrape::{FilterType, HttpFetcher, ScrapeConfig, TileSize};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape image search results into grayscale tiles")]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download search results as fixed-size grayscale tiles
    Download(DownloadArgs),

    /// Rebuild a target image out of a tile folder
    #[cfg(feature = "mosaic")]
    Mosaic(MosaicArgs),
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Search query
    #[arg(short, long, default_value = "black and white texture")]
    query: String,

    /// Output folder for tile_<n>.jpg files
    #[arg(short, long, default_value = "tiles")]
    output: PathBuf,

    /// Maximum number of tiles to write
    #[arg(short = 'n', long, default_value_t = 200)]
    max_images: usize,

    /// Tile width in pixels
    #[arg(long, default_value_t = 50)]
    width: u32,

    /// Tile height in pixels
    #[arg(long, default_value_t = 50)]
    height: u32,

    /// Number of result pages to scan
    #[arg(short, long, default_value_t = 10)]
    pages: usize,

    /// Scheme and host of the image search endpoint
    #[arg(long, default_value = "https://www.bing.com")]
    search_base: String,

    /// User-Agent for result page requests
    #[arg(long, default_value = "Mozilla/5.0")]
    user_agent: String,

    /// Result page timeout in seconds (0 waits forever)
    #[arg(long, default_value_t = 30)]
    page_timeout: u64,

    /// Per-image timeout in seconds
    #[arg(long, default_value_t = 10)]
    image_timeout: u64,

    /// JPEG quality of the written tiles
    #[arg(long, default_value_t = 75)]
    quality: u8,

    /// Resampling filter for the resize step
    #[arg(long, value_enum, default_value_t = Filter::Bicubic)]
    filter: Filter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Filter {
    Nearest,
    Bilinear,
    Bicubic,
    Gaussian,
    Lanczos,
}

impl From<Filter> for FilterType {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Nearest => FilterType::Nearest,
            Filter::Bilinear => FilterType::Triangle,
            Filter::Bicubic => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos => FilterType::Lanczos3,
        }
    }
}

impl DownloadArgs {
    fn into_config(self) -> ScrapeConfig {
        ScrapeConfig {
            query: self.query,
            output_dir: self.output,
            max_images: self.max_images,
            tile_size: TileSize {
                width: self.width,
                height: self.height,
            },
            pages: self.pages,
            search_base: self.search_base,
            user_agent: self.user_agent,
            page_timeout: (self.page_timeout > 0).then(|| Duration::from_secs(self.page_timeout)),
            image_timeout: Duration::from_secs(self.image_timeout),
            jpeg_quality: self.quality,
            filter: self.filter.into(),
        }
    }
}

#[cfg(feature = "mosaic")]
#[derive(Args, Debug)]
struct MosaicArgs {
    /// Image to rebuild
    target: PathBuf,

    /// Folder holding .jpg/.png tiles
    tiles: PathBuf,

    /// Where to write the mosaic (format follows the extension)
    #[arg(short, long, default_value = "mosaic.jpg")]
    output: PathBuf,

    /// Side of a pasted tile in pixels
    #[arg(long, default_value_t = 50)]
    tile_size: u32,

    /// Matching thumbnails are tile_size / match_res pixels wide
    #[arg(long, default_value_t = 5)]
    match_res: u32,

    /// Scale factor applied to the target before tiling
    #[arg(long, default_value_t = 8)]
    enlargement: u32,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn init_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{style}{}{style:#} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn download(args: DownloadArgs) -> Result<()> {
    let config = args.into_config();
    config.validate().context("invalid download options")?;

    let fetcher = HttpFetcher::new(&config).context("failed to set up HTTP client")?;
    tilescrape::run(&fetcher, &config)
        .with_context(|| format!("failed to scrape into {}", config.output_dir.display()))?;
    Ok(())
}

#[cfg(feature = "mosaic")]
fn mosaic(args: MosaicArgs) -> Result<()> {
    use tilescrape::mosaic::MosaicConfig;

    let defaults = MosaicConfig::default();
    let config = MosaicConfig {
        tile_size: args.tile_size,
        match_res: args.match_res,
        enlargement: args.enlargement,
        jobs: args.jobs.unwrap_or(defaults.jobs),
    };

    let report = tilescrape::mosaic::run(&args.target, &args.tiles, &args.output, &config)
        .context("failed to build mosaic")?;
    println!("Target Image Size: {} x {}", report.target_size.0, report.target_size.1);
    println!("Mosaic image saved as {}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Download(args) => download(args),
        #[cfg(feature = "mosaic")]
        Command::Mosaic(args) => mosaic(args),
    }
}

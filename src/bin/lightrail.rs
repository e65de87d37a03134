use std::{
    io::{BufRead as _, Write as _},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Light-trail compositing: every pixel keeps the brightest value seen over the capture.
#[derive(Parser, Debug)]
#[command(name = "lightrail", version)]
struct Cli {
    /// Camera id (ignored when compositing stored frames).
    #[arg(short = 'c', long, default_value_t = 0)]
    camera_id: u32,

    /// Explicit ffmpeg capture device, overriding the one derived from the camera id.
    #[arg(long)]
    device: Option<String>,

    /// ffmpeg input format (defaults to the platform capture API).
    #[arg(long)]
    input_format: Option<String>,

    /// Weight of every folded frame, in (0, 1].
    #[arg(long, default_value_t = lightrail::Opacity::DEFAULT.get())]
    opacity: f64,

    /// Also store the captured frames under the images root.
    #[arg(long)]
    save: bool,

    /// Capture duration in seconds.
    #[arg(short = 's', long, default_value_t = 10.0)]
    seconds: f64,

    /// Capture size as WxH.
    #[arg(long, default_value = "640x480")]
    size: String,

    /// Capture frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Frames discarded while the camera settles.
    #[arg(long, default_value_t = 50)]
    warmup_frames: usize,

    /// Longest wait for one camera frame before giving up.
    #[arg(long, default_value_t = 5)]
    read_timeout_secs: u64,

    /// Composite stored frames instead of capturing. Without a value, pick a set under
    /// `--images-root`.
    #[arg(long, num_args = 0..=1)]
    input_dir: Option<Option<PathBuf>>,

    /// Folder holding saved capture sets.
    #[arg(long, default_value = "images")]
    images_root: PathBuf,

    /// Capture set to composite, by 1-based index or folder name.
    #[arg(long)]
    set: Option<String>,

    /// Output image (png, tiff, webp, tga or qoi).
    #[arg(short = 'o', long, default_value = "output.png")]
    output: PathBuf,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    initialise_tracing(cli.verbose);

    // Installed after the set prompt so Ctrl-C there keeps its default effect.
    let cfg = build_config(&cli)?;
    let cancel = lightrail::CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || cancel.cancel()).context("install Ctrl-C handler")?;
    }

    match lightrail::run(&cfg, &cancel) {
        Ok(report) => {
            if let Some(dir) = &report.raw_dir {
                eprintln!("saved {} frames to {}", report.frames, dir.display());
            }
            eprintln!("wrote {}", report.output.display());
            Ok(())
        }
        Err(err) if err.is_cancelled() => {
            eprintln!("interrupted");
            std::process::exit(130);
        }
        Err(err) => Err(err.into()),
    }
}

fn initialise_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<lightrail::RunConfig> {
    let input = match (&cli.input_dir, &cli.set) {
        (Some(Some(dir)), _) => lightrail::InputSpec::Directory(dir.clone()),
        (Some(None), _) | (None, Some(_)) => {
            lightrail::InputSpec::Directory(choose_capture_set(&cli.images_root, cli.set.as_deref())?)
        }
        (None, None) => lightrail::InputSpec::Camera(camera_opts(cli)?),
    };

    let mut cfg = lightrail::RunConfig::new(input, &cli.output);
    cfg.opacity = lightrail::Opacity::new(cli.opacity)?;
    cfg.seconds = cli.seconds;
    if cli.save {
        cfg.save_raw_to = Some(cli.images_root.clone());
    }
    cfg.validate()?;
    Ok(cfg)
}

fn camera_opts(cli: &Cli) -> anyhow::Result<lightrail::CameraOpts> {
    let (width, height) = lightrail::parse_size(&cli.size)?;
    let mut opts = lightrail::CameraOpts::new(cli.camera_id);
    opts.device = cli.device.clone();
    if let Some(format) = &cli.input_format {
        opts.input_format = format.clone();
    }
    opts.width = width;
    opts.height = height;
    opts.fps = lightrail::Fps::new(cli.fps, 1)?;
    opts.warmup_frames = cli.warmup_frames;
    opts.read_timeout = Duration::from_secs(cli.read_timeout_secs);
    Ok(opts)
}

fn choose_capture_set(root: &Path, choice: Option<&str>) -> anyhow::Result<PathBuf> {
    let sets = lightrail::list_capture_sets(root)?;
    if let Some(choice) = choice {
        return Ok(lightrail::resolve_capture_set(&sets, choice)?);
    }

    eprintln!("capture sets in {}:", root.display());
    for (i, set) in sets.iter().enumerate() {
        let name = set.file_name().unwrap_or(set.as_os_str());
        eprintln!("  {:>3}  {}", i + 1, name.to_string_lossy());
    }

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        eprint!("choose a set [1-{}]: ", sets.len());
        std::io::stderr().flush().context("flush prompt")?;

        line.clear();
        let n = stdin.lock().read_line(&mut line).context("read choice")?;
        if n == 0 {
            anyhow::bail!("no capture set chosen");
        }
        match lightrail::resolve_capture_set(&sets, &line) {
            Ok(dir) => return Ok(dir),
            Err(err) => eprintln!("{err}"),
        }
    }
}

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use aura_renderer::{
    AvatarRenderer, ColorPicker, RenderSettings, RendererOptions, WHEEL_SIZE, export_file_name,
    surprise_from,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aura-renderer", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render settings to a PNG.
    Render(RenderArgs),
    /// Print (and optionally render) randomized settings.
    Surprise(SurpriseArgs),
    /// Sample the hue wheel at a point.
    Pick(PickArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Settings JSON. Defaults are used for missing fields.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Override the settings text.
    #[arg(long)]
    text: Option<String>,

    /// Output PNG path. Defaults to `aura-art-<millis>.png`.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    renderer: RendererArgs,
}

#[derive(Parser, Debug)]
struct SurpriseArgs {
    /// Seed for the generator. Defaults to the current time.
    #[arg(long)]
    seed: Option<u64>,

    /// Settings JSON whose non-randomized fields are kept.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Also render the result to this PNG.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    renderer: RendererArgs,
}

#[derive(Parser, Debug)]
struct PickArgs {
    #[arg(long, allow_hyphen_values = true)]
    x: f32,

    #[arg(long, allow_hyphen_values = true)]
    y: f32,

    /// Lightness percentage, 0-100.
    #[arg(long, default_value_t = 100.0)]
    lightness: f32,

    /// Wheel side length in pixels.
    #[arg(long, default_value_t = WHEEL_SIZE)]
    size: u32,

    /// Write the wheel image to this PNG.
    #[arg(long)]
    wheel_out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RendererArgs {
    /// Renderer options JSON.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Skip loading system fonts.
    #[arg(long, default_value_t = false)]
    no_system_fonts: bool,
}

impl RendererArgs {
    fn build(&self) -> anyhow::Result<AvatarRenderer> {
        let mut options = match &self.options {
            Some(path) => RendererOptions::from_file(path)
                .with_context(|| format!("read renderer options '{}'", path.display()))?,
            None => RendererOptions::default(),
        };
        options.font_dirs.extend(self.font_dirs.iter().cloned());
        if self.no_system_fonts {
            options.load_system_fonts = false;
        }

        let renderer = AvatarRenderer::new(options);
        tracing::debug!(faces = renderer.fonts().len(), "renderer ready");
        Ok(renderer)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Surprise(args) => cmd_surprise(args),
        Command::Pick(args) => cmd_pick(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.in_path.as_deref())?;
    if let Some(text) = args.text {
        settings.text = text;
    }

    let renderer = args.renderer.build()?;
    let out = args.out.unwrap_or_else(default_out_path);
    write_png(&renderer, &settings, &out)
}

fn cmd_surprise(args: SurpriseArgs) -> anyhow::Result<()> {
    let base = load_settings(args.in_path.as_deref())?;
    let seed = args.seed.unwrap_or_else(|| now_millis() as u64);
    let settings = surprise_from(&base, seed);

    println!("{}", settings.to_json_pretty().context("serialize settings")?);

    if let Some(out) = args.out {
        let renderer = args.renderer.build()?;
        write_png(&renderer, &settings, &out)?;
    }
    Ok(())
}

fn cmd_pick(args: PickArgs) -> anyhow::Result<()> {
    let mut picker = ColorPicker::new(args.size).context("wheel size must be non-zero")?;
    picker.pointer(args.x, args.y);
    let color = picker.set_lightness(args.lightness);

    if let Some(path) = &args.wheel_out {
        picker
            .wheel()
            .to_rgba_image()
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    println!("{color}");
    Ok(())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<RenderSettings> {
    match path {
        Some(path) => RenderSettings::from_file(path)
            .with_context(|| format!("read settings '{}'", path.display())),
        None => Ok(RenderSettings::default()),
    }
}

fn write_png(
    renderer: &AvatarRenderer,
    settings: &RenderSettings,
    out: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    renderer
        .render(settings)
        .save_png(out)
        .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn default_out_path() -> PathBuf {
    PathBuf::from(export_file_name(now_millis()))
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

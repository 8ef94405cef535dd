//! Entry point for the car configurator.

use std::path::PathBuf;

use anyhow::Result;
use platform::LaunchOptions;

fn parse_backend(val: &str) -> wgpu::Backends {
    // auto|vulkan|dx12|metal|gl
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

fn parse_size(val: &str) -> Option<(u32, u32)> {
    let (w, h) = val.split_once('x').or_else(|| val.split_once('X'))?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> LaunchOptions {
    let mut opts = LaunchOptions::default();
    for arg in args {
        if let Some(v) = arg.strip_prefix("--gpu-backend=") {
            opts.backends = parse_backend(v);
        } else if let Some(v) = arg.strip_prefix("--size=") {
            match parse_size(v) {
                Some((w, h)) => (opts.width, opts.height) = (w, h),
                None => log::warn!("Ignoring malformed --size={}", v),
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(w) = v.parse() {
                opts.width = w;
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(h) = v.parse() {
                opts.height = h;
            }
        } else if let Some(v) = arg.strip_prefix("--assets=") {
            opts.assets_dir = PathBuf::from(v);
        } else if let Some(v) = arg.strip_prefix("--wheel=") {
            opts.wheel = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--color=") {
            opts.color = Some(v.to_string());
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }
    opts.width = opts.width.max(1);
    opts.height = opts.height.max(1);
    opts
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = parse_args(std::env::args().skip(1));
    log::info!(
        "Starting car configurator. Backend: {:?}, window_size={}x{}, assets={}",
        opts.backends,
        opts.width,
        opts.height,
        opts.assets_dir.display()
    );

    platform::run(opts)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

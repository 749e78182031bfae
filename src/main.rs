//! rt-batch: render one frame of the Cornell box in the terminal.
//!
//! The frame size defaults to the terminal size (doubled vertically for
//! half-block cells); press q or Escape to quit.

use clap::{Parser, ValueEnum};

use rt_batch::isect::{open_device, DeviceKind};
use rt_batch::terminal::{frame_to_halfblock, TerminalDisplay};
use rt_batch::{Camera, Renderer, Scene};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceArg {
    Cpu,
    Gpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Cpu => DeviceKind::Cpu,
            DeviceArg::Gpu => DeviceKind::Gpu,
        }
    }
}

#[derive(Parser)]
#[command(name = "rt-batch")]
#[command(about = "Single-frame Cornell box renderer over a batch intersection device")]
struct Args {
    /// Frame width in pixels (default: terminal columns)
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels (default: 2x terminal rows)
    #[arg(long)]
    height: Option<u32>,

    /// Intersection device to open
    #[arg(long, value_enum, default_value = "cpu")]
    device: DeviceArg,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Size the frame before touching terminal modes; two pixels per cell row.
    let (cols, rows) = crossterm::terminal::size().unwrap_or((120, 40));
    let width = args.width.unwrap_or(cols as u32).max(16);
    let height = args
        .height
        .unwrap_or((rows.saturating_sub(2) as u32) * 2)
        .max(16);
    log::info!("rendering {}x{} on the {} device", width, height, DeviceKind::from(args.device));

    let device = open_device(args.device.into())?;
    let scene = Scene::cornell_box();
    let mut renderer = Renderer::new(device, scene, Camera::default(), width, height)?;
    let frame = renderer.render_frame()?;

    let content = frame_to_halfblock(&frame);
    let mut terminal = TerminalDisplay::new()?;
    terminal.present(&content, "q/Esc to quit")?;
    terminal.wait_for_quit()?;
    Ok(())
}

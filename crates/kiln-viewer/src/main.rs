//! Kiln Viewer - Interactive OBJ model viewer binary
//!
//! Usage:
//!   kiln-viewer <model.obj> [--ui <layout.json>] [--font <font.json>] [--fullscreen]

use anyhow::{Context, Result};
use clap::Parser;
use kiln_import::import_obj;
use kiln_ui::{load_font, load_layout, BitmapFont};
use kiln_viewer::ViewerApp;
use std::path::Path;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "kiln-viewer")]
#[command(about = "Kiln model viewer - render OBJ/MTL models with a UI overlay")]
struct Args {
    /// Path to the OBJ model file
    model: String,

    /// Path to a JSON UI layout
    #[arg(long)]
    ui: Option<String>,

    /// Path to a JSON bitmap font config
    #[arg(long)]
    font: Option<String>,

    /// Launch in fullscreen mode
    #[arg(long)]
    fullscreen: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let import = import_obj(&args.model).context("Failed to import model")?;

    let model_name = Path::new(&args.model)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.model.clone());

    for warning in &import.geometry.warnings {
        println!("Warning: {warning}");
    }
    println!(
        "Loaded model: {} ({} vertices, {} triangles, {} material groups)",
        model_name,
        import.geometry.vertex_count(),
        import.geometry.triangle_count(),
        import.geometry.groups.len()
    );

    let ui_components = match &args.ui {
        Some(path) => load_layout(path).context("Failed to load UI layout")?,
        None => Vec::new(),
    };

    let font = match &args.font {
        Some(path) => load_font(path).context("Failed to load font config")?,
        None => BitmapFont::default(),
    };

    println!();
    println!("Controls:");
    println!("  Click    - Capture cursor");
    println!("  WASD     - Move");
    println!("  Mouse    - Look");
    println!("  Space    - Rise");
    println!("  Shift    - Descend");
    println!("  Arrows   - Spin model");
    println!("  Escape   - Release cursor / Exit");
    println!("  F11      - Toggle fullscreen");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(import, model_name, ui_components, font, args.fullscreen);
    event_loop.run_app(&mut app)?;

    Ok(())
}

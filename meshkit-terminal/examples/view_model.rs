/// Example: Load a model file and render it in the terminal on one thread
///
/// Usage: cargo run --example view_model -- path/to/model.obj
use meshkit_core::{load_model, CurrentThread, ObjOptions};
use meshkit_terminal::TerminalApp;
use std::env;
use std::io;
use std::path::Path;

fn main() -> io::Result<()> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: view_model <model-file>");
        return Ok(());
    };

    println!("Loading model: {}", path);
    let model = load_model(Path::new(&path), &ObjOptions::default(), &CurrentThread)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Failed to load model: {}", e)))?;

    println!("Loaded {} nodes, {} triangles", model.nodes.len(), model.triangle_count());
    let mut app = TerminalApp::new(model)?;
    app.run()
}

/// meshkit terminal viewer
///
/// Loads an OBJ or STL file and renders it with the ASCII rasterizer.
/// Without a file a built-in cube is shown.
/// Controls:
///   - WASD / Arrow Keys: Rotate the model
///   - E/R: Roll rotation
///   - Q/ESC: Quit
use clap::Parser;
use meshkit_core::{Dispatcher, MeshError, Model, ObjOptions, ObjReader};
use meshkit_terminal::{dispatcher, TerminalApp, CUBE_MTL, CUBE_OBJ};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "meshkit-terminal", version, about = "View OBJ and STL models in the terminal")]
struct Cli {
    /// Model file (.obj, .obj.gz or .stl)
    file: Option<PathBuf>,

    /// Swap the Y and Z axes of positions and normals
    #[arg(long)]
    switch_yz: bool,

    /// Skip faces with bad indices instead of failing
    #[arg(long)]
    ignore_errors: bool,

    /// Directory to resolve texture maps against
    #[arg(long, value_name = "DIR")]
    texture_path: Option<PathBuf>,

    /// Print a summary of the loaded model and exit
    #[arg(long)]
    summary: bool,
}

impl Cli {
    fn options(&self) -> ObjOptions {
        let options = ObjOptions::default()
            .with_switch_yz(self.switch_yz)
            .with_ignore_errors(self.ignore_errors);
        match &self.texture_path {
            Some(dir) => options.with_texture_path(dir),
            None => options,
        }
    }
}

fn into_io(error: MeshError) -> io::Error {
    match error {
        MeshError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

fn load<D: Dispatcher>(
    file: Option<PathBuf>,
    options: &ObjOptions,
    dispatcher: &D,
) -> meshkit_core::Result<Model> {
    match file {
        Some(path) => meshkit_core::load_model(&path, options, dispatcher),
        None => Ok(ObjReader::new(options.clone())
            .read_with_materials(CUBE_OBJ.as_bytes(), [CUBE_MTL.as_bytes()])?
            .into_model(dispatcher, options)),
    }
}

fn print_summary(model: &Model) {
    for node in &model.nodes {
        let mesh = &node.mesh;
        println!(
            "{:<24} {:<16} {:>8} triangles {:>8} vertices{}{}",
            node.name,
            node.material.name,
            mesh.triangle_count(),
            mesh.vertex_count(),
            if mesh.normals.is_some() { " +normals" } else { "" },
            if mesh.texcoords.is_some() { " +texcoords" } else { "" },
        );
    }
    println!(
        "{} nodes, {} triangles, {} vertices",
        model.nodes.len(),
        model.triangle_count(),
        model.vertex_count()
    );
    if let Some((min, max)) = model.bounds() {
        println!(
            "bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let options = cli.options();

    // Parse on a loader thread; model building is dispatched back here.
    let (main_thread, queue) = dispatcher::channel();
    let file = cli.file.clone();
    let loader = std::thread::spawn(move || load(file, &options, &main_thread));
    let jobs = queue.run();
    log::debug!("serviced {jobs} main thread jobs");

    let model = match loader.join() {
        Ok(result) => result.map_err(into_io)?,
        Err(panic) => std::panic::resume_unwind(panic),
    };

    if cli.summary {
        print_summary(&model);
        return Ok(());
    }

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(model)?;
    app.run()?;

    Ok(())
}

/// Terminal-based model viewer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use meshkit_core::Model;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod dispatcher;
pub mod renderer;
pub mod view;

pub use dispatcher::{MainThreadDispatcher, MainThreadQueue};
pub use renderer::AsciiRenderer;
pub use view::{Orientation, View};

/// A unit cube with one material per side pair, used when no file is given.
pub const CUBE_OBJ: &str = "\
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
g cube
s off
usemtl red
f 5 6 7 8
f 2 1 4 3
usemtl green
f 6 2 3 7
f 1 5 8 4
usemtl blue
f 8 7 3 4
f 1 2 6 5
";

/// Material library for [`CUBE_OBJ`].
pub const CUBE_MTL: &str = "\
newmtl red
Kd 0.9 0.2 0.2
newmtl green
Kd 0.2 0.9 0.3
newmtl blue
Kd 0.3 0.4 1.0
";

/// Main application struct for terminal model viewing
pub struct TerminalApp {
    model: Model,
    orientation: Orientation,
    view: View,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(model: Model) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let (width, height) = (width as usize, height as usize);

        Ok(Self {
            view: View::fit(model.bounds(), width, height),
            model,
            orientation: Orientation::new(0.3, 0.3, 0.0),
            renderer: AsciiRenderer::new(width, height),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30);

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Continuous slow rotation
            self.orientation.rotate(0.01, 0.015, 0.0);

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('w') | KeyCode::Up => self.orientation.rotate(0.1, 0.0, 0.0),
                KeyCode::Char('s') | KeyCode::Down => self.orientation.rotate(-0.1, 0.0, 0.0),
                KeyCode::Char('a') | KeyCode::Left => self.orientation.rotate(0.0, -0.1, 0.0),
                KeyCode::Char('d') | KeyCode::Right => self.orientation.rotate(0.0, 0.1, 0.0),
                KeyCode::Char('e') => self.orientation.rotate(0.0, 0.0, 0.1),
                KeyCode::Char('r') => self.orientation.rotate(0.0, 0.0, -0.1),
                _ => {}
            },
            Event::Resize(width, height) => self.resize(width as usize, height as usize),
            _ => {}
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.view = View::fit(self.model.bounds(), width, height);
        self.renderer = AsciiRenderer::new(width, height);
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.renderer
            .render_model(&self.model, &self.view, &self.orientation.rotation());

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "meshkit | {} nodes, {} triangles | FPS: {:.1} | WASD/Arrows=Rotate E/R=Roll Q=Quit",
                self.model.nodes.len(),
                self.model.triangle_count(),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

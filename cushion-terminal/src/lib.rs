//! Terminal front end for the cushion scan alignment tools
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use cushion_core::{
    AlignConfig, AlignToOrigin, Camera, FlipZ, Operator, PanelState, RotationState, SceneObject,
    Transform,
};
use log::{info, warn};
use nalgebra::Matrix4;
use std::io::{self, stdout, Write};
use std::time::Duration;

pub mod cli;
pub mod renderer;

pub use renderer::AsciiRenderer;

/// Orbit step per key press, in radians
const ORBIT_STEP: f64 = 0.1;

/// Columns reserved for the tools panel on the left
const PANEL_WIDTH: u16 = 44;

/// Interactive preview: the tools panel next to an ASCII render of the scan
pub struct TerminalApp {
    object: SceneObject,
    align: AlignToOrigin,
    flip: FlipZ,
    orbit: RotationState,
    camera: Camera,
    renderer: AsciiRenderer,
    status: Option<String>,
    running: bool,
}

impl TerminalApp {
    pub fn new(object: SceneObject, config: AlignConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let view_width = width.saturating_sub(PANEL_WIDTH).max(1);
        let view_height = height.saturating_sub(1).max(1);

        let mut app = Self {
            object,
            align: AlignToOrigin::new(config),
            flip: FlipZ::new(config),
            orbit: RotationState::default(),
            camera: Camera::new(view_width as u32, view_height as u32),
            renderer: AsciiRenderer::new(view_width as usize, view_height as usize),
            status: None,
            running: true,
        };
        app.reframe();
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    /// The object as left by the last operator
    pub fn into_object(self) -> SceneObject {
        self.object
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.render()?;
        while self.running {
            if event::poll(Duration::from_millis(100))? {
                self.handle_input()?;
                self.render()?;
            }
        }
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            return Ok(());
        };
        if kind == KeyEventKind::Release {
            return Ok(());
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('a') => self.run_operator(OperatorKind::Align),
            KeyCode::Char('f') => self.run_operator(OperatorKind::Flip),
            KeyCode::Char('w') | KeyCode::Up => self.orbit.rotate(ORBIT_STEP, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.orbit.rotate(-ORBIT_STEP, 0.0, 0.0),
            KeyCode::Char('h') | KeyCode::Left => self.orbit.rotate(0.0, -ORBIT_STEP, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.orbit.rotate(0.0, ORBIT_STEP, 0.0),
            KeyCode::Char('r') => self.orbit = RotationState::default(),
            _ => {}
        }
        Ok(())
    }

    fn run_operator(&mut self, kind: OperatorKind) {
        let panel = PanelState::from_active(Some(&self.object));
        let operator: &dyn Operator = match kind {
            OperatorKind::Align if panel.align_enabled => &self.align,
            OperatorKind::Flip if panel.flip_enabled => &self.flip,
            _ => {
                self.status = Some("That action is not available right now.".to_string());
                return;
            }
        };

        self.status = Some(match operator.execute(&mut self.object) {
            Ok(_) => {
                info!("{} finished", operator.label());
                format!("{} finished.", operator.label())
            }
            Err(e) => {
                warn!("{} failed: {}", operator.label(), e);
                format!("{} failed: {}", operator.label(), e)
            }
        });
        self.reframe();
    }

    fn reframe(&mut self) {
        if let Some(bounds) = self.object.mesh.bounds() {
            self.camera.frame(&bounds);
        }
    }

    /// Orbit about the camera target, on top of the object's world matrix
    fn model_matrix(&self) -> Matrix4<f64> {
        let target = self.camera.target.coords;
        Transform::translation_matrix(&target)
            * Transform::rotation_matrix(&self.orbit)
            * Transform::translation_matrix(&-target)
            * self.object.world
    }

    fn render(&mut self) -> io::Result<()> {
        let model = self.model_matrix();

        self.renderer.clear();
        self.renderer.render_mesh(&self.object.mesh, &model, &self.camera);
        self.renderer
            .mark_vertices(&self.object.mesh, self.object.selection(), &model, &self.camera);

        let mut stdout = stdout();
        queue!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(PANEL_WIDTH, 0))?;
        self.draw_view(&mut stdout)?;
        self.draw_panel(&mut stdout)?;
        stdout.flush()
    }

    fn draw_view<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        // Renderer rows break lines, so move to the view column before each one
        let mut row = Vec::new();
        self.renderer.draw(&mut row)?;
        for (y, line) in String::from_utf8_lossy(&row).split("\r\n").enumerate() {
            queue!(writer, cursor::MoveTo(PANEL_WIDTH, y as u16), Print(line))?;
        }
        Ok(())
    }

    fn draw_panel<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let panel = PanelState::from_active(Some(&self.object));
        let mut y = 0u16;
        for line in panel.lines() {
            let color = if line.ends_with("(disabled)") {
                Color::DarkGrey
            } else if line.starts_with('[') {
                Color::Yellow
            } else {
                Color::White
            };
            for chunk in wrap(&line, PANEL_WIDTH as usize - 2) {
                queue!(
                    writer,
                    cursor::MoveTo(0, y),
                    SetForegroundColor(color),
                    Print(chunk),
                    ResetColor
                )?;
                y += 1;
            }
        }

        y += 1;
        queue!(
            writer,
            cursor::MoveTo(0, y),
            Print("Arrows/WSHD=Orbit R=Reset Q=Quit")
        )?;
        if let Some(status) = &self.status {
            for chunk in wrap(status, PANEL_WIDTH as usize - 2) {
                y += 1;
                queue!(
                    writer,
                    cursor::MoveTo(0, y),
                    SetForegroundColor(Color::Green),
                    Print(chunk),
                    ResetColor
                )?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum OperatorKind {
    Align,
    Flip,
}

/// Greedy word wrap to `width` columns
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

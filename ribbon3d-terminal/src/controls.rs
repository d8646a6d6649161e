/// Keyboard controls, collected once per frame
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use nalgebra::{Vector3, Vector4};
use ribbon3d_core::{linalg, Camera, Transform};

/// World units per pan step
const PAN_STEP: f32 = 0.1;
/// World units per dolly step
const DOLLY_STEP: f32 = 0.2;
/// Degrees per yaw/roll step
const TURN_STEP: f32 = 5.0;

/// Every control input seen since the previous frame.
///
/// Opposite keys cancel out. Two presses of the projection toggle in one
/// frame leave the projection unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlState {
    pub pan_x: i32,
    pub pan_y: i32,
    pub dolly: i32,
    pub yaw: i32,
    pub roll: i32,
    pub toggle_projection: bool,
    pub quit: bool,
    pub resize: Option<(u16, u16)>,
}

impl ControlState {
    pub fn from_events<I: IntoIterator<Item = Event>>(events: I) -> Self {
        let mut state = Self::default();
        for event in events {
            state.record(&event);
        }
        state
    }

    pub fn record(&mut self, event: &Event) {
        match *event {
            Event::Key(key) => self.record_key(key),
            Event::Resize(width, height) => self.resize = Some((width, height)),
            _ => {}
        }
    }

    fn record_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Left => self.pan_x -= 1,
            KeyCode::Right => self.pan_x += 1,
            KeyCode::Up => self.pan_y += 1,
            KeyCode::Down => self.pan_y -= 1,
            KeyCode::Char('w') => self.dolly += 1,
            KeyCode::Char('s') => self.dolly -= 1,
            KeyCode::Char('a') => self.yaw += 1,
            KeyCode::Char('d') => self.yaw -= 1,
            KeyCode::Char('e') => self.roll += 1,
            KeyCode::Char('r') => self.roll -= 1,
            KeyCode::Char('p') => self.toggle_projection = !self.toggle_projection,
            _ => {}
        }
    }

    /// True when applying this state would not change the camera
    pub fn is_idle(&self) -> bool {
        let Self { quit, .. } = *self;
        *self == Self { quit, ..Self::default() }
    }

    /// Move the camera once for everything recorded.
    ///
    /// Panning and dollying follow the camera's own axes as they were at the
    /// start of the frame. Projection toggles keep the view size matched at
    /// the distance from the camera to the world origin.
    pub fn apply(&self, camera: &mut Camera) {
        let rotation = Transform::rotation_matrix(&camera.pose);
        let axis = |direction: Vector3<f32>| {
            linalg::transform(&rotation, &Vector4::new(direction.x, direction.y, direction.z, 0.0)).xyz()
        };

        let offset = axis(Vector3::x()) * (self.pan_x as f32 * PAN_STEP)
            + axis(Vector3::y()) * (self.pan_y as f32 * PAN_STEP)
            + axis(-Vector3::z()) * (self.dolly as f32 * DOLLY_STEP);
        camera.pose.translate(offset.x, offset.y, offset.z);
        camera
            .pose
            .rotate(self.yaw as f32 * TURN_STEP, 0.0, self.roll as f32 * TURN_STEP);

        if let Some((columns, rows)) = self.resize {
            resize_camera(camera, columns, rows);
        }

        if self.toggle_projection {
            let focus_distance = camera.pose.position.norm().max(linalg::EPSILON);
            camera.projection = camera.projection.toggled(focus_distance);
            log::info!("Switched to {:?} projection", camera.projection.mode());
        }
    }
}

/// Terminal cells are about twice as tall as they are wide
pub fn resize_camera(camera: &mut Camera, columns: u16, rows: u16) {
    camera.resize(columns as u32, rows as u32 * 2);
}

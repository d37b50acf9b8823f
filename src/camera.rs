//! First-person camera, projection and the uniform that carries them to the GPU.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Quaternion, Rad, Rotation3, Vector3};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::keyboard::KeyCode;

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

// Cosine limit for how close the view direction may get to the up axis.
const MAX_PITCH_DOT: f32 = 0.999;

/// Eye position plus an orthonormal viewing direction and up vector.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        Self {
            position: position.into(),
            direction: -Vector3::unit_z(),
            up: Vector3::unit_y(),
        }
    }

    /// Point the camera at `target` and reset up to +Y.
    pub fn look_at<P: Into<Point3<f32>>>(&mut self, target: P) {
        let dir = target.into() - self.position;
        if dir.magnitude2() == 0.0 {
            return;
        }
        self.direction = dir.normalize();
        self.up = Vector3::unit_y();
    }

    pub fn right(&self) -> Vector3<f32> {
        self.direction.cross(self.up).normalize()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.direction, self.up)
    }
}

impl From<&CameraConfig> for Camera {
    fn from(config: &CameraConfig) -> Self {
        let mut camera = Camera::new(config.position);
        camera.look_at(config.target);
        camera
    }
}

pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// WASD + QE flying with drag-to-look.
///
/// Key state is latched from events and applied once per frame in
/// [`update`](Self::update); mouse drags accumulate until then.
#[derive(Debug)]
pub struct CameraController {
    velocity: f32,
    degrees_per_pixel: f32,
    forward: bool,
    backward: bool,
    strafe_left: bool,
    strafe_right: bool,
    up: bool,
    down: bool,
    yaw: f32,
    pitch: f32,
}

impl CameraController {
    pub fn new(velocity: f32, degrees_per_pixel: f32) -> Self {
        Self {
            velocity,
            degrees_per_pixel,
            forward: false,
            backward: false,
            strafe_left: false,
            strafe_right: false,
            up: false,
            down: false,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Returns whether the key is one of the movement keys.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let flag = match key {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.backward,
            KeyCode::KeyA => &mut self.strafe_left,
            KeyCode::KeyD => &mut self.strafe_right,
            KeyCode::KeyQ => &mut self.up,
            KeyCode::KeyE => &mut self.down,
            _ => return false,
        };
        *flag = pressed;
        true
    }

    /// `dx`/`dy` are window pixels, y pointing down.
    pub fn handle_drag(&mut self, dx: f64, dy: f64) {
        self.yaw += -dx as f32 * self.degrees_per_pixel;
        self.pitch += -dy as f32 * self.degrees_per_pixel;
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        self.apply_rotation(camera);

        let step = self.velocity * dt.as_secs_f32();
        if step == 0.0 {
            return;
        }
        let direction = camera.direction.normalize();
        let right = camera.right();
        let up = camera.up.normalize();
        let mut offset = Vector3::new(0.0, 0.0, 0.0);
        if self.forward {
            offset += direction * step;
        }
        if self.backward {
            offset -= direction * step;
        }
        if self.strafe_left {
            offset -= right * step;
        }
        if self.strafe_right {
            offset += right * step;
        }
        if self.up {
            offset += up * step;
        }
        if self.down {
            offset -= up * step;
        }
        camera.position += offset;
    }

    fn apply_rotation(&mut self, camera: &mut Camera) {
        let (yaw, pitch) = (self.yaw, self.pitch);
        self.yaw = 0.0;
        self.pitch = 0.0;

        if yaw != 0.0 {
            camera.direction =
                (Quaternion::from_axis_angle(camera.up.normalize(), Deg(yaw)) * camera.direction)
                    .normalize();
        }
        if pitch != 0.0 {
            let pitched =
                (Quaternion::from_axis_angle(camera.right(), Deg(pitch)) * camera.direction)
                    .normalize();
            // Looking straight along up would make the view basis degenerate.
            if pitched.dot(camera.up.normalize()).abs() < MAX_PITCH_DOT {
                camera.direction = pitched;
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.velocity, self.degrees_per_pixel);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn looks_at_origin_from_config() {
        let camera = Camera::from(&CameraConfig::default());
        let expected = Vector3::new(-20.0, -10.0, -20.0).normalize();
        assert!(approx(camera.direction, expected));
        assert_eq!(camera.up, Vector3::unit_y());
    }

    #[test]
    fn forward_moves_along_direction() {
        let mut camera = Camera::new([0.0, 0.0, 0.0]);
        let mut controller = CameraController::new(5.0, 0.5);
        controller.handle_key(KeyCode::KeyW, true);
        controller.update(&mut camera, Duration::from_secs(2));
        assert!(approx(
            camera.position - Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -10.0)
        ));
    }

    #[test]
    fn strafe_right_follows_direction_cross_up() {
        let mut camera = Camera::new([0.0, 0.0, 0.0]);
        let mut controller = CameraController::new(1.0, 0.5);
        controller.handle_key(KeyCode::KeyD, true);
        controller.update(&mut camera, Duration::from_secs(1));
        assert!(approx(
            camera.position - Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_x()
        ));
    }

    #[test]
    fn released_key_stops_movement() {
        let mut camera = Camera::new([0.0, 0.0, 0.0]);
        let mut controller = CameraController::new(1.0, 0.5);
        controller.handle_key(KeyCode::KeyQ, true);
        controller.handle_key(KeyCode::KeyQ, false);
        controller.update(&mut camera, Duration::from_secs(1));
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn unrelated_keys_are_not_consumed() {
        let mut controller = CameraController::new(1.0, 0.5);
        assert!(!controller.handle_key(KeyCode::Escape, true));
        assert!(controller.handle_key(KeyCode::KeyE, true));
    }

    #[test]
    fn dragging_right_turns_right() {
        let mut camera = Camera::new([0.0, 0.0, 0.0]);
        let mut controller = CameraController::new(1.0, 0.5);
        // 180 px * 0.5 deg/px = 90 degrees
        controller.handle_drag(180.0, 0.0);
        controller.update(&mut camera, Duration::ZERO);
        assert!(approx(camera.direction, Vector3::unit_x()));
    }

    #[test]
    fn dragging_down_looks_down() {
        let mut camera = Camera::new([0.0, 0.0, 0.0]);
        let mut controller = CameraController::new(1.0, 0.5);
        controller.handle_drag(0.0, 60.0);
        controller.update(&mut camera, Duration::ZERO);
        assert!(camera.direction.y < 0.0);
        assert!((camera.direction.magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pitch_never_reaches_the_up_axis() {
        let mut camera = Camera::new([0.0, 0.0, 0.0]);
        let mut controller = CameraController::new(1.0, 0.5);
        controller.handle_drag(0.0, -180.0);
        controller.update(&mut camera, Duration::ZERO);
        assert!(camera.direction.dot(camera.up).abs() < MAX_PITCH_DOT);
    }

    #[test]
    fn reset_drops_pending_input() {
        let mut camera = Camera::new([0.0, 0.0, 0.0]);
        let mut controller = CameraController::new(1.0, 0.5);
        controller.handle_key(KeyCode::KeyW, true);
        controller.handle_drag(100.0, 0.0);
        controller.reset();
        controller.update(&mut camera, Duration::from_secs(1));
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
        assert!(approx(camera.direction, -Vector3::unit_z()));

        // Speed survives the reset.
        controller.handle_key(KeyCode::KeyW, true);
        controller.update(&mut camera, Duration::from_secs(1));
        assert!(approx(
            camera.position - Point3::new(0.0, 0.0, 0.0),
            -Vector3::unit_z()
        ));
    }

    #[test]
    fn projection_ignores_zero_resize() {
        let mut projection = Projection::new(800, 600, Deg(67.0), 0.05, 50.0);
        projection.resize(0, 600);
        assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
        projection.resize(1000, 500);
        assert!((projection.aspect() - 2.0).abs() < 1e-6);
    }
}

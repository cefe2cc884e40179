//! Viewer application implementing winit ApplicationHandler
//!
//! Owns the window, GPU resources, camera, input, UI overlay, and the
//! frame loop. Click the 3D view to capture the cursor for mouse look;
//! Escape releases it, then exits.

use crate::audio::AudioPlayer;
use crate::clock::FrameClock;
use crate::input::InputState;
use crate::presence::{LogPresence, PresenceUpdater};
use kiln_core::{mat4_mul, mat4_rotation_y, mat4_translation, Mat4, Vec3};
use kiln_import::ObjImport;
use kiln_render::{
    FlyCamera, FrameUniforms, GpuModel, ModelPipeline, OverlayPipeline, RenderContext,
    TextureCache,
};
use kiln_ui::{BitmapFont, DrawList, PointerState, UiComponent};
use std::sync::Arc;
use std::time::Duration;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

const MOVE_SPEED: f32 = 4.0;
const LOOK_SENSITIVITY: f32 = 0.1;
const MODEL_SPIN_SPEED: f32 = 45.0;
const PRESENCE_INTERVAL: Duration = Duration::from_secs(15);

/// GPU resources created once the window exists
struct GpuState {
    model_pipeline: ModelPipeline,
    overlay: OverlayPipeline,
    model: GpuModel,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    overlay_bind_group: wgpu::BindGroup,
}

pub struct ViewerApp {
    import: ObjImport,
    model_name: String,
    model_center: [f32; 3],

    ui_components: Vec<UiComponent>,
    font: BitmapFont,
    draw_list: DrawList,

    window: Option<Arc<Window>>,
    context: Option<RenderContext>,
    gpu: Option<GpuState>,

    camera: FlyCamera,
    model_yaw: f32,
    input: InputState,
    clock: FrameClock,
    audio: AudioPlayer,
    presence: Option<PresenceUpdater>,

    pub fullscreen: bool,
    cursor_captured: bool,
    should_exit: bool,
}

impl ViewerApp {
    pub fn new(
        import: ObjImport,
        model_name: String,
        ui_components: Vec<UiComponent>,
        font: BitmapFont,
        fullscreen: bool,
    ) -> Self {
        // Frame the model: back off far enough to see its largest extent
        let (center, extent) = match import.geometry.bounds() {
            Some(bounds) => (bounds.center(), bounds.max_extent().max(0.001)),
            None => ([0.0, 0.0, 0.0], 1.0),
        };
        let mut camera = FlyCamera::new();
        camera.position = Vec3::new(center[0], center[1] + extent * 0.3, center[2] + extent * 1.5);
        camera.yaw = -90.0;
        camera.pitch = -10.0;

        let mut audio = AudioPlayer::new();
        let click_path = std::path::Path::new("assets/sounds/click.ogg");
        if click_path.exists() {
            if let Err(e) = audio.load_sound("click", click_path) {
                eprintln!("{e}");
            }
        }

        Self {
            import,
            model_name,
            model_center: center,
            ui_components,
            font,
            draw_list: DrawList::new(),
            window: None,
            context: None,
            gpu: None,
            camera,
            model_yaw: 0.0,
            input: InputState::new(),
            clock: FrameClock::new(),
            audio,
            presence: None,
            fullscreen,
            cursor_captured: false,
            should_exit: false,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) {
        let window_attrs = Window::default_attributes()
            .with_title(format!("Kiln Viewer - {}", self.model_name))
            .with_inner_size(PhysicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs).unwrap());

        if self.fullscreen {
            window.set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
        }

        self.window = Some(window.clone());

        let context = pollster::block_on(RenderContext::new(window.clone())).unwrap();

        let model_pipeline = ModelPipeline::new(&context.device, context.config.format);
        let mut overlay = OverlayPipeline::new(&context.device, context.config.format);
        let mut textures = TextureCache::new(&context.device, &context.queue);

        let model = GpuModel::upload(
            &context.device,
            &context.queue,
            &model_pipeline,
            &mut textures,
            &self.import,
        );

        let frame_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Frame Uniforms"),
                contents: bytemuck::bytes_of(&FrameUniforms::new()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let frame_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &model_pipeline.frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        overlay.set_screen_size(&context.queue, context.size.width, context.size.height);
        let overlay_bind_group = match textures.get_or_load(
            &context.device,
            &context.queue,
            &self.font.texture_path,
            true,
        ) {
            Some(atlas) => overlay.create_bind_group(&context.device, atlas),
            None => overlay.create_bind_group(&context.device, &textures.white),
        };

        let screen = (context.size.width as f32, context.size.height as f32);
        for component in &mut self.ui_components {
            component.refresh_layout(screen.0, screen.1);
        }

        // The bind groups keep the cached textures alive; the cache itself
        // is only needed during upload
        self.gpu = Some(GpuState {
            model_pipeline,
            overlay,
            model,
            frame_buffer,
            frame_bind_group,
            overlay_bind_group,
        });
        self.context = Some(context);

        let presence = PresenceUpdater::start(Box::new(LogPresence), PRESENCE_INTERVAL);
        presence.set_status("Viewing a model", self.model_name.clone());
        self.presence = Some(presence);
    }

    fn capture_cursor(&mut self) {
        if let Some(window) = &self.window {
            // Try confined first, then locked
            let _ = window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
            window.set_cursor_visible(false);
            self.cursor_captured = true;
        }
    }

    fn release_cursor(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
            self.cursor_captured = false;
        }
    }

    fn handle_ui_action(&mut self, action: &str) {
        self.audio.play("click");
        match action {
            "quit" => self.should_exit = true,
            _ => println!("UI action: {action}"),
        }
    }

    fn tick(&mut self) {
        self.clock.tick();
        let dt = self.clock.delta_time as f32;

        if self.cursor_captured {
            let (dx, dy) = self.input.raw_mouse_delta();
            self.camera
                .rotate(dx as f32 * LOOK_SENSITIVITY, -dy as f32 * LOOK_SENSITIVITY);
        }

        // WASD flight relative to where the camera faces
        let front = self.camera.front();
        let right = self.camera.right();
        let mut movement = Vec3::ZERO;
        if self.input.is_key_down(KeyCode::KeyW) {
            movement = movement + front;
        }
        if self.input.is_key_down(KeyCode::KeyS) {
            movement = movement - front;
        }
        if self.input.is_key_down(KeyCode::KeyD) {
            movement = movement + right;
        }
        if self.input.is_key_down(KeyCode::KeyA) {
            movement = movement - right;
        }
        if self.input.is_key_down(KeyCode::Space) {
            movement = movement + Vec3::UP;
        }
        if self.input.is_key_down(KeyCode::ShiftLeft) {
            movement = movement - Vec3::UP;
        }
        if movement.dot(&movement) > 0.0 {
            self.camera.position =
                self.camera.position + movement.normalized() * (MOVE_SPEED * dt);
        }

        // Arrow keys spin the model in place
        if self.input.is_key_down(KeyCode::ArrowLeft) {
            self.model_yaw -= MODEL_SPIN_SPEED * dt;
        }
        if self.input.is_key_down(KeyCode::ArrowRight) {
            self.model_yaw += MODEL_SPIN_SPEED * dt;
        }

        // UI only sees the pointer while the cursor is free
        if !self.cursor_captured {
            let pointer = PointerState {
                x: self.input.mouse_position.0 as f32,
                y: self.input.mouse_position.1 as f32,
                pressed: self.input.is_mouse_button_down(0),
                just_pressed: self.input.is_mouse_button_just_pressed(0),
            };

            let mut actions = Vec::new();
            let mut consumed = false;
            for component in &mut self.ui_components {
                if let Some(event) = component.handle_input(&pointer) {
                    actions.push(event.action);
                    consumed = true;
                }
            }
            for action in actions {
                self.handle_ui_action(&action);
            }

            // A click on empty space grabs the cursor for mouse look
            if pointer.just_pressed && !consumed {
                self.capture_cursor();
            }
        }

        self.draw_list.clear();
        for component in &self.ui_components {
            component.build_draw(&self.font, &mut self.draw_list);
        }

        self.input.end_frame();
    }

    fn model_matrix(&self) -> Mat4 {
        // Spin about the model's own center
        let [cx, cy, cz] = self.model_center;
        let to_origin = mat4_translation(-cx, -cy, -cz);
        let rotate = mat4_rotation_y(self.model_yaw.to_radians());
        let back = mat4_translation(cx, cy, cz);
        mat4_mul(&back, &mat4_mul(&rotate, &to_origin))
    }

    fn render(&mut self) {
        let Some(context) = &self.context else {
            return;
        };
        let uniforms = FrameUniforms {
            view_proj: self.camera.view_projection_matrix(context.aspect_ratio()),
            model: self.model_matrix(),
            camera_pos: self.camera.position_array(),
            ..FrameUniforms::new()
        };

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        context
            .queue
            .write_buffer(&gpu.frame_buffer, 0, bytemuck::bytes_of(&uniforms));

        gpu.overlay.prepare(&context.device, &self.draw_list);

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                return;
            }
            Err(e) => {
                eprintln!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.07,
                            g: 0.08,
                            b: 0.10,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &context.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            gpu.model
                .draw(&mut pass, &gpu.model_pipeline, &gpu.frame_bind_group);
            gpu.overlay.draw(&mut pass, &gpu.overlay_bind_group);
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.initialize(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.context {
                    context.resize(new_size);
                    if let Some(gpu) = &self.gpu {
                        gpu.overlay
                            .set_screen_size(&context.queue, new_size.width, new_size.height);
                    }
                    for component in &mut self.ui_components {
                        component
                            .refresh_layout(new_size.width as f32, new_size.height as f32);
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if key_code == KeyCode::Escape {
                                if self.cursor_captured {
                                    self.release_cursor();
                                } else {
                                    event_loop.exit();
                                }
                                return;
                            }

                            if key_code == KeyCode::F11 {
                                if let Some(window) = &self.window {
                                    if window.fullscreen().is_some() {
                                        window.set_fullscreen(None);
                                    } else {
                                        window.set_fullscreen(Some(
                                            winit::window::Fullscreen::Borderless(None),
                                        ));
                                    }
                                }
                            }

                            self.input.process_key_down(key_code);
                        }
                        ElementState::Released => {
                            self.input.process_key_up(key_code);
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.input.process_mouse_move(position.x, position.y);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let btn = match button {
                    MouseButton::Left => 0,
                    MouseButton::Right => 1,
                    MouseButton::Middle => 2,
                    _ => return,
                };

                match state {
                    ElementState::Pressed => self.input.process_mouse_button_down(btn),
                    ElementState::Released => self.input.process_mouse_button_up(btn),
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();
                self.render();
                if self.should_exit {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if !self.cursor_captured {
            return;
        }

        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_raw_delta(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

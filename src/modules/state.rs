use crate::modules::config::{AnimationConfig, AppConfig, GpuRequest};
use crate::modules::error::{StartupError, StartupResult};
use crate::modules::shader::{
    ProgramDesc, ShaderProgram, UniformDecl, UniformLocation, create_shader_program,
    route_uncaptured_errors,
};
use crate::modules::transform::FrameParams;
use crate::modules::vertex::{TRIANGLE_VERTICES, Vertex};
use std::sync::Arc;
use std::time::Instant;
use wgpu::util::DeviceExt;
use winit::window::Window;

// ============================================================================
// SHADER SOURCES
// ============================================================================
pub const VERTEX_SHADER_SOURCE: &str = r#"
@group(0) @binding(0)
var<uniform> transform: mat4x4<f32>;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}
"#;

pub const FRAGMENT_SHADER_SOURCE: &str = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;

pub const TRANSFORM_UNIFORM: UniformDecl = UniformDecl {
    name: "transform",
    size: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
};

/// What happened to a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn { vertices: u32 },
    Skipped,
    /// The surface cannot recover; the loop should terminate.
    Fatal,
}

/// GPU resources in the order they are released at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    VertexBuffer,
    Program,
    Surface,
    Device,
    Window,
}

// ============================================================================
// TRIANGLE RENDERER
// ============================================================================

/// Everything needed to record the triangle into a color target. Knows nothing
/// about surfaces or windows.
pub struct TriangleRenderer {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    program: ShaderProgram,
    transform_location: Option<UniformLocation>,
    clear_color: wgpu::Color,
    animation: AnimationConfig,
    frames_drawn: u64,
    draw_calls: u64,
}

impl TriangleRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        clear_color: wgpu::Color,
        animation: AnimationConfig,
    ) -> Self {
        let program = create_shader_program(
            device,
            &ProgramDesc {
                label: "triangle program",
                vertex_source: VERTEX_SHADER_SOURCE,
                fragment_source: FRAGMENT_SHADER_SOURCE,
                vertex_layouts: &[Vertex::layout()],
                color_format,
                uniforms: &[TRANSFORM_UNIFORM],
            },
        );
        let transform_location = program.uniform_location(TRANSFORM_UNIFORM.name);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle VB"),
            contents: bytemuck::cast_slice(&TRIANGLE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            vertex_buffer,
            vertex_count: TRIANGLE_VERTICES.len() as u32,
            program,
            transform_location,
            clear_color,
            animation,
            frames_drawn: 0,
            draw_calls: 0,
        }
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    /// Clears `view`, uploads the transform for `elapsed_secs` and draws the
    /// triangle once. The caller presents or reads back the target.
    pub fn draw_frame(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        elapsed_secs: f32,
    ) -> FrameOutcome {
        let params = FrameParams::at(elapsed_secs, &self.animation);
        self.program
            .set_uniform_mat4(queue, self.transform_location, &params.transform());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Triangle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.program.bind(&mut render_pass);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..self.vertex_count, 0..1);
        }
        self.draw_calls += 1;

        queue.submit([encoder.finish()]);
        self.frames_drawn += 1;

        log::debug!(
            "frame {} at {elapsed_secs:.3}s: {} draw call(s) total, {} vertices, {params:?}",
            self.frames_drawn,
            self.draw_calls,
            self.vertex_count
        );

        FrameOutcome::Drawn {
            vertices: self.vertex_count,
        }
    }

    /// Releases the vertex buffer, then the program.
    pub fn release(self) -> Vec<Released> {
        let TriangleRenderer {
            vertex_buffer,
            program,
            ..
        } = self;
        let mut order = Vec::with_capacity(5);

        vertex_buffer.destroy();
        drop(vertex_buffer);
        order.push(Released::VertexBuffer);

        drop(program);
        order.push(Released::Program);

        order
    }
}

// ============================================================================
// STATE
// ============================================================================

/// The renderer plus the window and surface it presents to.
///
/// Field order is drop order (vertex data and program, then surface, device,
/// window), so even an unplanned drop tears down in the same sequence as
/// [`State::shutdown`].
pub struct State {
    renderer: TriangleRenderer,
    surface: wgpu::Surface<'static>,
    surface_format: wgpu::TextureFormat,
    device: wgpu::Device,
    queue: wgpu::Queue,
    window: Arc<Window>,

    size: winit::dpi::PhysicalSize<u32>,
    gpu: GpuRequest,
    started: Instant,
}

impl State {
    pub async fn new(window: Arc<Window>, config: &AppConfig) -> StartupResult<State> {
        // Elapsed time counts from here, like a context-creation timer
        let started = Instant::now();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.gpu.backends,
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.gpu.power_preference,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("triangle device"),
                required_limits: config
                    .gpu
                    .required_limits
                    .clone()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await?;
        route_uncaptured_errors(&device);

        let cap = surface.get_capabilities(&adapter);
        // No sRGB encode on write, so colors land as a plain GL framebuffer shows them
        let surface_format = cap
            .formats
            .first()
            .copied()
            .ok_or(StartupError::NoSurfaceFormat)?
            .remove_srgb_suffix();

        let renderer =
            TriangleRenderer::new(&device, surface_format, config.clear_color, config.animation);

        let state = State {
            renderer,
            surface,
            surface_format,
            device,
            queue,
            size: window.inner_size(),
            window,
            gpu: config.gpu.clone(),
            started,
        };

        state.configure_surface();
        Ok(state)
    }

    // ============================================================================
    // UTILITY FUNCTIONS
    // ============================================================================
    pub fn get_window(&self) -> &Window {
        &self.window
    }

    fn configure_surface(&self) {
        if self.size.width == 0 || self.size.height == 0 {
            return;
        }
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.surface_format,
            view_formats: vec![],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: self.size.width,
            height: self.size.height,
            desired_maximum_frame_latency: self.gpu.desired_maximum_frame_latency,
            present_mode: self.gpu.present_mode,
        };
        self.surface.configure(&self.device, &surface_config);
    }

    /// Reconfigure after the surface was lost or went stale.
    fn reconfigure(&mut self) {
        self.size = self.window.inner_size();
        self.configure_surface();
    }

    // ============================================================================
    // RENDERING
    // ============================================================================
    pub fn render(&mut self) -> FrameOutcome {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated; reconfiguring");
                self.reconfigure();
                return FrameOutcome::Skipped;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of memory acquiring surface texture");
                return FrameOutcome::Fatal;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return FrameOutcome::Skipped;
            }
        };

        let texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let elapsed = self.started.elapsed().as_secs_f32();
        let outcome = self
            .renderer
            .draw_frame(&self.device, &self.queue, &texture_view, elapsed);

        self.window.pre_present_notify();
        surface_texture.present();
        outcome
    }

    /// Tears everything down in order: vertex buffer, program, surface, device,
    /// window.
    pub fn shutdown(self) -> Vec<Released> {
        log::info!(
            "releasing GPU resources after {} frame(s), {} draw call(s)",
            self.renderer.frames_drawn(),
            self.renderer.draw_calls()
        );

        let State {
            renderer,
            surface,
            device,
            queue,
            window,
            ..
        } = self;

        let mut order = renderer.release();
        drop(surface);
        order.push(Released::Surface);
        drop(queue);
        drop(device);
        order.push(Released::Device);
        drop(window);
        order.push(Released::Window);

        log::debug!("teardown order: {order:?}");
        order
    }
}

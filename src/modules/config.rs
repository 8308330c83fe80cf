use winit::dpi::PhysicalSize;

/// Everything the demo needs to know at startup, fixed at compile time.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub clear_color: wgpu::Color,
    pub animation: AnimationConfig,
    pub gpu: GpuRequest,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            clear_color: CLEAR_COLOR,
            animation: AnimationConfig::default(),
            gpu: GpuRequest::default(),
        }
    }
}

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: PhysicalSize<u32>,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Triangle with Transformations (Slow)".to_string(),
            size: PhysicalSize::new(800, 600),
            resizable: false,
        }
    }
}

/// Constants driving the per-frame transform.
///
/// `rotation_rate` multiplies the slowed time directly and the result is fed to
/// sin/cos as radians, so 25 here means 25 rad per slowed second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    pub time_divisor: f32,
    pub translation_amplitude: f32,
    pub rotation_rate: f32,
    pub base_scale: f32,
    pub pulse_amplitude: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            time_divisor: 2.0,
            translation_amplitude: 0.3,
            rotation_rate: 25.0,
            base_scale: 0.7,
            pulse_amplitude: 0.1,
        }
    }
}

/// What we ask wgpu for when picking an adapter and device.
#[derive(Debug, Clone)]
pub struct GpuRequest {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    pub required_limits: wgpu::Limits,
    pub present_mode: wgpu::PresentMode,
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuRequest {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::default(),
            // GL 3.3 class hardware must qualify
            required_limits: wgpu::Limits::downlevel_defaults(),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
        }
    }
}

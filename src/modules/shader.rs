//! Shader compilation and program linking.
//!
//! A "program" here is a render pipeline plus the uniform buffers it reads.
//! Compile and link failures never abort: they are logged as errors, stored on
//! the returned [`ShaderProgram`], and the (possibly invalid) program is handed
//! back anyway.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
        }
    }

    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSource {
    Compile(ShaderStage),
    Link,
}

/// One compile or link failure with the driver's log text.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDiagnostic {
    pub source: DiagnosticSource,
    pub log: String,
}

impl fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            DiagnosticSource::Compile(stage) => {
                write!(f, "ERROR::SHADER::{}::COMPILATION_FAILED\n{}", stage.label(), self.log)
            }
            DiagnosticSource::Link => write!(f, "ERROR::PROGRAM::LINKING_FAILED\n{}", self.log),
        }
    }
}

/// A named uniform the program exposes. Bindings are assigned in declaration order
/// within group 0.
#[derive(Debug, Clone, Copy)]
pub struct UniformDecl {
    pub name: &'static str,
    pub size: wgpu::BufferAddress,
}

/// Resolved once at link time, then reused every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(usize);

struct UniformSlot {
    name: &'static str,
    buffer: wgpu::Buffer,
}

pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    pub vertex_layouts: &'a [wgpu::VertexBufferLayout<'a>],
    pub color_format: wgpu::TextureFormat,
    pub uniforms: &'a [UniformDecl],
}

pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniforms: Vec<UniformSlot>,
    diagnostics: Vec<ShaderDiagnostic>,
}

impl ShaderProgram {
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .position(|slot| slot.name == name)
            .map(UniformLocation)
    }

    /// Writes a matrix to a uniform slot. A `None` location is ignored, like a
    /// `-1` location in GL.
    pub fn set_uniform_mat4(
        &self,
        queue: &wgpu::Queue,
        location: Option<UniformLocation>,
        value: &glam::Mat4,
    ) {
        let Some(UniformLocation(index)) = location else {
            return;
        };
        if let Some(slot) = self.uniforms.get(index) {
            // WGSL matrices are column-major, same as glam
            queue.write_buffer(&slot.buffer, 0, bytemuck::cast_slice(&value.to_cols_array()));
        }
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
    }

    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    pub fn is_linked(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Send validation errors nobody scoped for to the log instead of panicking.
///
/// Drawing with a program that failed to link raises one of these every frame.
pub fn route_uncaptured_errors(device: &wgpu::Device) {
    device.on_uncaptured_error(Box::new(|error| {
        log::error!("GPU error: {error}");
    }));
}

pub struct CompiledShader {
    pub module: wgpu::ShaderModule,
    pub diagnostic: Option<ShaderDiagnostic>,
}

/// Compiles a single stage. On failure the diagnostic is logged and returned
/// alongside the module, which is still usable as a handle.
pub fn compile_shader(device: &wgpu::Device, stage: ShaderStage, source: &str) -> CompiledShader {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage.label()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let scope_error = pollster::block_on(device.pop_error_scope());
    let info = pollster::block_on(module.get_compilation_info());

    let mut log = compilation_log(&info);
    if log.is_empty() {
        if let Some(error) = &scope_error {
            log = error.to_string();
        }
    }

    let diagnostic = (!log.is_empty()).then(|| ShaderDiagnostic {
        source: DiagnosticSource::Compile(stage),
        log,
    });
    if let Some(diagnostic) = &diagnostic {
        log::error!("{diagnostic}");
    }

    CompiledShader { module, diagnostic }
}

/// Error-level messages only, one per line, prefixed with `line:column` when known.
fn compilation_log(info: &wgpu::CompilationInfo) -> String {
    info.messages
        .iter()
        .filter(|msg| matches!(msg.message_type, wgpu::CompilationMessageType::Error))
        .map(|msg| match &msg.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, msg.message),
            None => msg.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiles both stages and links them into one program.
pub fn create_shader_program(device: &wgpu::Device, desc: &ProgramDesc) -> ShaderProgram {
    let vertex = compile_shader(device, ShaderStage::Vertex, desc.vertex_source);
    let fragment = compile_shader(device, ShaderStage::Fragment, desc.fragment_source);

    let mut diagnostics: Vec<ShaderDiagnostic> = [&vertex.diagnostic, &fragment.diagnostic]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..desc.uniforms.len())
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding: binding as u32,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        })
        .collect();

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(desc.label),
        entries: &layout_entries,
    });

    let uniforms: Vec<UniformSlot> = desc
        .uniforms
        .iter()
        .map(|decl| UniformSlot {
            name: decl.name,
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(decl.name),
                size: decl.size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        })
        .collect();

    let bind_entries: Vec<wgpu::BindGroupEntry> = uniforms
        .iter()
        .enumerate()
        .map(|(binding, slot)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: slot.buffer.as_entire_binding(),
        })
        .collect();

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(desc.label),
        layout: &bind_group_layout,
        entries: &bind_entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex.module,
            entry_point: Some(ShaderStage::Vertex.entry_point()),
            buffers: desc.vertex_layouts,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment.module,
            entry_point: Some(ShaderStage::Fragment.entry_point()),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        let diagnostic = ShaderDiagnostic {
            source: DiagnosticSource::Link,
            log: error.to_string(),
        };
        log::error!("{diagnostic}");
        diagnostics.push(diagnostic);
    }

    // vertex.module and fragment.module drop here; the pipeline keeps what it needs
    log::debug!(
        "program '{}' built with {} uniform(s), {} diagnostic(s)",
        desc.label,
        uniforms.len(),
        diagnostics.len()
    );

    ShaderProgram {
        pipeline,
        bind_group,
        uniforms,
        diagnostics,
    }
}

use eframe::{egui, egui_wgpu, wgpu};
use encase::{ShaderSize, ShaderType, internal::WriteInto};

#[derive(ShaderType, Clone, Copy, Debug)]
pub struct GpuCamera {
    pub position: cgmath::Vector2<f32>,
    pub vertical_height: f32,
    pub aspect: f32,
}

impl GpuCamera {
    /// Camera that maps `width` x `height` pixels, y down, onto the whole viewport.
    pub fn pixels(width: f32, height: f32) -> Self {
        Self {
            position: cgmath::Vector2 {
                x: width * 0.5,
                y: height * 0.5,
            },
            vertical_height: height,
            aspect: width / height,
        }
    }
}

#[derive(ShaderType, Clone, Copy, Debug)]
pub struct GpuQuad {
    pub position: cgmath::Vector3<f32>,
    pub rotation: f32,
    pub color: cgmath::Vector3<f32>,
    pub size: cgmath::Vector2<f32>,
}

#[derive(ShaderType, Clone, Copy, Debug)]
pub struct GpuCircle {
    pub position: cgmath::Vector3<f32>,
    pub color: cgmath::Vector3<f32>,
    pub radius: f32,
}

/// Storage buffer of instances plus the bind group that exposes it.
struct InstanceBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl InstanceBuffer {
    fn new<T: ShaderSize>(device: &wgpu::Device, label: &'static str) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: Some(T::SHADER_SIZE),
                },
                count: None,
            }],
        });
        let buffer = Self::create_buffer(device, label, T::SHADER_SIZE.get());
        let bind_group = Self::create_bind_group(device, label, &layout, &buffer);
        Self {
            label,
            buffer,
            layout,
            bind_group,
        }
    }

    fn create_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    /// Uploads `instances`, growing the buffer when it is too small.
    fn upload<T>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &Vec<T>)
    where
        T: ShaderType + ShaderSize + WriteInto,
    {
        let size = instances.size();
        if size.get() > self.buffer.size() {
            self.buffer = Self::create_buffer(device, self.label, size.get());
            self.bind_group =
                Self::create_bind_group(device, self.label, &self.layout, &self.buffer);
        }

        let Some(mut view) = queue.write_buffer_with(&self.buffer, 0, size) else {
            log::warn!("could not map {} for writing", self.label);
            return;
        };
        if let Err(err) = encase::StorageBuffer::new(&mut *view).write(instances) {
            log::error!("failed to encode {}: {err}", self.label);
        }
    }
}

pub struct RenderState {
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    quads: InstanceBuffer,
    quad_render_pipeline: wgpu::RenderPipeline,

    circles: InstanceBuffer,
    circle_render_pipeline: wgpu::RenderPipeline,
}

impl RenderState {
    pub fn new(
        target_format: wgpu::TextureFormat,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
    ) -> Self {
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: GpuCamera::SHADER_SIZE.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(GpuCamera::SHADER_SIZE),
                    },
                    count: None,
                }],
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let quads = InstanceBuffer::new::<GpuQuad>(device, "Quads");
        let quad_shader = device.create_shader_module(wgpu::include_wgsl!("./quad_shader.wgsl"));
        let quad_render_pipeline = instanced_pipeline(
            device,
            "Quad Render Pipeline",
            &quad_shader,
            &[&camera_bind_group_layout, &quads.layout],
            target_format,
        );

        let circles = InstanceBuffer::new::<GpuCircle>(device, "Circles");
        let circle_shader =
            device.create_shader_module(wgpu::include_wgsl!("./circle_shader.wgsl"));
        let circle_render_pipeline = instanced_pipeline(
            device,
            "Circle Render Pipeline",
            &circle_shader,
            &[&camera_bind_group_layout, &circles.layout],
            target_format,
        );

        Self {
            camera_buffer,
            camera_bind_group,

            quads,
            quad_render_pipeline,

            circles,
            circle_render_pipeline,
        }
    }
}

/// Triangle strip pipeline that draws one 4-vertex quad per instance.
fn instanced_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vertex"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth24Plus,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fragment"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    })
}

/// One frame's worth of primitives, handed to egui as a paint callback.
pub struct RenderData {
    pub camera: GpuCamera,
    pub quads: Vec<GpuQuad>,
    pub circles: Vec<GpuCircle>,
}

impl egui_wgpu::CallbackTrait for RenderData {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _egui_encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(state) = callback_resources.get_mut::<RenderState>() else {
            log::error!("render state missing from callback resources");
            return vec![];
        };

        match queue.write_buffer_with(&state.camera_buffer, 0, GpuCamera::SHADER_SIZE) {
            Some(mut camera_buffer) => {
                if let Err(err) = encase::UniformBuffer::new(&mut *camera_buffer).write(&self.camera)
                {
                    log::error!("failed to encode camera: {err}");
                }
            }
            None => log::warn!("could not map camera buffer for writing"),
        }

        state.quads.upload(device, queue, &self.quads);
        state.circles.upload(device, queue, &self.circles);

        vec![]
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        callback_resources: &egui_wgpu::CallbackResources,
    ) {
        let Some(state) = callback_resources.get::<RenderState>() else {
            return;
        };

        if !self.quads.is_empty() {
            render_pass.set_pipeline(&state.quad_render_pipeline);
            render_pass.set_bind_group(0, &state.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &state.quads.bind_group, &[]);
            render_pass.draw(0..4, 0..self.quads.len() as _);
        }

        if !self.circles.is_empty() {
            render_pass.set_pipeline(&state.circle_render_pipeline);
            render_pass.set_bind_group(0, &state.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &state.circles.bind_group, &[]);
            render_pass.draw(0..4, 0..self.circles.len() as _);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_camera_is_centered() {
        let camera = GpuCamera::pixels(800.0, 600.0);
        assert_eq!((camera.position.x, camera.position.y), (400.0, 300.0));
        assert_eq!(camera.vertical_height, 600.0);
        assert!((camera.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn instance_layouts_match_the_shaders() {
        // vec3 members are 16 byte aligned in WGSL storage buffers
        assert_eq!(GpuCircle::SHADER_SIZE.get(), 32);
        assert_eq!(GpuQuad::SHADER_SIZE.get(), 48);
        assert_eq!(GpuCamera::SHADER_SIZE.get(), 16);
    }
}

//! Shared GPU types and helpers used by every stage.

use std::marker::PhantomData;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

// ── per-draw uniform ──────────────────────────────────────────────────────

/// Per-entity payload for the diffuse and shadow passes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniform {
    pub mvp: [[f32; 4]; 4],
    /// xyz: light direction in entity-local space.
    pub light: [f32; 4],
}

impl ObjectUniform {
    pub fn new(view_proj: Mat4, world: Mat4, local_light: Vec3) -> Self {
        Self {
            mvp: (view_proj * world).to_cols_array_2d(),
            light: local_light.extend(0.0).to_array(),
        }
    }
}

/// Binding size of a uniform struct. Uniform structs here are never empty.
pub(super) fn binding_size<T>() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

pub(super) fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// One uniform buffer holding many `T`s at aligned offsets, bound with a
/// dynamic offset per draw.
pub struct DynamicUniform<T> {
    label: &'static str,
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: u32,
    len: u32,
    _marker: PhantomData<T>,
}

impl<T: Pod> DynamicUniform<T> {
    pub fn new(device: &wgpu::Device, label: &'static str, visibility: wgpu::ShaderStages) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(std::mem::size_of::<T>() as u32, alignment);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: binding_size::<T>(),
                },
                count: None,
            }],
        });

        let (buffer, bind_group) = Self::allocate(device, label, &layout, stride, 1);

        Self {
            label,
            layout,
            buffer,
            bind_group,
            stride,
            capacity: 1,
            len: 0,
            _marker: PhantomData,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        stride: u32,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: binding_size::<T>(),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Replaces the contents with `items`, growing the buffer if needed.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, items: &[T]) {
        let required = items.len() as u32;
        if required > self.capacity {
            let mut capacity = self.capacity.max(1);
            while capacity < required {
                capacity = capacity.saturating_mul(2);
            }
            let (buffer, bind_group) =
                Self::allocate(device, self.label, &self.layout, self.stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
            log::debug!("{} grown to {capacity} slot(s)", self.label);
        }

        self.len = required;
        if items.is_empty() {
            return;
        }

        let stride = self.stride as usize;
        let size = std::mem::size_of::<T>();
        let mut bytes = vec![0u8; stride * items.len()];
        for (i, item) in items.iter().enumerate() {
            bytes[i * stride..i * stride + size].copy_from_slice(bytemuck::bytes_of(item));
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Dynamic offset of item `index`.
    pub fn offset(&self, index: usize) -> u32 {
        index as u32 * self.stride
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ── full-screen passes ────────────────────────────────────────────────────

/// Fragment-visible 2D texture binding.
pub(super) fn texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(super) fn linear_clamp_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Vertices of the single triangle covering the viewport (no vertex buffer).
pub(super) const FULLSCREEN_VERTICES: std::ops::Range<u32> = 0..3;

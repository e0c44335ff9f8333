//! Render target multiplexer: a fixed number of color slots sharing one
//! depth/stencil buffer.
//!
//! Each filled slot is a (writable target, readable view) pair over a single
//! texture. Slots are filled in order, at most once, and never resized.

use crate::config::RenderSettings;

use super::Color;

// ── backend seam ──────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Color(wgpu::TextureFormat),
    DepthStencil(wgpu::TextureFormat),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetDesc {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub kind: TargetKind,
}

/// One clear, naming exactly what it resets.
#[derive(Debug)]
pub enum ClearOp<'a, T> {
    Color {
        target: &'a T,
        color: Color,
    },
    /// `None` leaves that aspect untouched.
    DepthStencil {
        target: &'a T,
        depth: Option<f32>,
        stencil: Option<u32>,
    },
}

/// Allocation and clearing primitives a [`RenderTargetSet`] is built on.
///
/// Implemented for `wgpu::Device`; tests use an in-memory backend.
pub trait TargetBackend {
    type Texture;
    type Target;
    type View;
    type Encoder;

    fn create_texture(&self, desc: &TargetDesc) -> Self::Texture;
    fn create_target(&self, texture: &Self::Texture) -> Self::Target;
    fn create_view(&self, texture: &Self::Texture) -> Self::View;
    fn clear(&self, encoder: &mut Self::Encoder, op: ClearOp<'_, Self::Target>);
}

// ── set ───────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetSetDesc {
    pub width: u32,
    pub height: u32,
    pub slots: usize,
    pub color_format: wgpu::TextureFormat,
    pub depth_stencil_format: wgpu::TextureFormat,
}

impl TargetSetDesc {
    pub fn new(width: u32, height: u32, slots: usize) -> Self {
        Self {
            width,
            height,
            slots,
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            depth_stencil_format: wgpu::TextureFormat::Depth24PlusStencil8,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            width: settings.target_width,
            height: settings.target_height,
            slots: settings.target_slots,
            color_format: settings.color_format,
            depth_stencil_format: settings.depth_stencil_format,
        }
    }
}

/// Which attachments a pass binds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TargetBinding {
    /// Every filled color slot plus depth/stencil.
    All,
    /// One color slot plus depth/stencil.
    Slot(usize),
    /// Depth/stencil only, no color.
    DepthStencil,
}

/// Attachments resolved from a [`TargetBinding`].
#[derive(Debug)]
pub struct BoundTargets<'a, T> {
    pub colors: Vec<&'a T>,
    pub depth_stencil: &'a T,
}

struct ColorSlot<B: TargetBackend> {
    _texture: B::Texture,
    target: B::Target,
    view: B::View,
}

struct DepthStencil<B: TargetBackend> {
    _texture: B::Texture,
    target: B::Target,
}

pub struct RenderTargetSet<B: TargetBackend> {
    desc: TargetSetDesc,
    depth_stencil: DepthStencil<B>,
    slots: Vec<ColorSlot<B>>,
}

impl<B: TargetBackend> RenderTargetSet<B> {
    /// Allocates the depth/stencil buffer now; color slots wait for [`fill`](Self::fill).
    pub fn new(backend: &B, desc: TargetSetDesc) -> Self {
        let texture = backend.create_texture(&TargetDesc {
            label: "umbra depth/stencil",
            width: desc.width,
            height: desc.height,
            kind: TargetKind::DepthStencil(desc.depth_stencil_format),
        });
        let target = backend.create_target(&texture);

        log::debug!(
            "target set {}x{} with {} slot(s)",
            desc.width,
            desc.height,
            desc.slots
        );

        Self {
            desc,
            depth_stencil: DepthStencil {
                _texture: texture,
                target,
            },
            slots: Vec::with_capacity(desc.slots),
        }
    }

    /// Allocates the next color slot and returns its index.
    ///
    /// Once every slot is filled this does nothing and returns `None`.
    pub fn fill(&mut self, backend: &B) -> Option<usize> {
        if self.is_full() {
            return None;
        }

        let index = self.slots.len();
        let texture = backend.create_texture(&TargetDesc {
            label: "umbra color slot",
            width: self.desc.width,
            height: self.desc.height,
            kind: TargetKind::Color(self.desc.color_format),
        });
        let target = backend.create_target(&texture);
        let view = backend.create_view(&texture);

        self.slots.push(ColorSlot {
            _texture: texture,
            target,
            view,
        });
        Some(index)
    }

    /// Fills every remaining slot.
    pub fn fill_all(&mut self, backend: &B) {
        while self.fill(backend).is_some() {}
    }

    pub fn desc(&self) -> &TargetSetDesc {
        &self.desc
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn capacity(&self) -> usize {
        self.desc.slots
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.desc.slots
    }

    pub fn target(&self, slot: usize) -> Option<&B::Target> {
        self.slots.get(slot).map(|s| &s.target)
    }

    pub fn view(&self, slot: usize) -> Option<&B::View> {
        self.slots.get(slot).map(|s| &s.view)
    }

    pub fn depth_stencil(&self) -> &B::Target {
        &self.depth_stencil.target
    }

    /// Resolves a binding; `None` if it names an unfilled slot.
    pub fn bind(&self, binding: TargetBinding) -> Option<BoundTargets<'_, B::Target>> {
        let colors = match binding {
            TargetBinding::All => self.slots.iter().map(|s| &s.target).collect(),
            TargetBinding::Slot(i) => vec![self.target(i)?],
            TargetBinding::DepthStencil => Vec::new(),
        };
        Some(BoundTargets {
            colors,
            depth_stencil: &self.depth_stencil.target,
        })
    }

    // ── clears ────────────────────────────────────────────────────────────

    pub fn clear_depth(&self, backend: &B, encoder: &mut B::Encoder, depth: f32) {
        self.clear_ds(backend, encoder, Some(depth), None);
    }

    pub fn clear_stencil(&self, backend: &B, encoder: &mut B::Encoder, stencil: u32) {
        self.clear_ds(backend, encoder, None, Some(stencil));
    }

    pub fn clear_depth_stencil(
        &self,
        backend: &B,
        encoder: &mut B::Encoder,
        depth: f32,
        stencil: u32,
    ) {
        self.clear_ds(backend, encoder, Some(depth), Some(stencil));
    }

    /// Clears one slot. Returns `false` if the slot is not filled.
    pub fn clear_color(
        &self,
        backend: &B,
        encoder: &mut B::Encoder,
        slot: usize,
        color: Color,
    ) -> bool {
        let Some(target) = self.target(slot) else {
            return false;
        };
        backend.clear(encoder, ClearOp::Color { target, color });
        true
    }

    /// Clears every filled slot to `color`.
    pub fn clear_colors(&self, backend: &B, encoder: &mut B::Encoder, color: Color) {
        for slot in &self.slots {
            backend.clear(
                encoder,
                ClearOp::Color {
                    target: &slot.target,
                    color,
                },
            );
        }
    }

    pub fn clear_all(
        &self,
        backend: &B,
        encoder: &mut B::Encoder,
        color: Color,
        depth: f32,
        stencil: u32,
    ) {
        self.clear_depth_stencil(backend, encoder, depth, stencil);
        self.clear_colors(backend, encoder, color);
    }

    fn clear_ds(
        &self,
        backend: &B,
        encoder: &mut B::Encoder,
        depth: Option<f32>,
        stencil: Option<u32>,
    ) {
        backend.clear(
            encoder,
            ClearOp::DepthStencil {
                target: &self.depth_stencil.target,
                depth,
                stencil,
            },
        );
    }
}

// ── wgpu backend ──────────────────────────────────────────────────────────

/// Keeps an attachment's contents across a pass. Generic over the clear
/// value: `Color` for color, `f32` for depth, `u32` for stencil.
fn load_and_store<V>() -> wgpu::Operations<V> {
    wgpu::Operations {
        load: wgpu::LoadOp::Load,
        store: wgpu::StoreOp::Store,
    }
}

impl TargetBackend for wgpu::Device {
    type Texture = wgpu::Texture;
    type Target = wgpu::TextureView;
    type View = wgpu::TextureView;
    type Encoder = wgpu::CommandEncoder;

    fn create_texture(&self, desc: &TargetDesc) -> wgpu::Texture {
        let (format, usage) = match desc.kind {
            TargetKind::Color(format) => (
                format,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            ),
            TargetKind::DepthStencil(format) => {
                (format, wgpu::TextureUsages::RENDER_ATTACHMENT)
            }
        };

        wgpu::Device::create_texture(
            self,
            &wgpu::TextureDescriptor {
                label: Some(desc.label),
                size: wgpu::Extent3d {
                    width: desc.width.max(1),
                    height: desc.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            },
        )
    }

    fn create_target(&self, texture: &wgpu::Texture) -> wgpu::TextureView {
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("umbra target"),
            ..Default::default()
        })
    }

    fn create_view(&self, texture: &wgpu::Texture) -> wgpu::TextureView {
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("umbra view"),
            ..Default::default()
        })
    }

    fn clear(&self, encoder: &mut wgpu::CommandEncoder, op: ClearOp<'_, wgpu::TextureView>) {
        match op {
            ClearOp::Color { target, color } => {
                let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("umbra clear color"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(color.into()),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
            }
            ClearOp::DepthStencil {
                target,
                depth,
                stencil,
            } => {
                let depth_load = depth.map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear);
                let stencil_load = stencil.map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear);

                let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("umbra clear depth/stencil"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: target,
                        depth_ops: Some(wgpu::Operations {
                            load: depth_load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: Some(wgpu::Operations {
                            load: stencil_load,
                            store: wgpu::StoreOp::Store,
                        }),
                    }),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
            }
        }
    }
}

impl RenderTargetSet<wgpu::Device> {
    /// Begins a pass over `binding`, loading and storing every attachment.
    ///
    /// Returns `None` if the binding names an unfilled slot.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        label: &str,
        binding: TargetBinding,
    ) -> Option<wgpu::RenderPass<'e>> {
        let bound = self.bind(binding)?;

        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment<'_>>> = bound
            .colors
            .into_iter()
            .map(|view| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: load_and_store(),
                    depth_slice: None,
                })
            })
            .collect();

        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: bound.depth_stencil,
                depth_ops: Some(load_and_store()),
                stencil_ops: Some(load_and_store()),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        Some(pass)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct Handle(u32);

    #[derive(Debug, Copy, Clone, PartialEq)]
    enum Cleared {
        Color(u32, Color),
        Depth(u32, f32),
        Stencil(u32, u32),
    }

    #[derive(Default)]
    struct FakeBackend {
        next: Cell<u32>,
        created: RefCell<Vec<TargetDesc>>,
    }

    impl TargetBackend for FakeBackend {
        type Texture = u32;
        type Target = Handle;
        type View = Handle;
        type Encoder = Vec<Cleared>;

        fn create_texture(&self, desc: &TargetDesc) -> u32 {
            self.created.borrow_mut().push(*desc);
            let id = self.next.get();
            self.next.set(id + 1);
            id
        }

        fn create_target(&self, texture: &u32) -> Handle {
            Handle(*texture)
        }

        fn create_view(&self, texture: &u32) -> Handle {
            Handle(*texture)
        }

        fn clear(&self, encoder: &mut Vec<Cleared>, op: ClearOp<'_, Handle>) {
            match op {
                ClearOp::Color { target, color } => encoder.push(Cleared::Color(target.0, color)),
                ClearOp::DepthStencil {
                    target,
                    depth,
                    stencil,
                } => {
                    if let Some(d) = depth {
                        encoder.push(Cleared::Depth(target.0, d));
                    }
                    if let Some(s) = stencil {
                        encoder.push(Cleared::Stencil(target.0, s));
                    }
                }
            }
        }
    }

    fn hd_set(backend: &FakeBackend) -> RenderTargetSet<FakeBackend> {
        RenderTargetSet::new(backend, TargetSetDesc::new(1920, 1080, 2))
    }

    // ── allocation ────────────────────────────────────────────────────────

    #[test]
    fn depth_stencil_allocated_up_front_colors_are_not() {
        let backend = FakeBackend::default();
        let set = hd_set(&backend);

        let created = backend.created.borrow();
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0].kind,
            TargetKind::DepthStencil(wgpu::TextureFormat::Depth24PlusStencil8)
        );
        assert_eq!((created[0].width, created[0].height), (1920, 1080));
        assert!(set.is_empty());
        assert!(set.target(0).is_none());
    }

    #[test]
    fn fill_stops_at_capacity() {
        let backend = FakeBackend::default();
        let mut set = RenderTargetSet::new(&backend, TargetSetDesc::new(64, 32, 3));

        assert_eq!(set.fill(&backend), Some(0));
        assert_eq!(set.fill(&backend), Some(1));
        assert_eq!(set.fill(&backend), Some(2));
        assert!(set.is_full());

        assert_eq!(set.fill(&backend), None);
        assert_eq!(set.len(), 3);
        // 1 depth/stencil + 3 color, nothing for the rejected fill.
        assert_eq!(backend.created.borrow().len(), 4);
    }

    #[test]
    fn each_pair_shares_one_texture() {
        let backend = FakeBackend::default();
        let mut set = hd_set(&backend);
        set.fill_all(&backend);

        for slot in 0..set.capacity() {
            let target = set.target(slot).copied();
            let view = set.view(slot).copied();
            assert!(target.is_some());
            assert_eq!(target, view);
        }
        assert_ne!(set.target(0), set.target(1));
        assert_ne!(set.target(0), Some(set.depth_stencil()));
    }

    #[test]
    fn zero_capacity_never_fills() {
        let backend = FakeBackend::default();
        let mut set = RenderTargetSet::new(&backend, TargetSetDesc::new(8, 8, 0));
        assert!(set.is_full());
        assert_eq!(set.fill(&backend), None);
    }

    // ── clears ────────────────────────────────────────────────────────────

    #[test]
    fn single_slot_and_depth_clears_touch_only_what_they_name() {
        let backend = FakeBackend::default();
        let mut set = hd_set(&backend);
        let ds = set.depth_stencil().0;

        assert_eq!(set.fill(&backend), Some(0));
        assert_eq!(set.len(), 1);
        let slot0 = set.target(0).map(|h| h.0);

        let mut enc = Vec::new();
        assert!(set.clear_color(&backend, &mut enc, 0, Color::BLACK));
        assert_eq!(enc.len(), 1);
        assert_eq!(Some(enc[0]), slot0.map(|t| Cleared::Color(t, Color::BLACK)));

        let mut enc = Vec::new();
        set.clear_depth(&backend, &mut enc, 1.0);
        assert_eq!(enc, vec![Cleared::Depth(ds, 1.0)]);
    }

    #[test]
    fn clearing_unfilled_slot_does_nothing() {
        let backend = FakeBackend::default();
        let mut set = hd_set(&backend);
        set.fill(&backend);

        let mut enc = Vec::new();
        assert!(!set.clear_color(&backend, &mut enc, 1, Color::WHITE));
        assert!(enc.is_empty());
    }

    #[test]
    fn stencil_clear_leaves_depth() {
        let backend = FakeBackend::default();
        let set = hd_set(&backend);
        let ds = set.depth_stencil().0;

        let mut enc = Vec::new();
        set.clear_stencil(&backend, &mut enc, 0);
        assert_eq!(enc, vec![Cleared::Stencil(ds, 0)]);
    }

    #[test]
    fn clear_all_covers_every_attachment() {
        let backend = FakeBackend::default();
        let mut set = hd_set(&backend);
        set.fill_all(&backend);

        let mut enc = Vec::new();
        set.clear_all(&backend, &mut enc, Color::gray(0.2), 1.0, 0);

        let ds = set.depth_stencil().0;
        assert!(enc.contains(&Cleared::Depth(ds, 1.0)));
        assert!(enc.contains(&Cleared::Stencil(ds, 0)));
        let colors = enc
            .iter()
            .filter(|c| matches!(c, Cleared::Color(_, col) if *col == Color::gray(0.2)))
            .count();
        assert_eq!(colors, 2);
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn bindings_resolve_expected_attachments() {
        let backend = FakeBackend::default();
        let mut set = hd_set(&backend);
        set.fill(&backend);

        let all = set.bind(TargetBinding::All);
        assert_eq!(all.map(|b| b.colors.len()), Some(1));

        let slot = set.bind(TargetBinding::Slot(0));
        assert_eq!(slot.map(|b| b.colors.len()), Some(1));

        assert!(set.bind(TargetBinding::Slot(1)).is_none());

        let ds = set.bind(TargetBinding::DepthStencil);
        assert!(ds.is_some_and(|b| b.colors.is_empty()));
    }

    #[test]
    fn passes_load_and_store_every_attachment_kind() {
        let color: wgpu::Operations<wgpu::Color> = load_and_store();
        let depth: wgpu::Operations<f32> = load_and_store();
        let stencil: wgpu::Operations<u32> = load_and_store();

        assert!(matches!(color.load, wgpu::LoadOp::Load));
        assert!(matches!(depth.load, wgpu::LoadOp::Load));
        assert!(matches!(stencil.load, wgpu::LoadOp::Load));
        assert!(matches!(
            (color.store, depth.store, stencil.store),
            (wgpu::StoreOp::Store, wgpu::StoreOp::Store, wgpu::StoreOp::Store)
        ));
    }
}

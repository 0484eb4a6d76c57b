//! GPU side of the scene.
//!
//! [`Renderer`] owns the [`Context`], the uploaded swatch textures and a GPU
//! mirror of the renderable object. It implements [`DrawTarget`], so the
//! render loop only ever talks to it through that trait.
//!
//! # Key types
//!
//! - [`GpuObject`] holds vertex/index buffers and one material per mesh node
//! - [`TextureCache`] maps image asset names to uploaded textures, with a white fallback

use std::{collections::HashMap, iter, sync::Arc};

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::CameraState,
    config::ViewerConfig,
    context::Context,
    data_structures::{
        model::{MaterialAssignment, MeshNode, RenderableObject},
        texture::Texture,
    },
    error::DrawFailure,
    flow::DrawTarget,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    color: [f32; 4],
}

impl From<&MaterialAssignment> for MaterialUniform {
    fn from(material: &MaterialAssignment) -> Self {
        let [r, g, b] = material
            .base_color
            .map(|c| c.to_linear())
            .unwrap_or([1.0, 1.0, 1.0]);
        Self {
            color: [r, g, b, 1.0],
        }
    }
}

/// Uploaded images keyed by asset name.
#[derive(Debug)]
pub struct TextureCache {
    white: Texture,
    textures: HashMap<String, Texture>,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            white: Texture::create_solid([255, 255, 255, 255], device, queue, "white"),
            textures: HashMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        image: &image::DynamicImage,
    ) -> anyhow::Result<()> {
        let texture = Texture::from_image(device, queue, image, Some(name))?;
        self.textures.insert(name.to_string(), texture);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// The texture for `name`, or plain white if there is none (or it failed to load).
    pub fn get(&self, name: Option<&str>) -> &Texture {
        match name {
            Some(name) => self.textures.get(name).unwrap_or_else(|| {
                log::debug!("No texture uploaded for {name}, using white");
                &self.white
            }),
            None => &self.white,
        }
    }
}

#[derive(Debug)]
pub struct GpuMaterial {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn new(ctx: &Context, material: &MaterialAssignment, textures: &TextureCache) -> Self {
        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[MaterialUniform::from(material)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let texture = textures.get(material.texture.as_deref());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &ctx.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some("material_bind_group"),
        });
        Self { buffer, bind_group }
    }
}

#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: GpuMaterial,
}

impl GpuMesh {
    fn new(ctx: &Context, mesh: &MeshNode, textures: &TextureCache) -> Self {
        let vertices = mesh.geometry.vertices();
        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_elements: mesh.geometry.indices.len() as u32,
            material: GpuMaterial::new(ctx, mesh.material(), textures),
        }
    }
}

/// GPU mirror of a [`RenderableObject`].
#[derive(Debug)]
pub struct GpuObject {
    pub meshes: Vec<GpuMesh>,
    // `None` forces the next sync to rebuild every material.
    generation: Option<u64>,
}

impl GpuObject {
    pub fn new(ctx: &Context, object: &RenderableObject, textures: &TextureCache) -> Self {
        let meshes = object
            .meshes()
            .into_iter()
            .map(|mesh| GpuMesh::new(ctx, mesh, textures))
            .collect();
        Self {
            meshes,
            generation: Some(object.generation()),
        }
    }

    /// Rebuild all materials if the object was resolved since the last sync.
    pub fn sync(&mut self, ctx: &Context, object: &RenderableObject, textures: &TextureCache) {
        if self.generation == Some(object.generation()) {
            return;
        }
        for (gpu_mesh, mesh) in self.meshes.iter_mut().zip(object.meshes()) {
            gpu_mesh.material = GpuMaterial::new(ctx, mesh.material(), textures);
        }
        self.generation = Some(object.generation());
    }

    pub fn invalidate(&mut self) {
        self.generation = None;
    }
}

/// The window-backed draw target.
#[derive(Debug)]
pub struct Renderer {
    pub ctx: Context,
    pub textures: TextureCache,
    gpu_object: Option<GpuObject>,
    is_surface_configured: bool,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: &ViewerConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let textures = TextureCache::new(&ctx.device, &ctx.queue);
        let mut renderer = Self {
            ctx,
            textures,
            gpu_object: None,
            is_surface_configured: false,
        };
        let size = renderer.ctx.window.inner_size();
        renderer.resize(size.width, size.height);
        Ok(renderer)
    }

    pub fn window(&self) -> &Window {
        &self.ctx.window
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    /// Upload a decoded image. Materials are rebuilt on the next frame so the
    /// new texture replaces the white fallback.
    pub fn upload_image(&mut self, name: &str, image: &image::DynamicImage) {
        match self
            .textures
            .insert(&self.ctx.device, &self.ctx.queue, name, image)
        {
            Ok(()) => {
                if let Some(gpu) = self.gpu_object.as_mut() {
                    gpu.invalidate();
                }
            }
            Err(e) => log::warn!("Could not upload image {name}: {e:#}"),
        }
    }

    fn sync_object(&mut self, object: &RenderableObject) {
        if self.gpu_object.is_none() {
            self.gpu_object = Some(GpuObject::new(&self.ctx, object, &self.textures));
        } else if let Some(gpu) = self.gpu_object.as_mut() {
            gpu.sync(&self.ctx, object, &self.textures);
        }
    }
}

impl DrawTarget for Renderer {
    fn set_clear_colour(&mut self, colour: wgpu::Color) {
        self.ctx.clear_colour = colour;
    }

    fn draw(&mut self, object: Option<&RenderableObject>, camera: &CameraState) -> Result<(), DrawFailure> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.ctx
            .camera
            .uniform
            .update_view_proj(camera, &self.ctx.projection);
        self.ctx.queue.write_buffer(
            &self.ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.ctx.camera.uniform]),
        );
        if let Some(object) = object {
            self.sync_object(object);
        }

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window.inner_size();
                self.resize(size.width, size.height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // An object that is not attached yet leaves only the background.
            if let (Some(_), Some(gpu)) = (object, &self.gpu_object) {
                render_pass.set_pipeline(&self.ctx.pipeline);
                render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
                for mesh in &gpu.meshes {
                    render_pass.set_bind_group(1, &mesh.material.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
                }
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

//! Render loop and application event loop.
//!
//! [`RenderLoop::cycle`] is one frame of the viewer. It is driven by winit's
//! `RedrawRequested` and requests the next redraw only after it returns, so
//! frames never overlap and follow the display's refresh cadence.
//!
//! # Lifecycle Flow
//!
//! Each frame:
//! 1. Resolve the appearance if the user changed it since the last frame
//! 2. Advance the orbit camera
//! 3. Re-assert the background clear colour on the draw target
//! 4. Draw the scene (only the background while the object is not attached)
//!
//! The asset load runs once, in the background, and is posted back to the
//! event loop as a [`ViewerEvent`]. Frames keep coming while it is pending and
//! after it failed.

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    appearance::{Resolution, TextureCatalog},
    camera::{CameraControl, CameraState, OrbitController},
    config::ViewerConfig,
    data_structures::model::{RenderableObject, Rgb},
    error::{DrawFailure, LoadError},
    render::Renderer,
    resources::{AssetLoader, AssetStore, texture::load_images},
    scene::SceneState,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Whatever the render loop draws into.
pub trait DrawTarget {
    fn set_clear_colour(&mut self, colour: wgpu::Color);

    /// Submit one frame. `object` is `None` until the asset load succeeded.
    fn draw(&mut self, object: Option<&RenderableObject>, camera: &CameraState) -> Result<(), DrawFailure>;
}

/// The per-frame cycle. Stops for good after the first draw failure.
#[derive(Debug)]
pub struct RenderLoop {
    clear_colour: wgpu::Color,
    frames: u64,
    running: bool,
}

impl RenderLoop {
    pub fn new(clear_colour: wgpu::Color) -> Self {
        Self {
            clear_colour,
            frames: 0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames drawn successfully so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cycle<C, T>(
        &mut self,
        state: &mut SceneState,
        catalog: &TextureCatalog,
        controls: &mut C,
        dt: Duration,
        target: &mut T,
    ) -> Result<(), DrawFailure>
    where
        C: CameraControl + ?Sized,
        T: DrawTarget + ?Sized,
    {
        if !self.running {
            return Err(DrawFailure::Terminated);
        }

        if state.take_appearance_change() {
            match state.resolve_appearance(catalog) {
                Resolution::Applied { meshes } => {
                    log::debug!("Appearance {:?} applied to {meshes} meshes", state.selection())
                }
                Resolution::Skipped => log::debug!("Appearance change waits for the object"),
            }
        }

        controls.update(state.camera_mut(), dt);

        // Anything holding the target may have changed the clear colour.
        target.set_clear_colour(self.clear_colour);

        match target.draw(state.object(), state.camera()) {
            Ok(()) => {
                self.frames += 1;
                Ok(())
            }
            Err(e) => {
                self.running = false;
                log::error!("Draw failed, stopping the render loop: {e}");
                Err(e)
            }
        }
    }
}

/// User intents an embedding presentation layer can send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerCommand {
    SetColor(Rgb),
    SetTexture(String),
    TogglePanel,
    ToggleColorPicker,
}

pub fn apply_command(state: &mut SceneState, command: ViewerCommand) {
    match command {
        ViewerCommand::SetColor(color) => state.set_appearance_color(color),
        ViewerCommand::SetTexture(id) => state.set_appearance_texture(id),
        ViewerCommand::TogglePanel => state.toggle_auxiliary_panel(),
        ViewerCommand::ToggleColorPicker => state.toggle_color_picker(),
    }
}

pub(crate) enum ViewerEvent {
    #[allow(dead_code)]
    Initialized(Box<Renderer>),
    Loaded {
        object: Result<RenderableObject, LoadError>,
        images: Vec<(String, anyhow::Result<image::DynamicImage>)>,
    },
    Command(ViewerCommand),
}

/// Sends commands into a running viewer from any thread.
#[derive(Clone)]
pub struct ViewerHandle {
    proxy: EventLoopProxy<ViewerEvent>,
}

impl ViewerHandle {
    pub fn send(&self, command: ViewerCommand) -> anyhow::Result<()> {
        self.proxy
            .send_event(ViewerEvent::Command(command))
            .map_err(|_| anyhow::anyhow!("the viewer has shut down"))
    }
}

async fn load_assets<S: AssetStore>(store: S, config: ViewerConfig) -> ViewerEvent {
    let mut loader = AssetLoader::new(store);
    let object = loader.load(&config.geometry, &config.materials).await;
    let images = load_images(loader.store(), config.image_sources()).await;
    ViewerEvent::Loaded { object, images }
}

struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    scene: SceneState,
    controller: OrbitController,
    render_loop: RenderLoop,
    renderer: Option<Renderer>,
    // Images that arrived before the GPU was ready.
    pending_images: Vec<(String, image::DynamicImage)>,
    load_started: bool,
    last_time: Instant,
    palette_index: usize,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            scene: SceneState::from_config(&config),
            controller: OrbitController::from_config(&config.camera),
            render_loop: RenderLoop::new(config.clear_colour.to_wgpu()),
            config,
            renderer: None,
            pending_images: Vec::new(),
            load_started: false,
            last_time: Instant::now(),
            palette_index: 0,
        })
    }

    fn start_loading(&mut self) {
        if self.load_started {
            return;
        }
        self.load_started = true;
        let proxy = self.proxy.clone();
        let config = self.config.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let store = crate::resources::FileStore::new(config.assets_root.clone());
            self.async_runtime.spawn(async move {
                let event = load_assets(store, config).await;
                if proxy.send_event(event).is_err() {
                    log::warn!("Event loop closed before the assets finished loading");
                }
            });
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let event = load_assets(crate::resources::HttpStore, config).await;
                if proxy.send_event(event).is_err() {
                    log::warn!("Event loop closed before the assets finished loading");
                }
            });
        }
    }

    fn install_renderer(&mut self, renderer: Renderer) {
        let renderer = self.renderer.insert(renderer);
        for (name, image) in self.pending_images.drain(..) {
            renderer.upload_image(&name, &image);
        }
        renderer.window().request_redraw();
    }

    fn command_for_key(&mut self, code: KeyCode) -> Option<ViewerCommand> {
        let swatch = |n: usize| {
            self.config
                .catalog
                .ids()
                .nth(n)
                .map(|id| ViewerCommand::SetTexture(id.to_string()))
        };
        match code {
            KeyCode::Digit1 => swatch(0),
            KeyCode::Digit2 => swatch(1),
            KeyCode::Digit3 => swatch(2),
            KeyCode::Digit4 => swatch(3),
            KeyCode::KeyC if !self.config.palette.is_empty() => {
                self.palette_index = (self.palette_index + 1) % self.config.palette.len();
                Some(ViewerCommand::SetColor(self.config.palette[self.palette_index]))
            }
            KeyCode::KeyP => Some(ViewerCommand::TogglePanel),
            _ => None,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();

        match self.render_loop.cycle(
            &mut self.scene,
            &self.config.catalog,
            &mut self.controller,
            dt,
            &mut *renderer,
        ) {
            // schedule the next cycle only once this one is done
            Ok(()) => renderer.window().request_redraw(),
            Err(e) => {
                log::error!("Unrecoverable draw failure, reload the viewer: {e}");
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.title);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self
                .async_runtime
                .block_on(Renderer::new(window, &self.config))
            {
                Ok(renderer) => self.install_renderer(renderer),
                Err(e) => {
                    log::error!("Could not initialise the renderer: {e:#}");
                    event_loop.exit();
                    return;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match Renderer::new(window, &config).await {
                    Ok(renderer) => {
                        assert!(
                            proxy
                                .send_event(ViewerEvent::Initialized(Box::new(renderer)))
                                .is_ok()
                        );
                    }
                    Err(e) => log::error!("Could not initialise the renderer: {e:#}"),
                }
            });
        }

        self.start_loading();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Initialized(renderer) => self.install_renderer(*renderer),
            ViewerEvent::Loaded { object, images } => {
                for (name, image) in images {
                    match image {
                        Ok(image) => match self.renderer.as_mut() {
                            Some(renderer) => renderer.upload_image(&name, &image),
                            None => self.pending_images.push((name, image)),
                        },
                        Err(e) => log::warn!("Image {name} will render as plain white: {e:#}"),
                    }
                }
                match object {
                    Ok(object) => self.scene.attach(object),
                    Err(e) => log::error!("{e}. The scene will stay empty."),
                }
            }
            ViewerEvent::Command(command) => apply_command(&mut self.scene, command),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        self.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(command) = self.command_for_key(code) {
                    apply_command(&mut self.scene, command);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// A configured viewer that has not started running yet.
pub struct Viewer {
    event_loop: EventLoop<ViewerEvent>,
    app: App,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(e) = env_logger::try_init() {
                println!("Warning: Could not initialize logger: {}", e);
            };
        }

        #[cfg(target_arch = "wasm32")]
        {
            console_log::init_with_level(log::Level::Info)
                .map_err(|e| anyhow::anyhow!("could not initialize logger: {e}"))?;
        }

        let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
        let app = App::new(&event_loop, config)?;
        Ok(Self { event_loop, app })
    }

    pub fn handle(&self) -> ViewerHandle {
        ViewerHandle {
            proxy: self.event_loop.create_proxy(),
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let Viewer { event_loop, mut app } = self;
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    Viewer::new(config)?.run()
}

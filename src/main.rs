//! Beatring — an audio-reactive ring of spectrum bars inside a field of
//! drifting cubes.
//!
//! The window opens on the still scene; Space starts the track and the
//! animation together, Space again pauses both.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use beatring::audio::{AudioEngine, RodioEngine};
use beatring::cli::Args;
use beatring::director::AnimationDirector;
use beatring::params::{self, MotionParams, RenderConfig};
use beatring::rendering::{InstanceRaw, RenderSystem, Uniforms};

const VOLUME_STEP: f32 = 0.05;
const LIGHT_POWER: f32 = 100.0;

/// Main application state
struct App {
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    director: AnimationDirector<RodioEngine>,
    render_config: RenderConfig,
    instance_capacity: usize,
    instances: Vec<InstanceRaw>,
    volume: f32,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let field_params = args.field_params();
        let ring_params = args.ring_params();
        let analyzer_params = args.analyzer_params();
        let render_config = RenderConfig::default();

        params::validate(&ring_params, &analyzer_params).map_err(|e| anyhow!(e))?;

        let mut engine =
            RodioEngine::new(&analyzer_params).context("initializing audio output")?;
        engine.set_loop(!args.no_loop);

        let instance_capacity = field_params.shape_count + ring_params.vertex_count;
        let mut director = AnimationDirector::new(
            engine,
            field_params,
            ring_params,
            MotionParams::default(),
            &analyzer_params,
            &render_config,
            args.rng(),
        );
        director.set_volume(args.volume);
        director
            .load_new_track(&args.track, &args.track_title())
            .with_context(|| format!("loading {}", args.track.display()))?;

        Ok(Self {
            window: None,
            render_system: None,
            director,
            render_config,
            instance_capacity,
            instances: Vec::with_capacity(instance_capacity),
            volume: args.volume.clamp(0.0, 1.0),
        })
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &winit::event_loop::ActiveEventLoop) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => {
                if self.director.is_running() {
                    self.director.pause();
                } else {
                    match self.director.start() {
                        Ok(()) => {
                            if let Some(window) = &self.window {
                                window.request_redraw();
                            }
                        }
                        Err(e) => warn!("cannot start playback: {}", e),
                    }
                }
            }
            KeyCode::ArrowUp => self.nudge_volume(VOLUME_STEP),
            KeyCode::ArrowDown => self.nudge_volume(-VOLUME_STEP),
            _ => {}
        }
    }

    fn nudge_volume(&mut self, delta: f32) {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        self.director.set_volume(self.volume);
        info!("volume {:.2}", self.volume);
    }

    /// Advance the animation (a no-op while paused) and draw the scene
    fn render_frame(&mut self) {
        let Some(ref mut render_system) = self.render_system else {
            return;
        };

        self.director.advance_frame();

        self.instances.clear();
        for cube in self.director.cubes() {
            self.instances.push(InstanceRaw::from_cuboid(cube));
        }
        for bar in self.director.bars() {
            self.instances.push(InstanceRaw::from_cuboid(bar));
        }
        render_system.update_instances(&self.instances);

        let camera = self.director.camera();
        let uniforms = Uniforms {
            view_proj: camera.view_proj(&self.render_config).to_cols_array_2d(),
            camera_pos: camera.eye().extend(1.0).to_array(),
            fog: [self.render_config.fog_density, LIGHT_POWER, 0.0, 0.0],
        };
        render_system.update_uniforms(&uniforms);

        if let Err(e) = render_system.render() {
            error!("render error: {:?}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        // Keep frames coming only while animating; a paused scene repaints
        // on window events alone
        if self.director.is_running() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let title = match self.director.track_title() {
            Some(track) => format!("Beatring — {}", track),
            None => "Beatring".to_string(),
        };
        let window_attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("create window"),
        );

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.render_config,
            self.instance_capacity,
        ))
        .expect("initialize rendering");

        info!("scene ready; press Space to play");

        // Paint the still scene once before playback starts
        window.request_redraw();

        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => self.handle_key(code, event_loop),
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut app = App::new(&args)?;
    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

use anyhow::Context;
use clap::Parser;
use eframe::{
    egui::{self},
    wgpu,
};
use planet_playground::{config::Config, rendering::RenderState, world::World};
use std::{fmt, process::ExitCode, sync::Arc, time::Instant};

struct App {
    world: World,
}

impl App {
    fn new(cc: &eframe::CreationContext<'_>, config: &Config) -> anyhow::Result<Self> {
        let renderer = cc
            .wgpu_render_state
            .as_ref()
            .context("no wgpu render state, is the wgpu renderer enabled?")?;
        let state = RenderState::new(renderer.target_format, &renderer.device, &renderer.queue);
        renderer.renderer.write().callback_resources.insert(state);

        Ok(Self {
            world: World::new(config),
        })
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(self.world.clear_color()))
            .show(ctx, |ui| {
                let (rect, _response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

                self.world.world_input(rect, ui);
                let now = Instant::now();
                self.world.tick(now);

                ui.painter()
                    .add(eframe::egui_wgpu::Callback::new_paint_callback(
                        rect,
                        self.world.render_data(rect),
                    ));

                ctx.request_repaint_after(self.world.until_next_tick(now));
            });
    }
}

/// Ways the window can fail to come up, each with its own exit code.
#[derive(Debug)]
enum StartupError {
    /// No window or event loop.
    Window(eframe::Error),
    /// No wgpu adapter, device or surface to draw with.
    Renderer(eframe::Error),
}

impl StartupError {
    fn code(&self) -> u8 {
        match self {
            StartupError::Window(_) => 1,
            StartupError::Renderer(_) => 2,
        }
    }

    fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Window(err) => write!(f, "failed to create window: {err}"),
            StartupError::Renderer(err) => write!(f, "failed to create renderer: {err}"),
        }
    }
}

impl From<eframe::Error> for StartupError {
    fn from(err: eframe::Error) -> Self {
        match err {
            eframe::Error::Wgpu(_) | eframe::Error::AppCreation(_) => StartupError::Renderer(err),
            err => StartupError::Window(err),
        }
    }
}

fn run(config: Config) -> Result<(), StartupError> {
    let options = eframe::NativeOptions {
        renderer: eframe::Renderer::Wgpu,
        depth_buffer: 24,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_resizable(false),
        wgpu_options: eframe::egui_wgpu::WgpuConfiguration {
            wgpu_setup: eframe::egui_wgpu::WgpuSetup::CreateNew(
                eframe::egui_wgpu::WgpuSetupCreateNew {
                    device_descriptor: Arc::new(|adapter| wgpu::DeviceDescriptor {
                        label: Some("wgpu device"),
                        required_features: wgpu::Features::default(),
                        required_limits: adapter.limits(),
                        memory_hints: wgpu::MemoryHints::default(),
                    }),
                    ..Default::default()
                },
            ),
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "Planet Playground",
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, &config)?))),
    )?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!(
        "starting at {} ticks/s in a {}x{} window",
        config.tick_rate,
        config.width,
        config.height
    );

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            err.exit_code()
        }
    }
}

use crate::{
    config::Config,
    drawing::DrawHandler,
    interaction::Controller,
    rendering::{GpuCamera, RenderData},
    universe::Universe,
};
use cgmath::Vector2;
use eframe::egui;
use std::time::{Duration, Instant};

/// Everything the window needs besides egui itself: the universe, the input
/// controller, the fixed rate tick clock and the last drawn frame.
pub struct World {
    pub universe: Universe,
    pub controller: Controller,
    pub tick_interval: Duration,
    pub ticks: u64,
    last_tick: Option<Instant>,
    frame: DrawHandler,
    ticks_per_report: u64,
}

impl World {
    pub fn new(config: &Config) -> Self {
        Self {
            universe: Universe::new(),
            controller: Controller::new(config.seed),
            tick_interval: config.tick_interval(),
            ticks: 0,
            last_tick: None,
            frame: DrawHandler::new(),
            ticks_per_report: config.tick_rate.ceil().max(1.0) as u64,
        }
    }

    /// Feeds this frame's pointer events inside `rect` to the controller.
    /// Positions are converted to pixels relative to the top left of `rect`.
    pub fn world_input(&mut self, rect: egui::Rect, ui: &egui::Ui) {
        let events = ui.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    let pos = to_local(rect, pos);
                    self.controller.pointer_move(&mut self.universe, pos);
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed: true,
                    ..
                } => {
                    if rect.contains(pos) {
                        let pos = to_local(rect, pos);
                        self.controller.pointer_down(&mut self.universe, pos, button);
                    }
                }
                egui::Event::PointerButton {
                    button,
                    pressed: false,
                    ..
                } => {
                    self.controller.pointer_up(&mut self.universe, button);
                }
                _ => {}
            }
        }
    }

    /// Runs a tick if the tick interval has passed since the last one.
    ///
    /// Late ticks are not caught up and nothing is scaled by elapsed time, so
    /// the simulation runs at the nominal rate or slower.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.tick_due(now) {
            return false;
        }
        self.last_tick = Some(now);
        self.universe.step(&mut self.frame);
        self.ticks += 1;

        if self.ticks % self.ticks_per_report == 0 {
            log::debug!(
                "tick {}: {} bodies, {} alive, peak heap {:.2} MB",
                self.ticks,
                self.universe.bodies.len(),
                self.universe.bodies.alive_count(),
                crate::peak_memory_mb(),
            );
        }
        true
    }

    pub fn tick_due(&self, now: Instant) -> bool {
        self.last_tick
            .is_none_or(|last| now.duration_since(last) >= self.tick_interval)
    }

    /// Time left until the next tick is due.
    pub fn until_next_tick(&self, now: Instant) -> Duration {
        self.last_tick.map_or(Duration::ZERO, |last| {
            self.tick_interval
                .saturating_sub(now.duration_since(last))
        })
    }

    pub fn frame(&self) -> &DrawHandler {
        &self.frame
    }

    /// Paint callback data for the last completed tick.
    pub fn render_data(&self, rect: egui::Rect) -> RenderData {
        RenderData {
            camera: GpuCamera::pixels(rect.width(), rect.height()),
            quads: self.frame.quads.clone(),
            circles: self.frame.circles.clone(),
        }
    }

    pub fn clear_color(&self) -> egui::Color32 {
        let c = self.frame.clear_color;
        egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
    }
}

fn to_local(rect: egui::Rect, pos: egui::Pos2) -> Vector2<f64> {
    Vector2 {
        x: (pos.x - rect.left_top().x) as f64,
        y: (pos.y - rect.left_top().y) as f64,
    }
}

use clap::Parser;
use std::time::Duration;

/// Click and drag to throw planets at each other.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "planet_playground", version, about)]
pub struct Config {
    /// Simulation ticks per second
    #[arg(long, default_value_t = 30.0, value_parser = parse_tick_rate)]
    pub tick_rate: f64,

    /// Window width in pixels
    #[arg(long, default_value_t = 800.0)]
    pub width: f32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600.0)]
    pub height: f32,

    /// Seed for body colors, random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            width: 800.0,
            height: 600.0,
            seed: None,
        }
    }
}

fn parse_tick_rate(arg: &str) -> Result<f64, String> {
    let rate: f64 = arg.parse().map_err(|err| format!("{err}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("tick rate must be a positive number, got {rate}"))
    }
}

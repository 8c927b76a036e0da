//! eqform CLI
//!
//! Lay out the demo equation and play its transitions frame by frame.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eqform::{EquationConfig, GoToForm, MotionMode};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod demo;

use demo::Frame;

#[derive(Parser)]
#[command(name = "eqform")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Equation form layout and transitions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Advance width of every glyph, in equation units
    #[arg(long, global = true, default_value = "0.04")]
    advance: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved layout of every demo form
    Layout,

    /// Step through the demo series and print sampled frames as JSON lines
    Play {
        /// Number of forward steps (wraps to the first form)
        #[arg(short, long, default_value = "3")]
        steps: usize,

        /// Frame time in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        /// Print one frame out of every N
        #[arg(long, default_value = "10")]
        sample: usize,

        /// Transition duration; the velocity model is used when omitted
        #[arg(short, long)]
        duration: Option<f32>,
    },

    /// Transition to one form and print sampled frames as JSON lines
    Go {
        /// Target form
        form: String,

        #[arg(short, long, value_enum, default_value = "move")]
        mode: Mode,

        #[arg(short, long)]
        duration: Option<f32>,

        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        #[arg(long, default_value = "10")]
        sample: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Move,
    Dissolve,
    DissolveInThenMove,
    MoveThenFade,
}

impl From<Mode> for MotionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Move => MotionMode::Move,
            Mode::Dissolve => MotionMode::Dissolve,
            Mode::DissolveInThenMove => MotionMode::DissolveInThenMove,
            Mode::MoveThenFade => MotionMode::MoveThenFade,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => EquationConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EquationConfig::default(),
    };

    match cli.command {
        Commands::Layout => cmd_layout(config, cli.advance),
        Commands::Play {
            steps,
            dt,
            sample,
            duration,
        } => cmd_play(config, cli.advance, steps, dt, sample, duration),
        Commands::Go {
            form,
            mode,
            duration,
            dt,
            sample,
        } => cmd_go(config, cli.advance, &form, mode.into(), duration, dt, sample),
    }
}

fn cmd_layout(config: EquationConfig, advance: f32) -> Result<()> {
    let mut eq = demo::build(config, advance)?;
    for name in demo::FORMS {
        eq.show_form(name);
        let frame = Frame::capture(&eq, 0.0);
        if let Some(description) = eq.description(name) {
            info!("{}: {}", name, description);
        }
        println!("{}", serde_json::to_string(&frame)?);
    }
    Ok(())
}

fn cmd_play(
    config: EquationConfig,
    advance: f32,
    steps: usize,
    dt: f32,
    sample: usize,
    duration: Option<f32>,
) -> Result<()> {
    anyhow::ensure!(dt > 0.0, "frame time must be positive");
    let mut eq = demo::build(config, advance)?;
    eq.show_form(demo::FORMS[0]);

    let mut time = 0.0;
    println!("{}", serde_json::to_string(&Frame::capture(&eq, time))?);
    for _ in 0..steps {
        eq.next_form(duration, 0.0);
        info!("-> {}", eq.current_form_name().unwrap_or("?"));
        run(&mut eq, dt, sample, &mut time)?;
    }
    Ok(())
}

fn cmd_go(
    config: EquationConfig,
    advance: f32,
    form: &str,
    mode: MotionMode,
    duration: Option<f32>,
    dt: f32,
    sample: usize,
) -> Result<()> {
    anyhow::ensure!(dt > 0.0, "frame time must be positive");
    let mut eq = demo::build(config, advance)?;
    anyhow::ensure!(eq.form(form).is_some(), "unknown form '{}'", form);
    eq.show_form(demo::FORMS[0]);

    let mut request = GoToForm::name(form).with_animate(mode);
    request.duration = duration;
    eq.go_to_form(request);

    let mut time = 0.0;
    run(&mut eq, dt, sample, &mut time)
}

/// Tick until the running transition ends, printing every `sample`th frame
/// and the final one
fn run(eq: &mut eqform::Equation, dt: f32, sample: usize, time: &mut f32) -> Result<()> {
    let sample = sample.max(1);
    let mut frame = 0usize;
    let mut running = eq.is_animating();
    while running {
        running = eq.tick(dt);
        *time += dt;
        frame += 1;
        if !running || frame % sample == 0 {
            println!("{}", serde_json::to_string(&Frame::capture(eq, *time))?);
        }
    }
    Ok(())
}

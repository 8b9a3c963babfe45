use clap::Parser;
use crossbeam_channel::bounded;
use rolling_stats::Stats;
use std::thread;

use vitalwave::config::VitalSignsConfig;
use vitalwave::constants::{FRAMES_PER_CYCLE, NUM_VIRTUAL_ANTENNAS};
use vitalwave::cube::RadarCubeSlice;
use vitalwave::output::{create_formatter, OutputFormat};
use vitalwave::pipeline::VitalSignsPipeline;
use vitalwave::simulation::{NoiseConfig, NoiseSource, VitalsScenario, EFFECTIVE_FRAME_RATE_HZ};

#[derive(Parser, Debug)]
#[command(name = "vitalwave")]
#[command(about = "mmWave radar vital-signs monitor (synthetic front end)", long_about = None)]
struct Args {
    /// Simulated breathing rate in BPM
    #[arg(short = 'b', long, default_value = "15.0")]
    breath_bpm: f32,

    /// Simulated heart rate in BPM
    #[arg(short = 'p', long, default_value = "72.0")]
    heart_bpm: f32,

    /// Breathing phase swing in radians
    #[arg(long, default_value = "2.5")]
    breath_swing: f32,

    /// Heartbeat phase swing in radians
    #[arg(long, default_value = "0.6")]
    heart_swing: f32,

    /// Target range bin
    #[arg(short = 'r', long, default_value = "24")]
    range_bin: u16,

    /// Range bins in the simulated cube
    #[arg(long, default_value = "64")]
    num_bins: usize,

    /// Processing cycles to run (128 frames each)
    #[arg(short = 'c', long, default_value = "12")]
    cycles: usize,

    /// Additive I/Q noise sigma in Q15 counts (0 = clean)
    #[arg(long, default_value = "0.0")]
    noise_sigma: f32,

    /// Noise RNG seed
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Increase output verbosity (-v for info, -vv for debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut scenario = VitalsScenario {
        num_range_bins: args.num_bins,
        target_bin: args.range_bin,
        breath_hz: args.breath_bpm / 60.0,
        breath_swing_rad: args.breath_swing,
        heart_hz: args.heart_bpm / 60.0,
        heart_swing_rad: args.heart_swing,
        ..VitalsScenario::default()
    };
    if args.breath_bpm <= 0.0 {
        scenario.breath_swing_rad = 0.0;
    }
    if args.heart_bpm <= 0.0 {
        scenario.heart_swing_rad = 0.0;
    }

    let mut config = VitalSignsConfig::default();
    config.range_bin_start = args.range_bin;
    let mut pipeline = VitalSignsPipeline::new(config)?;

    let use_stderr_banner = !matches!(args.format, OutputFormat::Text);
    macro_rules! banner {
        ($($arg:tt)*) => {
            if use_stderr_banner {
                eprintln!($($arg)*);
            } else {
                println!($($arg)*);
            }
        };
    }

    banner!("=== vitalwave - radar vital-signs monitor ===");
    banner!("Frame rate: {:.3} Hz", EFFECTIVE_FRAME_RATE_HZ);
    banner!(
        "Injected: breath {:.1} BPM, heart {:.1} BPM at bin {}",
        args.breath_bpm,
        args.heart_bpm,
        args.range_bin
    );
    banner!("Running {} cycles of {} frames", args.cycles, FRAMES_PER_CYCLE);

    let total_frames = args.cycles * FRAMES_PER_CYCLE;
    let noise_config = NoiseConfig {
        seed: args.seed,
        sigma: args.noise_sigma,
    };

    // Frame generation runs on its own thread, standing in for the radar
    // front end feeding the DSP
    let (tx, rx) = bounded(FRAMES_PER_CYCLE);
    let generator = thread::spawn(move || {
        let mut noise = NoiseSource::new(&noise_config);
        for frame_index in 0..total_frames {
            let mut frame = scenario.generate_frame(frame_index);
            noise.apply(&mut frame);
            if tx.send(frame).is_err() {
                break;
            }
        }
    });

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let mut breath_stats: Stats<f32> = Stats::new();
    let mut heart_stats: Stats<f32> = Stats::new();

    for frame_data in rx.iter() {
        let cube = RadarCubeSlice::new(&frame_data, args.num_bins, 1, NUM_VIRTUAL_ANTENNAS)?;
        let loops_before = pipeline.state().loop_count;
        pipeline.process_frame(&cube, args.range_bin)?;

        if pipeline.state().loop_count != loops_before {
            let result = pipeline.output();
            println!("{}", formatter.format(&result));
            if result.valid {
                breath_stats.update(result.breathing_rate);
                heart_stats.update(result.heart_rate);
            }
        }
    }

    generator
        .join()
        .map_err(|_| anyhow::anyhow!("frame generator thread panicked"))?;

    if heart_stats.count > 0 {
        banner!(
            "breath: mean {:.2} BPM (sd {:.2}), heart: mean {:.2} BPM (sd {:.2}), {} valid refreshes",
            breath_stats.mean,
            breath_stats.std_dev,
            heart_stats.mean,
            heart_stats.std_dev,
            heart_stats.count
        );
    } else {
        banner!("no valid measurements (run more cycles to pass warm-up)");
    }

    Ok(())
}

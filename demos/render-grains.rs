//! An example showcasing how to granulate an audio file (or a generated tone) and how to change
//! grain parameters while rendering. The rendered grains are written into a wav file.

use std::path::PathBuf;

use arg::{parse_args, Args};

use grainbuffer::{
    utils::buffer::planar_to_interleaved, GrainEngine, GrainEngineOptions, GrainEnvelope,
    SampleData, SharedSampleBuffer,
};

// -------------------------------------------------------------------------------------------------

#[cfg(all(debug_assertions, feature = "assert-allocs"))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

// -------------------------------------------------------------------------------------------------

const SAMPLE_RATE: u32 = 48000;
const BLOCK_SIZE: usize = 512;

const DEFAULT_LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Warn
};

// -------------------------------------------------------------------------------------------------

/// Program arguments.
#[derive(Args, Debug, Default)]
struct Arguments {
    #[arg(short = "i", long = "input")]
    /// Audio file to granulate. By default a generated tone gets granulated.
    input_path: Option<PathBuf>,
    #[arg(short = "o", long = "output")]
    /// Wav file to write the rendered grains to. By default \"grains.wav\".
    output_path: Option<PathBuf>,
    #[arg(short = "d", long = "duration")]
    /// Rendered duration in seconds. By default 10 seconds.
    duration: Option<f64>,
    #[arg(short = "c", long = "channels")]
    /// Number of output channels. By default 2.
    channel_count: Option<usize>,
    #[arg(short = "s", long = "seed")]
    /// Random seed for reproducible renderings. By default a random seed is used.
    seed: Option<u64>,
    #[arg(short = "l", long = "log-level")]
    /// Set logging level to \"debug\", \"info\", \"warn\" or \"error\".
    /// By default \"debug\" in dev builds and \"warn\" in release builds.
    log_level: Option<log::Level>,
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse optional arguments
    let args = parse_args::<Arguments>();

    // Init logger
    simple_logger::SimpleLogger::new()
        .with_level(args.log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_level_filter())
        // disable logging in chatty modules
        .with_module_level("symphonia_core", log::LevelFilter::Warn)
        .with_module_level("symphonia_format", log::LevelFilter::Warn)
        .init()?;

    // Load or generate the sample buffer
    let sample_data = match &args.input_path {
        Some(path) => SampleData::from_file(path)?,
        None => {
            let samples = (0..SAMPLE_RATE * 2)
                .map(|frame| {
                    let time = frame as f32 / SAMPLE_RATE as f32;
                    let vibrato = 1.0 + 0.01 * (time * 5.0 * std::f32::consts::TAU).sin();
                    0.5 * (time * 220.0 * vibrato * std::f32::consts::TAU).sin()
                })
                .collect();
            SampleData::new(samples, 1, SAMPLE_RATE)?
        }
    };
    let buffer = SharedSampleBuffer::new(sample_data);

    // Create the engine
    let mut options =
        GrainEngineOptions::default().output_channel_count(args.channel_count.unwrap_or(2));
    if let Some(seed) = args.seed {
        options = options.seed(seed);
    }
    let mut engine = GrainEngine::new(SAMPLE_RATE, options)?;
    let channel_count = engine.output_channel_count();

    // Set initial parameters via a handle, as a control thread would do
    let handle = engine.handle();
    handle.set_rate(0.5)?;
    handle.set_loop(0.1, 0.9)?;
    handle.set_freq_range(0.98, 1.02)?;
    handle.set_dur_range(40.0, 120.0)?;
    handle.set_disp_range(5.0, 20.0)?;
    handle.set_amp_range(0.2, 0.4)?;
    handle.set_pan_range(0.0, 1.0)?;
    handle.set_buffer_randomness(0.1)?;

    // Open the output file
    let output_path = args
        .output_path
        .unwrap_or_else(|| PathBuf::from("grains.wav"));
    let spec = hound::WavSpec {
        channels: channel_count as u16,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&output_path, spec)?;

    // Render
    let total_frames = (args.duration.unwrap_or(10.0).max(0.0) * SAMPLE_RATE as f64) as usize;
    let envelopes = [
        GrainEnvelope::Sine,
        GrainEnvelope::Parabolic,
        GrainEnvelope::Percussive,
        GrainEnvelope::Random,
    ];
    let mut planar = vec![vec![0.0f32; BLOCK_SIZE]; channel_count];
    let mut interleaved = vec![0.0f32; BLOCK_SIZE * channel_count];
    let mut rendered_frames = 0;
    let mut current_second = usize::MAX;
    while rendered_frames < total_frames {
        // change grain characteristics every second
        let second = rendered_frames / SAMPLE_RATE as usize;
        if second != current_second {
            current_second = second;
            let envelope = envelopes[second % envelopes.len()];
            log::info!("Rendering second {second} with {envelope} grains");
            handle.set_envelope(envelope)?;
            handle.set_buffer_randomness((second % 5) as f64 / 4.0)?;
        }

        let frame_count = BLOCK_SIZE.min(total_frames - rendered_frames);
        let mut channels = planar
            .iter_mut()
            .map(|channel| &mut channel[..frame_count])
            .collect::<Vec<_>>();
        engine.process(&buffer, &mut channels);

        planar_to_interleaved(&channels, &mut interleaved[..frame_count * channel_count]);
        for sample in &interleaved[..frame_count * channel_count] {
            writer.write_sample(*sample)?;
        }
        rendered_frames += frame_count;
    }
    writer.finalize()?;

    log::info!(
        "Rendered {:.1} seconds of grains into '{}'",
        rendered_frames as f64 / SAMPLE_RATE as f64,
        output_path.display()
    );
    Ok(())
}

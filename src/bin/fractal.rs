use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{App, Arg, ArgMatches};
use num::Complex;
use tracing_subscriber::EnvFilter;

use escapetime::{
    EscapeFunction, Extent, FileSink, FractalRenderer, FrameDriver, ImageSize, Julia, LogProgress,
    Mandelbrot, PlaneWindow, RenderControls, RenderError, RenderSettings, ZoomSchedule,
};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const FRACTAL: &str = "fractal";
const CONSTANT: &str = "constant";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const SCALE: &str = "scale";
const HALF_OPEN: &str = "half-open";
const FRAMES: &str = "frames";
const ZOOM: &str = "zoom";
const DELTA: &str = "delta";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("fractal")
        .version("0.1.0")
        .about("Escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file, or the frame name prefix with --frames"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1000x1000")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,-2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Minimum corner of the complex plane window"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Maximum corner of the complex plane window"),
        )
        .arg(
            Arg::with_name(FRACTAL)
                .long(FRACTAL)
                .short("f")
                .takes_value(true)
                .possible_values(&["mandelbrot", "julia"])
                .default_value("mandelbrot")
                .help("Which fractal to render"),
        )
        .arg(
            Arg::with_name(CONSTANT)
                .long(CONSTANT)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.28,0.008")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("Constant added at each step of the Julia recurrence"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iteration cap; points still bounded after it are painted as bounded"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("x")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        64,
                        "Could not parse pixel scale",
                        "Pixel scale must be between 1 and 64",
                    )
                })
                .help("Paint each computed pixel as a square this many pixels wide"),
        )
        .arg(
            Arg::with_name(HALF_OPEN)
                .long(HALF_OPEN)
                .help("Evaluate only the pixels inside the image, not the extra row and column"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("n")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Render an animation of this many frames"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .takes_value(true)
                .default_value("0.99")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse zoom factor",
                        "Zoom factor must be positive",
                    )
                })
                .help("Per-frame scale of the window when animating"),
        )
        .arg(
            Arg::with_name(DELTA)
                .long(DELTA)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.09075")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN,
                        std::f64::MAX,
                        "Could not parse frame offset",
                        "Frame offset must be finite",
                    )
                })
                .help("Offset subtracted from both window corners when animating"),
        )
        .get_matches()
}

/// Everything the command line decided, apart from the fractal.
struct Job {
    size: ImageSize,
    window: PlaneWindow,
    settings: RenderSettings,
    output: PathBuf,
    frames: Option<usize>,
    zoom: f64,
    delta: f64,
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, String> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format!("Error parsing --{}", name))
}

fn complex(matches: &ArgMatches, name: &str) -> Result<Complex<f64>, String> {
    matches
        .value_of(name)
        .and_then(parse_complex)
        .ok_or_else(|| format!("Error parsing --{}", name))
}

fn parse_job(matches: &ArgMatches) -> Result<Job, String> {
    let size = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| "Error parsing image dimensions".to_string())?;
    let frames = match matches.value_of(FRAMES) {
        None => None,
        Some(_) => Some(value(matches, FRAMES)?),
    };
    let extent = if matches.is_present(HALF_OPEN) {
        Extent::HalfOpen
    } else {
        Extent::Inclusive
    };
    Ok(Job {
        size: ImageSize(size.0, size.1),
        window: PlaneWindow(complex(matches, LEFTLOWER)?, complex(matches, RIGHTUPPER)?),
        settings: RenderSettings {
            extent,
            scale: value(matches, SCALE)?,
            threads: value(matches, THREADS)?,
        },
        output: PathBuf::from(value::<String>(matches, OUTPUT)?),
        frames,
        zoom: value(matches, ZOOM)?,
        delta: value(matches, DELTA)?,
    })
}

/// The sink writes into the directory part of the output; the file
/// part names the image, or prefixes the frames.
fn split_output(output: &Path) -> (PathBuf, String) {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (directory, name)
}

fn run<F: EscapeFunction + Clone>(function: F, job: &Job) -> Result<(), RenderError> {
    let (directory, name) = split_output(&job.output);
    let mut sink = FileSink::new(directory);
    let progress = LogProgress;
    let controls = RenderControls::default().with_progress(&progress);

    match job.frames {
        None => {
            let mut renderer =
                FractalRenderer::with_settings(job.size, job.window, function, job.settings)?;
            renderer.compute_with(&controls)?;
            renderer.save(&mut sink, &name)
        }
        Some(frames) => {
            let schedule = ZoomSchedule::new(job.window, job.zoom, job.delta);
            let driver =
                FrameDriver::new(job.size, function, schedule, &name).settings(job.settings);
            let saved = driver.run(0..frames, &mut sink, &controls)?;
            tracing::info!(saved, "animation finished");
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = args();
    let job = match parse_job(&matches) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };
    let iterations: u32 = match value(&matches, ITERATIONS) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let result = match matches.value_of(FRACTAL) {
        Some("julia") => match complex(&matches, CONSTANT) {
            Ok(constant) => run(Julia::with_constant(constant).limit(iterations), &job),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(2);
            }
        },
        _ => run(Mandelbrot::with_limit(iterations), &job),
    };

    if let Err(e) = result {
        eprintln!("Render failure: {}", e);
        process::exit(1);
    }
}

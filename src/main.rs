use manifold_filter::config::load_options;
use manifold_filter::image::io::{load_image_u8, save_image_buf};
use manifold_filter::{AdaptiveManifoldFilter, AmfOptions};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args().next().unwrap_or_else(|| "amf_demo".to_string());
    let config = parse_args(&program)?;

    let src = load_image_u8(&config.input_path)?;
    let joint = match &config.joint_path {
        Some(path) => Some(load_image_u8(path)?),
        None => None,
    };

    let mut options = match &config.params_path {
        Some(path) => load_options(path)?,
        None => AmfOptions::default(),
    };
    if let Some(sigma_s) = config.sigma_s {
        options.sigma_s = sigma_s;
    }
    if let Some(sigma_r) = config.sigma_r {
        options.sigma_r = sigma_r;
    }
    if config.adjust_outliers {
        options.adjust_outliers = true;
    }

    let mut filter = AdaptiveManifoldFilter::new(options);
    let src_view = src.as_view();
    let joint_view = joint.as_ref().map(|j| j.as_view());
    let start = Instant::now();
    let result = filter
        .filter(&src_view, joint_view.as_ref())
        .map_err(|e| format!("Filtering failed: {e}"))?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!(
        "Filtered {}x{}x{} in {elapsed_ms:.1} ms (sigma_s={}, sigma_r={})",
        result.w,
        result.h,
        result.channels,
        filter.options().sigma_s,
        filter.options().sigma_r
    );

    save_image_buf(&result, &config.output_path)?;
    println!("Result written to {}", config.output_path.display());
    Ok(())
}

struct CliConfig {
    input_path: PathBuf,
    output_path: PathBuf,
    joint_path: Option<PathBuf>,
    params_path: Option<PathBuf>,
    sigma_s: Option<f64>,
    sigma_r: Option<f64>,
    adjust_outliers: bool,
}

fn parse_args(program: &str) -> Result<CliConfig, String> {
    let mut args = env::args().skip(1);
    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut joint_path: Option<PathBuf> = None;
    let mut params_path: Option<PathBuf> = None;
    let mut sigma_s: Option<f64> = None;
    let mut sigma_r: Option<f64> = None;
    let mut adjust_outliers = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage(program));
                std::process::exit(0);
            }
            "--output" | "-o" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--output expects a path\n{}", usage(program)))?;
                output_path = Some(PathBuf::from(value));
            }
            "--joint" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--joint expects a path\n{}", usage(program)))?;
                joint_path = Some(PathBuf::from(value));
            }
            "--params" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--params expects a path\n{}", usage(program)))?;
                params_path = Some(PathBuf::from(value));
            }
            "--sigma-s" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--sigma-s expects a value\n{}", usage(program)))?;
                sigma_s = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid sigma_s '{value}'"))?,
                );
            }
            "--sigma-r" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--sigma-r expects a value\n{}", usage(program)))?;
                sigma_r = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid sigma_r '{value}'"))?,
                );
            }
            "--adjust-outliers" => {
                adjust_outliers = true;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option '{arg}'\n{}", usage(program)));
            }
            _ => {
                if input_path.is_some() {
                    return Err(format!(
                        "Unexpected positional argument '{arg}'\n{}",
                        usage(program)
                    ));
                }
                input_path = Some(PathBuf::from(arg));
            }
        }
    }

    let input_path = input_path.ok_or_else(|| usage(program))?;
    let output_path = output_path.unwrap_or_else(|| {
        let mut out = input_path.clone();
        out.set_extension("filtered.png");
        out
    });
    Ok(CliConfig {
        input_path,
        output_path,
        joint_path,
        params_path,
        sigma_s,
        sigma_r,
        adjust_outliers,
    })
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <image.png> [--output result.png] [--joint guide.png] \\\n         [--sigma-s 16] [--sigma-r 0.2] [--adjust-outliers] [--params options.json]\n\n\
Runs the adaptive manifold filter on an image and writes the smoothed result.\n\
Examples:\n  {program} photo.png --sigma-s 24 --sigma-r 0.25 -o smooth.png\n  {program} noisy.png --joint clean.png --adjust-outliers\n"
    )
}

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{info, warn};
use serde_json::json;
use target_bearing::{PipelineError, PipelineParams, TargetPipeline};
use target_bearing_core::{rgba_frame_from_slice, FrameError, FrameSize};

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read or write image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: PipelineError,
    },

    #[error("no PNG or JPEG frames found in {0}")]
    NoFrames(PathBuf),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CliError + '_ {
    move |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn image_err(path: &Path) -> impl FnOnce(image::ImageError) -> CliError + '_ {
    move |source| CliError::Image {
        path: path.to_path_buf(),
        source,
    }
}

pub fn load_params(config: Option<&Path>) -> Result<PipelineParams, CliError> {
    let Some(path) = config else {
        return Ok(PipelineParams::default());
    };
    let json = fs::read_to_string(path).map_err(io_err(path))?;
    PipelineParams::from_json(&json).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn load_frame(path: &Path, raw_size: Option<FrameSize>) -> Result<RgbaImage, CliError> {
    match raw_size {
        Some(size) => {
            let bytes = fs::read(path).map_err(io_err(path))?;
            Ok(rgba_frame_from_slice(size.width, size.height, &bytes)?)
        }
        None => Ok(image::open(path).map_err(image_err(path))?.to_rgba8()),
    }
}

pub fn detect(
    input: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    raw_size: Option<FrameSize>,
) -> Result<(), CliError> {
    let params = load_params(config)?;
    let frame = load_frame(input, raw_size)?;
    info!(
        "frame {}: {}x{}",
        input.display(),
        frame.width(),
        frame.height()
    );

    let mut pipeline = TargetPipeline::new(params)?;
    let out = pipeline.process(&frame);
    match out.report.angle_deg() {
        Some(angle) => info!("target found, angle {angle:.3} deg"),
        None => warn!("no target selected ({} candidates)", out.report.candidates.len()),
    }

    if let Some(path) = output {
        out.frame.save(path).map_err(image_err(path))?;
        info!("wrote {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&out.report)?);
    Ok(())
}

/// Image files in `dir`, sorted by file name.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if is_frame && path.is_file() {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

pub fn replay(dir: &Path, config: Option<&Path>, output_dir: Option<&Path>) -> Result<(), CliError> {
    let params = load_params(config)?;
    let frames = list_frames(dir)?;
    if frames.is_empty() {
        return Err(CliError::NoFrames(dir.to_path_buf()));
    }
    if let Some(out_dir) = output_dir {
        fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;
    }

    let mut pipeline = TargetPipeline::new(params)?;
    let mut found = 0usize;
    for path in &frames {
        let frame = load_frame(path, None)?;
        let out = pipeline.process(&frame);
        if out.report.target.is_some() {
            found += 1;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(out_dir) = output_dir {
            let dst = out_dir.join(Path::new(&name).with_extension("png"));
            out.frame.save(&dst).map_err(image_err(&dst))?;
        }
        println!(
            "{}",
            serde_json::to_string(&json!({ "frame": name, "report": out.report }))?
        );
    }

    info!(
        "replayed {} frames, target selected in {}",
        frames.len(),
        found
    );
    Ok(())
}

pub fn default_config() -> Result<(), CliError> {
    println!(
        "{}",
        serde_json::to_string_pretty(&PipelineParams::default())?
    );
    Ok(())
}

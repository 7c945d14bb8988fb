use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use autorig::{AppConfig, CoreError, RigService};
use clap::{Parser, Subcommand};
use rig_adapters::Template;
use rig_align::{compute_alignment, PointSet};
use rig_core::{JobStatus, RigError};
use rig_engine::BlenderEngine;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "rig-cli", version, about = "Auto-rigging de mallas contra un template")]
struct Cli {
    /// Más detalle en el log (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pasa un archivo por el pipeline completo y guarda el resultado
    Run {
        input: PathBuf,
        /// Template a usar en lugar de RIG_TEMPLATE_PATH
        #[arg(long)]
        template: Option<PathBuf>,
        #[arg(long, default_value = "rigged.glb")]
        out: PathBuf,
    },
    /// Alinea dos nubes de puntos JSON (`[[x, y, z], ...]`) e imprime la matriz
    Align { source: PathBuf, target: PathBuf },
    /// Inspecciona un template y valida su forma (una armature + una malla),
    /// o lo convierte a GLB con `--convert`
    Template {
        #[arg(required_unless_present = "convert", conflicts_with = "convert")]
        path: Option<PathBuf>,
        /// Convierte un template FBX a GLB y valida el resultado
        #[arg(long, num_args = 2, value_names = ["FBX", "OUT"])]
        convert: Option<Vec<PathBuf>>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{}", .0.summary())]
    Rig(#[from] RigError),
    #[error("{0}")]
    Input(String),
    /// job terminado en `Failed`: `<code>: <detalle>`
    #[error("{0}")]
    Failed(String),
}

impl CliError {
    /// 2 entrada inválida, 3 configuración/arranque, 4 fallo del pipeline.
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Input(_) | CliError::Rig(RigError::Validation(_)) => 2,
            CliError::Core(_) => 3,
            CliError::Rig(_) | CliError::Failed(_) => 4,
        }
    }
}

#[derive(Serialize)]
struct AlignmentReport {
    scale: f64,
    matrix: [[f64; 4]; 4],
    source_points: usize,
    target_points: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level)
                                           .format_target(false)
                                           .init();

    let result = match cli.cmd {
        Command::Run { input, template, out } => run(&input, template, &out),
        Command::Align { source, target } => align(&source, &target),
        Command::Template { convert: Some(paths), .. } => match paths.as_slice() {
            [source, out] => convert_template(source, out),
            _ => Err(CliError::Input("--convert expects <FBX> <OUT>".into())),
        },
        Command::Template { path: Some(path), .. } => inspect_template(&path),
        Command::Template { .. } => Err(CliError::Input("template path required".into())),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(input: &Path, template: Option<PathBuf>, out: &Path) -> Result<(), CliError> {
    let extension = input.extension()
                         .and_then(|e| e.to_str())
                         .ok_or_else(|| CliError::Input(format!("{}: missing file extension", input.display())))?
                         .to_string();
    let bytes = std::fs::read(input).map_err(|e| CliError::Input(format!("{}: {e}", input.display())))?;

    let mut config = AppConfig::from_env()?;
    if let Some(t) = template {
        config.template_path = t;
    }
    let runtime = tokio::runtime::Runtime::new().map_err(CoreError::from)?;
    let service = RigService::start(config, runtime.handle().clone())?;

    let id = service.submit(bytes, &extension)?;
    log::info!("job {id} submitted");
    let job = runtime.block_on(async {
                         loop {
                             match service.status(id) {
                                 Ok(job) if job.status.is_terminal() => break Ok(job),
                                 Ok(_) => tokio::time::sleep(Duration::from_millis(200)).await,
                                 Err(e) => break Err(e),
                             }
                         }
                     })?;

    if job.status == JobStatus::Failed {
        let code = job.error_code.unwrap_or_default();
        let detail = job.error_detail.unwrap_or_default();
        return Err(CliError::Failed(format!("job {id} failed: {code}: {detail}")));
    }
    let (bytes, _) = service.download(id)?;
    std::fs::write(out, bytes).map_err(|e| CliError::Input(format!("{}: {e}", out.display())))?;
    println!("{}", out.display());
    Ok(())
}

fn read_points(path: &Path) -> Result<PointSet, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::Input(format!("{}: {e}", path.display())))?;
    let coords: Vec<[f64; 3]> =
        serde_json::from_str(&text).map_err(|e| CliError::Input(format!("{}: {e}", path.display())))?;
    Ok(PointSet::from(coords))
}

fn align(source: &Path, target: &Path) -> Result<(), CliError> {
    let src = read_points(source)?;
    let dst = read_points(target)?;
    let transform = compute_alignment(&src, &dst).map_err(|e| {
                                                      if e.is_degenerate_input() {
                                                          RigError::DegenerateInput(e.to_string())
                                                      } else {
                                                          RigError::Numerical(e.to_string())
                                                      }
                                                  })?;
    let report = AlignmentReport { scale: transform.scale(),
                                   matrix: transform.to_rows(),
                                   source_points: src.len(),
                                   target_points: dst.len() };
    let json = serde_json::to_string_pretty(&report).map_err(|e| CliError::Input(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn inspect_template(path: &Path) -> Result<(), CliError> {
    let config = AppConfig::from_env()?;
    let engine = BlenderEngine::new(config.engine);
    print_template(&Template::load(&engine, path)?);
    Ok(())
}

fn convert_template(source: &Path, out: &Path) -> Result<(), CliError> {
    let config = AppConfig::from_env()?;
    let engine = BlenderEngine::new(config.engine);
    print_template(&Template::convert(&engine, source, out)?);
    Ok(())
}

fn print_template(template: &Template) {
    println!("template: {}", template.path().display());
    println!("  armature: {} ({} bones)", template.armature().name, template.armature().bones.len());
    for bone in &template.armature().bones {
        println!("    - {bone}");
    }
    println!("  mesh: {} ({} vertices)", template.mesh().name, template.mesh().vertex_count);
}

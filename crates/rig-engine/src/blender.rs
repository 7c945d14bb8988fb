//! Motor headless estilo Blender.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use log::{error, info};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::process::{run_bounded, ProcessOutput};
use crate::{EngineConfig, EngineError, EngineOp, EngineScript, MeshEngine, RigRequest, SceneSummary};

/// Invoca `<binary> --background --python <script> -- <args...>`.
#[derive(Debug, Clone)]
pub struct BlenderEngine {
    config: EngineConfig,
}

impl BlenderEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn script_for(op: EngineOp) -> EngineScript {
        match op {
            EngineOp::Prepare => EngineScript::Prepare,
            EngineOp::Inspect => EngineScript::Inspect,
            EngineOp::ExportPoints => EngineScript::ExportPoints,
            EngineOp::Rig => EngineScript::Rig,
            EngineOp::ConvertTemplate => EngineScript::ConvertTemplate,
        }
    }

    /// Línea de comando completa (sin el ejecutable) para `op`.
    pub fn command_args(&self, op: EngineOp, args: &[&Path]) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec!["--background".into(),
                                           "--python".into(),
                                           self.config.scripts.path(Self::script_for(op)).into(),
                                           "--".into()];
        argv.extend(args.iter().map(|a| a.as_os_str().to_os_string()));
        argv
    }

    /// Corre el script de `op` y exige exit 0 + `output` presente.
    fn invoke(&self, op: EngineOp, args: &[&Path], output: &Path) -> Result<ProcessOutput, EngineError> {
        let mut command = Command::new(&self.config.binary);
        command.args(self.command_args(op, args));

        let out = match run_bounded(command, op, self.config.limits.for_op(op)) {
            Ok(out) => out,
            Err(e) => {
                if let Some(stderr) = e.stderr() {
                    error!("engine {op} failed: {e}\n{stderr}");
                }
                return Err(e);
            }
        };
        if !out.status.success() {
            error!("engine {op} exited with {}:\n{}", out.status, out.stderr);
            return Err(EngineError::NonZeroExit { operation: op,
                                                  code: out.status.code(),
                                                  stderr: out.stderr });
        }
        if !output.exists() {
            error!("engine {op} exited 0 without writing {}", output.display());
            return Err(EngineError::MissingOutput { operation: op,
                                                    path: output.display().to_string() });
        }
        info!("engine {op} ok -> {}", output.display());
        Ok(out)
    }

    /// Ejecuta un script que escribe JSON en un archivo temporal y lo decodifica.
    fn invoke_json<T: DeserializeOwned>(&self, op: EngineOp, asset: &Path) -> Result<T, EngineError> {
        let sink = tempfile::Builder::new().prefix("rig-engine-")
                                           .suffix(".json")
                                           .tempfile()?;
        // el script crea el archivo; se quita el vacío para detectar la ausencia
        let sink_path = sink.into_temp_path();
        let sink: &Path = &sink_path;
        std::fs::remove_file(sink)?;

        self.invoke(op, &[asset, sink], sink)?;
        let raw = std::fs::read(sink)?;
        serde_json::from_slice(&raw).map_err(|e| EngineError::Decode { operation: op,
                                                                       detail: e.to_string() })
    }
}

impl MeshEngine for BlenderEngine {
    fn prepare(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        self.invoke(EngineOp::Prepare, &[input, output], output).map(|_| ())
    }

    fn inspect(&self, asset: &Path) -> Result<SceneSummary, EngineError> {
        self.invoke_json(EngineOp::Inspect, asset)
    }

    fn export_points(&self, asset: &Path) -> Result<Vec<[f64; 3]>, EngineError> {
        self.invoke_json(EngineOp::ExportPoints, asset)
    }

    fn rig(&self, request: &RigRequest) -> Result<(), EngineError> {
        let mut params = tempfile::Builder::new().prefix("rig-params-")
                                                 .suffix(".json")
                                                 .tempfile()?;
        let body = json!({
            "matrix": request.matrix,
            "smooth_iterations": request.smooth_iterations,
            "smooth_factor": request.smooth_factor,
        });
        serde_json::to_writer(params.as_file_mut(), &body).map_err(|e| EngineError::Io(e.to_string()))?;

        self.invoke(EngineOp::Rig,
                    &[request.input.as_path(), request.template.as_path(), request.output.as_path(), params.path()],
                    &request.output)
            .map(|_| ())
    }

    fn convert_template(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        self.invoke(EngineOp::ConvertTemplate, &[input, output], output).map(|_| ())
    }
}

//! Ejecución acotada de subprocesos.
//!
//! stdout/stderr se drenan en hilos propios para que un motor verboso no se
//! bloquee con el pipe lleno; el proceso se sondea hasta el techo y, si lo
//! excede, se mata.

use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::{EngineError, EngineOp};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
/// Espera máxima por los pipes una vez que el proceso terminó (un nieto
/// puede heredarlos y mantenerlos abiertos).
const DRAIN_GRACE: Duration = Duration::from_secs(2);
/// Bytes retenidos por pipe. Se conserva la cola, que es donde el motor
/// deja la causa del fallo.
pub const CAPTURE_LIMIT: usize = 64 * 1024;
const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Lee `pipe` hasta EOF guardando como máximo `CAPTURE_LIMIT` bytes.
fn read_tail<R: Read>(pipe: &mut R, label: &str) -> Vec<u8> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match pipe.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                kept.extend_from_slice(&chunk[..n]);
                if kept.len() > CAPTURE_LIMIT {
                    let excess = kept.len() - CAPTURE_LIMIT;
                    kept.drain(..excess);
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("engine {label}: read failed after {} bytes: {e}", kept.len());
                break;
            }
        }
    }
    kept
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>, label: &'static str) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let kept = read_tail(&mut pipe, label);
            // el receptor pudo dejar de esperar (timeout o drain vencido)
            if tx.send(kept).is_err() {
                debug!("engine {label}: output discarded, nobody waiting");
            }
        });
    }
    rx
}

fn collect(rx: &Receiver<Vec<u8>>, wait: Duration) -> String {
    rx.recv_timeout(wait)
      .map(|b| String::from_utf8_lossy(&b).into_owned())
      .unwrap_or_default()
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("failed to kill engine process {}: {e}", child.id());
    }
    let _ = child.wait();
}

/// Ejecuta `command` con un techo de duración.
///
/// Devuelve el estado de salida y la salida capturada; exit status distinto
/// de cero NO es error aquí (lo decide el llamador). Vencer el techo sí lo
/// es: el proceso se mata y se devuelve `Timeout` con el stderr parcial.
pub fn run_bounded(mut command: Command, operation: EngineOp, ceiling: Duration) -> Result<ProcessOutput, EngineError> {
    command.stdin(Stdio::null())
           .stdout(Stdio::piped())
           .stderr(Stdio::piped());
    let program = command.get_program().to_string_lossy().into_owned();
    debug!("engine {operation}: spawning {command:?}");

    let mut child = command.spawn()
                           .map_err(|e| EngineError::Spawn { program: program.clone(),
                                                             detail: e.to_string() })?;
    let stdout = drain(child.stdout.take(), "stdout");
    let stderr = drain(child.stderr.take(), "stderr");

    let deadline = Instant::now() + ceiling;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                kill(&mut child);
                warn!("engine {operation}: killed after {:?}", ceiling);
                return Err(EngineError::Timeout { operation,
                                                  ceiling,
                                                  stderr: collect(&stderr, POLL_INTERVAL * 4) });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill(&mut child);
                return Err(EngineError::Io(format!("waiting for {program}: {e}")));
            }
        }
    };

    Ok(ProcessOutput { status,
                       stdout: collect(&stdout, DRAIN_GRACE),
                       stderr: collect(&stderr, DRAIN_GRACE) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn long_output_keeps_only_the_tail() {
        let mut body = vec![b'x'; CAPTURE_LIMIT * 3];
        body.extend_from_slice(b"TAIL");
        let kept = read_tail(&mut Cursor::new(body), "stderr");
        assert_eq!(kept.len(), CAPTURE_LIMIT);
        assert!(kept.ends_with(b"TAIL"));
    }

    /// Entrega unos bytes y luego falla.
    struct Broken {
        sent: bool,
    }

    impl Read for Broken {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::other("pipe reset"));
            }
            self.sent = true;
            buf[..7].copy_from_slice(b"partial");
            Ok(7)
        }
    }

    #[test]
    fn read_error_keeps_what_was_read() {
        let kept = read_tail(&mut Broken { sent: false }, "stderr");
        assert_eq!(kept, b"partial");
    }
}

use super::{SourceKind, TextExtractor};
use crate::config::Config;
use crate::error::ExtractionError;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const PDF_SCRIPT: &str = "pdf_text.py";
const POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Serialize)]
struct PdfTextIn<'a> {
    input_pdf: &'a Path,
}

#[derive(Debug, Clone, Deserialize)]
struct PdfTextOut {
    ok: bool,
    #[serde(default)]
    text: String,
    #[serde(default)]
    page_count: u32,
    #[serde(default)]
    error: Option<String>,
}

/// Reads `.txt`/`.md` directly and hands `.pdf` files to `scripts/pdf_text.py`
/// (pypdf) through the configured Python interpreter.
pub struct LocalExtractor {
    cfg: Config,
    scripts_dir: PathBuf,
    python_exe: PathBuf,
}

impl LocalExtractor {
    pub fn new(cfg: &Config) -> Self {
        Self {
            cfg: cfg.clone(),
            scripts_dir: PathBuf::from(&cfg.extraction.scripts_dir),
            python_exe: resolve_python_exe(&cfg.extraction.python_exe),
        }
    }

    fn script(&self) -> Result<PathBuf> {
        if self.cfg.security.pin_scripts_dir {
            let cwd = std::env::current_dir().with_context(|| "current_dir")?;
            let canon = self.scripts_dir.canonicalize().with_context(|| {
                format!("canonicalize scripts_dir: {}", self.scripts_dir.display())
            })?;
            if !canon.starts_with(&cwd) {
                return Err(anyhow!(
                    "scripts_dir is outside cwd while pin_scripts_dir=true: {}",
                    canon.display()
                ));
            }
        }
        let path = self.scripts_dir.join(PDF_SCRIPT);
        if !path.exists() {
            return Err(anyhow!("missing script: {}", path.display()));
        }
        Ok(path)
    }

    fn pdf_text(&self, input: &Path) -> Result<String> {
        let script = self.script()?;
        let secs = self.cfg.extraction.timeout_seconds;
        let out: PdfTextOut = self.run_json(&script, &PdfTextIn { input_pdf: input }, (secs > 0).then_some(secs))?;
        if !out.ok {
            let reason = out.error.unwrap_or_else(|| "no reason given".to_string());
            return Err(anyhow!("{PDF_SCRIPT}: {reason}"));
        }
        info!("extracted pdf pages={} chars={}", out.page_count, out.text.chars().count());
        Ok(out.text)
    }

    /// One JSON request on stdin, one JSON reply on stdout.
    fn run_json<I: Serialize, O: for<'de> Deserialize<'de>>(
        &self,
        script: &Path,
        input: &I,
        timeout_seconds: Option<u64>,
    ) -> Result<O> {
        debug!("python {} timeout={:?}", script.display(), timeout_seconds);
        let mut child = Command::new(&self.python_exe)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning {} {}", self.python_exe.display(), script.display()))?;

        let request = serde_json::to_vec(input)?;
        let mut stdin = child.stdin.take().ok_or_else(|| anyhow!("child has no stdin"))?;
        stdin.write_all(&request).with_context(|| "writing request")?;
        drop(stdin);

        let output = collect(child, timeout_seconds.map(Duration::from_secs))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(anyhow!("{} exited with {}: {}", script.display(), output.status, stderr.trim()));
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", script.display(), stderr.trim());
        }

        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("decoding reply from {}", script.display()))
    }
}

impl TextExtractor for LocalExtractor {
    fn extract(&self, input: &Path) -> Result<String, ExtractionError> {
        let unreadable = |e: anyhow::Error| ExtractionError::Unreadable {
            path: input.display().to_string(),
            reason: format!("{e:#}"),
        };

        match SourceKind::detect(input)? {
            SourceKind::PlainText => std::fs::read_to_string(input)
                .with_context(|| format!("reading {}", input.display()))
                .map_err(unreadable),
            SourceKind::Pdf => self.pdf_text(input).map_err(unreadable),
        }
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("PAPER_EXPLAINER_PYTHON") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("python3");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

fn drain<R: Read + Send + 'static>(reader: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            let _ = r.read_to_end(&mut buf);
        }
        buf
    })
}

/// Wait for `child`, killing it once `timeout` elapses. Both pipes are
/// drained on their own threads so a large reply cannot stall the child.
fn collect(mut child: Child, timeout: Option<Duration>) -> Result<Output> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = timeout.map(|t| Instant::now() + t);

    let status = loop {
        if let Some(status) = child.try_wait().with_context(|| "polling python")? {
            break status;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("python timed out after {:?}; killing", timeout.unwrap_or_default());
            let _ = child.kill();
            child.wait().with_context(|| "reaping python")?;
            let _ = stdout.join();
            let err = stderr.join().unwrap_or_default();
            return Err(anyhow!(
                "python exceeded {:?}: {}",
                timeout.unwrap_or_default(),
                String::from_utf8_lossy(&err).trim()
            ));
        }
        std::thread::sleep(POLL);
    };

    Ok(Output {
        status,
        stdout: stdout.join().map_err(|_| anyhow!("stdout reader panicked"))?,
        stderr: stderr.join().map_err(|_| anyhow!("stderr reader panicked"))?,
    })
}

//! Skin-tone detection through an external script
//!
//! The script is invoked as `<interpreter> <script> <image path>` and must
//! print `label,r,g,b,hex` as its last non-empty stdout line.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use stylist_core::{Rgb, SkinToneReading, UploadedImage};
use tokio::process::Command;

use crate::analyzer::{with_timeout, AnalyzerError, SkinToneDetector};

pub struct ScriptSkinToneDetector {
    interpreter: String,
    script: PathBuf,
    timeout: Duration,
}

impl ScriptSkinToneDetector {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            timeout,
        }
    }

    async fn run(&self, image: &UploadedImage) -> Result<SkinToneReading, AnalyzerError> {
        let mut command = Command::new(&self.interpreter);
        command
            .arg(&self.script)
            .arg(&image.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            AnalyzerError::Spawn(format!("Failed to run {}: {}", self.interpreter, e))
        })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AnalyzerError::Failed(format!("Failed to wait for analyzer: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Scripts commonly print their error message on stdout.
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(AnalyzerError::Failed(format!(
                "{} exited with {}: {}",
                self.interpreter, output.status, detail
            )));
        }

        parse_script_output(&stdout)
    }
}

#[async_trait]
impl SkinToneDetector for ScriptSkinToneDetector {
    fn name(&self) -> &str {
        "script"
    }

    #[tracing::instrument(skip(self, image), fields(analyzer = "script", key = %image.key))]
    async fn detect(&self, image: &UploadedImage) -> Result<SkinToneReading, AnalyzerError> {
        let start = Instant::now();
        let reading = with_timeout(self.timeout, self.run(image)).await?;

        tracing::info!(
            label = %reading.label,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Skin tone script finished"
        );

        Ok(reading)
    }
}

/// Parse `label,r,g,b,hex` from the last non-empty line of `stdout`.
pub fn parse_script_output(stdout: &str) -> Result<SkinToneReading, AnalyzerError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| AnalyzerError::MalformedOutput("analyzer printed nothing".to_string()))?;

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 5 {
        return Err(AnalyzerError::MalformedOutput(format!(
            "expected 5 comma-separated fields, got {}: {:?}",
            fields.len(),
            line
        )));
    }

    let label = fields[0];
    if label.is_empty() {
        return Err(AnalyzerError::MalformedOutput("empty skin tone label".to_string()));
    }

    let channel = |name: &str, value: &str| {
        value.parse::<u8>().map_err(|_| {
            AnalyzerError::MalformedOutput(format!("{} channel is not 0-255: {:?}", name, value))
        })
    };
    let rgb = Rgb::new(
        channel("red", fields[1])?,
        channel("green", fields[2])?,
        channel("blue", fields[3])?,
    );

    let hex = fields[4];
    let valid_hex = hex.len() == 7
        && hex.starts_with('#')
        && hex[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid_hex {
        return Err(AnalyzerError::MalformedOutput(format!(
            "invalid hex colour: {:?}",
            hex
        )));
    }

    Ok(SkinToneReading {
        label: label.to_string(),
        rgb,
        hex: hex.to_string(),
    })
}

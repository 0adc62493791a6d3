use std::fmt;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::ffprobe::ffprobe_path;
use termvid_core::error::{Error, Result};
use termvid_core::plan::format_timestamp;
use termvid_core::tools::{CropSpec, VideoTools};

/// Error lines kept for the failure message.
const ERROR_TAIL: usize = 5;

/// [`VideoTools`] backed by the `ffmpeg` and `ffprobe` executables.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegTools;

impl FfmpegTools {
    pub fn new() -> Self {
        Self
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Run an ffmpeg command to completion and return its log lines.
fn run(operation: &'static str, command: &mut FfmpegCommand) -> Result<Vec<String>> {
    log::debug!("executing {operation}: {:?}", command.as_inner());

    let mut child = command
        .spawn()
        .map_err(|e| Error::tool(operation, format!("failed to spawn ffmpeg, is it installed? {e}")))?;

    let events = child.iter().map_err(|e| Error::tool(operation, e))?;
    let mut logs = Vec::new();
    let mut errors = Vec::new();
    for event in events {
        match event {
            FfmpegEvent::Error(line) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                errors.push(line);
            }
            FfmpegEvent::Log(_, line) => logs.push(line),
            _ => {}
        }
    }

    let status = child.wait().map_err(|e| Error::tool(operation, e))?;
    if !status.success() {
        return Err(Error::tool(operation, failure_message(status, &errors)));
    }
    Ok(logs)
}

/// Exit status followed by the last few error lines ffmpeg printed.
fn failure_message(status: impl fmt::Display, errors: &[String]) -> String {
    if errors.is_empty() {
        format!("ffmpeg exited with {status}")
    } else {
        let tail = errors.len().saturating_sub(ERROR_TAIL);
        format!("ffmpeg exited with {status}: {}", errors[tail..].join("; "))
    }
}

/// The last `crop=` token reported by ffmpeg's cropdetect filter.
pub fn parse_cropdetect<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<CropSpec> {
    lines
        .into_iter()
        .filter_map(|line| line.rsplit_once("crop="))
        .filter_map(|(_, rest)| rest.split_whitespace().next())
        .last()
        .and_then(CropSpec::parse)
}

impl VideoTools for FfmpegTools {
    fn resize(&self, input: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
        run(
            "resize",
            FfmpegCommand::new()
                .overwrite()
                .input(path_arg(input))
                .args(["-vf", format!("scale={width}:{height}").as_str()])
                .output(path_arg(output)),
        )
        .map(drop)
    }

    fn detect_crop(&self, input: &Path, probe_frames: u32) -> Result<Option<CropSpec>> {
        let logs = run(
            "crop detection",
            FfmpegCommand::new()
                .input(path_arg(input))
                .args(["-vframes", probe_frames.to_string().as_str(), "-vf", "cropdetect"])
                .format("null")
                .output("-"),
        )?;
        Ok(parse_cropdetect(logs.iter().map(String::as_str)))
    }

    fn crop(&self, input: &Path, output: &Path, spec: &CropSpec) -> Result<()> {
        run(
            "crop",
            FfmpegCommand::new()
                .overwrite()
                .input(path_arg(input))
                .args(["-vf", format!("crop={spec}").as_str()])
                .output(path_arg(output)),
        )
        .map(drop)
    }

    fn probe_duration(&self, input: &Path) -> Result<String> {
        let mut command = Command::new(ffprobe_path());
        command.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]);
        command.arg(input);
        log::debug!("executing duration probe: {command:?}");

        let output = command
            .output()
            .map_err(|e| Error::tool("duration probe", format!("failed to run ffprobe, is it installed? {e}")))?;
        if !output.status.success() {
            return Err(Error::tool(
                "duration probe",
                format!(
                    "ffprobe exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn extract(&self, input: &Path, output: &Path, start: Duration, length: Duration) -> Result<()> {
        run(
            "chunk extraction",
            FfmpegCommand::new()
                .overwrite()
                .args(["-ss", format_timestamp(start).as_str()])
                .input(path_arg(input))
                .args(["-c", "copy", "-t", format_timestamp(length).as_str()])
                .output(path_arg(output)),
        )
        .map(drop)
    }

    fn sample(&self, input: &Path, output_dir: &Path, fps: u32) -> Result<()> {
        run(
            "frame sampling",
            FfmpegCommand::new()
                .overwrite()
                .input(path_arg(input))
                .args(["-vf", format!("fps={fps}").as_str(), "-start_number", "0"])
                .output(path_arg(&output_dir.join("%d.jpg"))),
        )
        .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cropdetect_takes_last_report() {
        let logs = [
            "[Parsed_cropdetect_0 @ 0x55d] x1:0 x2:79 y1:8 y2:51 w:80 h:44 x:0 y:8 pts:0 t:0.000000 crop=80:44:0:8",
            "frame=    1 fps=0.0 q=-0.0 size=N/A",
            "[Parsed_cropdetect_0 @ 0x55d] x1:0 x2:79 y1:6 y2:53 w:80 h:48 x:0 y:6 pts:512 t:0.040000 crop=80:48:0:6",
        ];
        assert_eq!(parse_cropdetect(logs).unwrap().as_str(), "80:48:0:6");
    }

    #[test]
    fn failure_message_keeps_the_last_errors() {
        let errors: Vec<String> = (1..=7).map(|i| format!("error {i}")).collect();
        assert_eq!(
            failure_message("exit status: 1", &errors),
            "ffmpeg exited with exit status: 1: error 3; error 4; error 5; error 6; error 7"
        );
        assert_eq!(
            failure_message("exit status: 1", &errors[..2]),
            "ffmpeg exited with exit status: 1: error 1; error 2"
        );
    }

    #[test]
    fn failure_message_without_errors() {
        assert_eq!(failure_message("exit status: 234", &[]), "ffmpeg exited with exit status: 234");
    }

    #[test]
    fn cropdetect_without_report_is_none() {
        let logs = ["Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'scaled.mp4':", "  Duration: 00:00:23.70"];
        assert!(parse_cropdetect(logs).is_none());
        assert!(parse_cropdetect(["something crop="]).is_none());
    }
}

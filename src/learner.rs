/*!
# Learner
Runs the external network learner once per variant folder.
The learner is an opaque shell script that reads `input.txt` plus the filter lists from a folder and
writes `model_averaging_probabilities.txt` back into it.
Each run is independent, so callers are free to run them in parallel.
*/
use anyhow::Context;
use derive_builder::Builder;
use log::{debug, trace, warn};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::data_types::variant_id::{VariantFamily, VariantId};
use crate::data_types::work_layout::{LOG_FILENAME, RESULT_FILENAME};

#[derive(thiserror::Error, Debug)]
pub enum LearnerError {
    #[error("failed to launch learner for {family} variant {variant}")]
    Spawn { variant: VariantId, family: VariantFamily, #[source] source: std::io::Error },
    #[error("learner for {family} variant {variant} exited with {status}, see {log_path:?}")]
    ExitStatus { variant: VariantId, family: VariantFamily, status: ExitStatus, log_path: PathBuf },
    #[error("learner for {family} variant {variant} exceeded {timeout:?}")]
    Timeout { variant: VariantId, family: VariantFamily, timeout: Duration },
    #[error("learner for {family} variant {variant} finished without writing {path:?}")]
    MissingOutput { variant: VariantId, family: VariantFamily, path: PathBuf },
}

impl LearnerError {
    /// The family of the variant whose run failed
    pub fn family(&self) -> VariantFamily {
        match self {
            LearnerError::Spawn { family, .. } |
            LearnerError::ExitStatus { family, .. } |
            LearnerError::Timeout { family, .. } |
            LearnerError::MissingOutput { family, .. } => *family
        }
    }

    /// The variant whose run failed
    pub fn variant(&self) -> VariantId {
        match self {
            LearnerError::Spawn { variant, .. } |
            LearnerError::ExitStatus { variant, .. } |
            LearnerError::Timeout { variant, .. } |
            LearnerError::MissingOutput { variant, .. } => *variant
        }
    }
}

/// The families with at least one failed learner run; none of their outputs can be trusted
pub fn failed_families(failures: &[LearnerError]) -> BTreeSet<VariantFamily> {
    failures.iter()
        .map(|e| e.family())
        .collect()
}

/// Controls how the learner gets invoked
#[derive(Builder, Clone, Debug)]
#[builder(default)]
pub struct LearnerConfig {
    /// The rendered run script
    script: PathBuf,
    /// Interpreter used to run the script
    shell: String,
    /// Runs longer than this are killed; `None` waits forever
    timeout: Option<Duration>,
    /// How often a running learner gets checked against the timeout
    poll_interval: Duration
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::default(),
            shell: "sh".to_string(),
            timeout: None,
            poll_interval: Duration::from_millis(100)
        }
    }
}

impl LearnerConfig {
    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// A successful learner run
#[derive(Clone, Debug)]
pub struct LearnerOutput {
    variant: VariantId,
    family: VariantFamily,
    /// The probability matrix written by the learner
    result_path: PathBuf,
    /// Wall time of the run
    elapsed: Duration
}

impl LearnerOutput {
    pub fn variant(&self) -> VariantId {
        self.variant
    }

    pub fn family(&self) -> VariantFamily {
        self.family
    }

    pub fn result_path(&self) -> &Path {
        &self.result_path
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Returns the replacement for a `k=<integer>` assignment line, `None` for any other line
fn render_line(line: &str, k: usize) -> Option<String> {
    let value = line.strip_prefix("k=")?;
    if !value.is_empty() && value.trim_end().chars().all(|c| c.is_ascii_digit()) {
        Some(format!("k={k}"))
    } else {
        None
    }
}

/// Copies the learner run script template, replacing every `k=<integer>` line with the requested `k`.
/// # Arguments
/// * `template` - the run script shipped with the learner
/// * `k` - the learner width parameter
/// * `out_filename` - where to write the rendered script
/// # Errors
/// * if the template cannot be read or the output cannot be written
pub fn render_run_script(template: &Path, k: usize, out_filename: &Path) -> anyhow::Result<()> {
    let reader = BufReader::new(
        File::open(template)
            .with_context(|| format!("Error while opening {template:?}:"))?
    );
    let mut writer = BufWriter::new(
        File::create(out_filename)
            .with_context(|| format!("Error while creating {out_filename:?}:"))?
    );

    let mut replaced = 0;
    for line in reader.lines() {
        let line = line.with_context(|| format!("Error while reading {template:?}:"))?;
        match render_line(&line, k) {
            Some(rendered) => {
                writeln!(writer, "{rendered}")?;
                replaced += 1;
            },
            None => writeln!(writer, "{line}")?
        }
    }
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;

    if replaced == 0 {
        warn!("No \"k=\" line found in {template:?}, the learner will use its own default");
    }
    debug!("Rendered {template:?} to {out_filename:?} with k={k}");
    Ok(())
}

/// Deletes a result file left behind by an earlier run, a missing file is fine
fn remove_result(result_path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(result_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
    }
}

/// Starts the learner in its own process group so a timeout can stop everything the script launched
#[cfg(unix)]
fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_command: &mut Command) {}

/// Kills the learner and anything it started, then reaps it
fn kill_learner(child: &mut Child) {
    #[cfg(unix)]
    {
        // the group id equals the child pid because of `isolate_process_group`
        let group = format!("-{}", child.id());
        if let Err(e) = Command::new("kill").args(["-KILL", "--", &group]).status() {
            warn!("Failed to kill process group {group}: {e}");
        }
    }
    // the process may exit on its own between the check and the kill
    let _ = child.kill();
    let _ = child.wait();
}

/// Runs the learner on one prepared variant folder and waits for it.
/// stdout and stderr both go to the log file inside the folder, which is truncated first.
/// Any result file from an earlier run is deleted before launch, and again if this run fails,
/// so only output written by a successful run is left behind.
/// # Arguments
/// * `config` - script, interpreter, and timeout
/// * `variant` - identity of the variant, used for reporting
/// * `family` - input layout of the variant, used for reporting
/// * `variant_dir` - the folder containing `input.txt` and the filter lists
/// # Errors
/// * if the process cannot be started or waited on
/// * if the process exits non-zero, times out, or does not produce the result file
pub fn run_learner(config: &LearnerConfig, variant: VariantId, family: VariantFamily, variant_dir: &Path) -> Result<LearnerOutput, LearnerError> {
    let spawn_error = |source| LearnerError::Spawn { variant, family, source };
    let result_path = variant_dir.join(RESULT_FILENAME);
    remove_result(&result_path).map_err(spawn_error)?;

    let log_path = variant_dir.join(LOG_FILENAME);
    let log_file = File::create(&log_path).map_err(spawn_error)?;
    let err_file = log_file.try_clone().map_err(spawn_error)?;

    trace!("Launching {} {:?} {variant_dir:?}", config.shell, config.script);
    let start_time = Instant::now();
    let mut command = Command::new(&config.shell);
    command.arg(&config.script)
        .arg(variant_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(err_file));
    isolate_process_group(&mut command);
    let mut child = command.spawn().map_err(spawn_error)?;

    let status = match config.timeout {
        Some(timeout) => {
            loop {
                if let Some(status) = child.try_wait().map_err(spawn_error)? {
                    break status;
                }
                if start_time.elapsed() >= timeout {
                    kill_learner(&mut child);
                    remove_result(&result_path).map_err(spawn_error)?;
                    return Err(LearnerError::Timeout { variant, family, timeout });
                }
                std::thread::sleep(config.poll_interval);
            }
        },
        None => child.wait().map_err(spawn_error)?
    };
    let elapsed = start_time.elapsed();

    if !status.success() {
        remove_result(&result_path).map_err(spawn_error)?;
        return Err(LearnerError::ExitStatus { variant, family, status, log_path });
    }

    if !result_path.exists() {
        return Err(LearnerError::MissingOutput { variant, family, path: result_path });
    }

    debug!("Learner for {family} variant {variant} finished in {} seconds", elapsed.as_secs_f64());
    Ok(LearnerOutput {
        variant, family, result_path, elapsed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_families() {
        let failures = vec![
            LearnerError::MissingOutput { variant: VariantId::knockout(1, 1), family: VariantFamily::GenesOnly, path: PathBuf::from("a") },
            LearnerError::Timeout { variant: VariantId::baseline(), family: VariantFamily::GenesOnly, timeout: Duration::from_secs(1) },
        ];
        let families = failed_families(&failures);
        assert!(families.contains(&VariantFamily::GenesOnly));
        assert!(!families.contains(&VariantFamily::Full));
        assert!(failed_families(&[]).is_empty());
    }

    #[test]
    fn test_render_line() {
        assert_eq!(render_line("k=100", 20), Some("k=20".to_string()));
        assert_eq!(render_line("k=5", 7), Some("k=7".to_string()));
        assert_eq!(render_line("k=", 20), None);
        assert_eq!(render_line("k=$1", 20), None);
        assert_eq!(render_line("kk=100", 20), None);
        assert_eq!(render_line("echo k=100", 20), None);
    }

    #[test]
    fn test_render_run_script() {
        let work = tempfile::tempdir().unwrap();
        let template = work.path().join("run.sh");
        std::fs::write(&template, "#!/bin/sh\nk=100\necho $k\n").unwrap();
        let rendered = work.path().join("expr_run-20.sh");
        render_run_script(&template, 20, &rendered).unwrap();
        assert_eq!(std::fs::read_to_string(&rendered).unwrap(), "#!/bin/sh\nk=20\necho $k\n");
    }

    /// Writes a learner script into `folder` and returns a config that runs it
    #[cfg(unix)]
    fn mock_learner(folder: &Path, body: &str, timeout: Option<Duration>) -> LearnerConfig {
        let script = folder.join("learner.sh");
        std::fs::write(&script, body).unwrap();
        LearnerConfigBuilder::default()
            .script(script)
            .timeout(timeout)
            .poll_interval(Duration::from_millis(10))
            .build().unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_run_learner_success() {
        let work = tempfile::tempdir().unwrap();
        let variant_dir = work.path().join("expr_N1-1-20");
        std::fs::create_dir_all(&variant_dir).unwrap();
        let config = mock_learner(work.path(), "echo learning\nprintf 'a\\tb\\n0.5\\t0.5\\n' > \"$1/model_averaging_probabilities.txt\"\n", None);

        let variant = VariantId::knockout(1, 1);
        let output = run_learner(&config, variant, VariantFamily::Full, &variant_dir).unwrap();
        assert_eq!(output.variant(), variant);
        assert_eq!(output.family(), VariantFamily::Full);
        assert_eq!(output.result_path(), variant_dir.join(RESULT_FILENAME));
        assert!(std::fs::read_to_string(variant_dir.join(LOG_FILENAME)).unwrap().contains("learning"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_learner_failure() {
        let work = tempfile::tempdir().unwrap();
        let variant_dir = work.path().join("expr_N0-0-20");
        std::fs::create_dir_all(&variant_dir).unwrap();
        let config = mock_learner(work.path(), "echo broken >&2\nexit 3\n", None);

        let result = run_learner(&config, VariantId::baseline(), VariantFamily::GenesOnly, &variant_dir);
        match result {
            Err(LearnerError::ExitStatus { variant, family, status, .. }) => {
                assert!(variant.is_baseline());
                assert_eq!(family, VariantFamily::GenesOnly);
                assert_eq!(status.code(), Some(3));
            },
            other => panic!("unexpected result: {other:?}")
        }
        assert!(std::fs::read_to_string(variant_dir.join(LOG_FILENAME)).unwrap().contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_learner_missing_output() {
        let work = tempfile::tempdir().unwrap();
        let variant_dir = work.path().join("expr_N2-1-20");
        std::fs::create_dir_all(&variant_dir).unwrap();
        let config = mock_learner(work.path(), "exit 0\n", None);

        let result = run_learner(&config, VariantId::knockout(2, 1), VariantFamily::Full, &variant_dir);
        let error = result.unwrap_err();
        assert!(matches!(error, LearnerError::MissingOutput { .. }));
        assert_eq!(error.variant(), VariantId::knockout(2, 1));
        assert_eq!(error.family(), VariantFamily::Full);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_learner_ignores_earlier_result() {
        let work = tempfile::tempdir().unwrap();
        let variant_dir = work.path().join("expr_N1-1-20");
        std::fs::create_dir_all(&variant_dir).unwrap();
        std::fs::write(variant_dir.join(RESULT_FILENAME), "a\tb\n0.5\t0.5\n").unwrap();
        std::fs::write(variant_dir.join(LOG_FILENAME), "old log\n").unwrap();
        let config = mock_learner(work.path(), "exit 0\n", None);

        let result = run_learner(&config, VariantId::knockout(1, 1), VariantFamily::Full, &variant_dir);
        assert!(matches!(result, Err(LearnerError::MissingOutput { .. })));
        assert!(!variant_dir.join(RESULT_FILENAME).exists());
        assert_eq!(std::fs::read_to_string(variant_dir.join(LOG_FILENAME)).unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_learner_failure_removes_result() {
        let work = tempfile::tempdir().unwrap();
        let variant_dir = work.path().join("expr_N2-2-20");
        std::fs::create_dir_all(&variant_dir).unwrap();
        // the learner writes a result and then fails
        let config = mock_learner(work.path(), "echo partial > \"$1/model_averaging_probabilities.txt\"\nexit 1\n", None);

        let result = run_learner(&config, VariantId::knockout(2, 2), VariantFamily::GenesOnly, &variant_dir);
        assert!(matches!(result, Err(LearnerError::ExitStatus { .. })));
        assert!(!variant_dir.join(RESULT_FILENAME).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_learner_timeout_stops_children() {
        let work = tempfile::tempdir().unwrap();
        let variant_dir = work.path().join("expr_N2-1-20");
        std::fs::create_dir_all(&variant_dir).unwrap();
        // a background child would write the result after the timeout if it survived
        let config = mock_learner(
            work.path(),
            "(sleep 1; echo late > \"$1/model_averaging_probabilities.txt\") &\nwait\n",
            Some(Duration::from_millis(100))
        );

        let result = run_learner(&config, VariantId::knockout(2, 1), VariantFamily::Full, &variant_dir);
        assert!(matches!(result, Err(LearnerError::Timeout { .. })));
        std::thread::sleep(Duration::from_millis(1500));
        assert!(!variant_dir.join(RESULT_FILENAME).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_learner_timeout() {
        let work = tempfile::tempdir().unwrap();
        let variant_dir = work.path().join("expr_N1-2-20");
        std::fs::create_dir_all(&variant_dir).unwrap();
        let config = mock_learner(work.path(), "sleep 5\n", Some(Duration::from_millis(100)));

        let start_time = Instant::now();
        let result = run_learner(&config, VariantId::knockout(1, 2), VariantFamily::Full, &variant_dir);
        assert!(matches!(result, Err(LearnerError::Timeout { .. })));
        assert!(start_time.elapsed() < Duration::from_secs(5));
    }
}

/// CSV sample log
///
/// One header row, then one row per refresh cycle: the cycle time followed by
/// the in/out rate of every displayed interface.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::error::MonitorError;
use crate::utils::short_if_name;

pub struct SampleRecorder<W: Write> {
    writer: W,
    header_written: bool,
}

impl SampleRecorder<BufWriter<File>> {
    /// Create (truncate) the log file. Failure here is fatal at startup.
    pub fn create(path: &Path) -> Result<Self, MonitorError> {
        let file = File::create(path).map_err(|source| MonitorError::LogDestination {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "sample log opened");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> SampleRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Write the column names. Only the first call has any effect.
    pub fn write_header(&mut self, columns: &[String]) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.write_line(columns)?;
        self.header_written = true;
        Ok(())
    }

    pub fn write_row(&mut self, values: &[String]) -> io::Result<()> {
        self.write_line(values)
    }

    fn write_line(&mut self, fields: &[String]) -> io::Result<()> {
        let line = fields
            .iter()
            .map(|f| csv_field(f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Relative log names land under `directory` when one is configured
pub fn resolve_log_path(name: &Path, directory: Option<&Path>) -> PathBuf {
    match directory {
        Some(dir) if name.is_relative() => dir.join(name),
        _ => name.to_path_buf(),
    }
}

/// Header row for the given interfaces
pub fn log_columns<'a, I>(interfaces: I, include_errors: bool) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut columns = vec!["time".to_string()];
    for name in interfaces {
        let short = short_if_name(name);
        columns.push(format!("{}-in", short));
        columns.push(format!("{}-out", short));
        if include_errors {
            columns.push(format!("{}-inerr", short));
            columns.push(format!("{}-outerr", short));
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_header_written_once() {
        let mut recorder = SampleRecorder::new(Vec::new());
        let header = vec!["time".to_string(), "Eth1/1-in".to_string()];
        recorder.write_header(&header).unwrap();
        recorder.write_header(&header).unwrap();
        recorder
            .write_row(&["10:00:00".to_string(), "1.5".to_string()])
            .unwrap();
        assert!(recorder.header_written());

        let text = String::from_utf8(recorder.into_inner()).unwrap();
        assert_eq!(text, "time,Eth1/1-in\n10:00:00,1.5\n");
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_log_columns() {
        let columns = log_columns(["Ethernet1/1", "port-channel2"], false);
        assert_eq!(columns, vec!["time", "Eth1/1-in", "Eth1/1-out", "Po2-in", "Po2-out"]);

        let with_errors = log_columns(["Ethernet1/1"], true);
        assert_eq!(
            with_errors,
            vec!["time", "Eth1/1-in", "Eth1/1-out", "Eth1/1-inerr", "Eth1/1-outerr"]
        );
    }

    #[test]
    fn test_create_and_write_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("intperf.csv");
        let mut recorder = SampleRecorder::create(&path).unwrap();
        recorder.write_header(&["time".to_string()]).unwrap();
        recorder.write_row(&["12:00:00".to_string()]).unwrap();
        drop(recorder);

        assert_eq!(fs::read_to_string(&path).unwrap(), "time\n12:00:00\n");
    }

    #[test]
    fn test_create_unwritable_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("intperf.csv");
        let err = SampleRecorder::create(&path).err().unwrap();
        assert!(matches!(err, MonitorError::LogDestination { .. }));
    }

    #[test]
    fn test_resolve_log_path() {
        let dir = Path::new("/bootflash");
        assert_eq!(
            resolve_log_path(Path::new("intperf.csv"), Some(dir)),
            PathBuf::from("/bootflash/intperf.csv")
        );
        assert_eq!(
            resolve_log_path(Path::new("/tmp/x.csv"), Some(dir)),
            PathBuf::from("/tmp/x.csv")
        );
        assert_eq!(
            resolve_log_path(Path::new("x.csv"), None),
            PathBuf::from("x.csv")
        );
    }
}

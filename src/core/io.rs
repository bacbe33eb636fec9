use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if ext == "gz" {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| "failed to read magic bytes")?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

/// Opens a report, decompressing it when it is gzipped.
pub fn open_report(path: &Path) -> Result<Box<dyn Read>> {
    let kind = detect_input_kind(path)?;
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let reader: Box<dyn Read> = match kind {
        InputKind::Plain => Box::new(reader),
        InputKind::Gzip => Box::new(MultiGzDecoder::new(reader)),
    };
    Ok(reader)
}

/// `run_01.txt` -> `run_01`, `run_01.txt.gz` -> `run_01`.
pub fn report_base_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("failed to determine file name of {}", path.display()))?;
    let name = strip_suffix_ci(name, ".gz").unwrap_or(name);
    let base = match strip_suffix_ci(name, ".txt") {
        Some(stem) => stem,
        None => Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name),
    };
    Ok(base.to_string())
}

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    if s.len() > suffix.len() && s.is_char_boundary(s.len() - suffix.len()) {
        let (head, tail) = s.split_at(s.len() - suffix.len());
        if tail.eq_ignore_ascii_case(suffix) {
            return Some(head);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn base_name_strips_report_extensions() {
        let b = |p: &str| report_base_name(Path::new(p)).unwrap();
        assert_eq!(b("/data/run_01.txt"), "run_01");
        assert_eq!(b("run_01.TXT.gz"), "run_01");
        assert_eq!(b("plate.tsv"), "plate");
        assert_eq!(b("noext"), "noext");
    }

    #[test]
    fn reads_plain_and_gzip_reports() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("a.txt");
        std::fs::write(&plain, b"hello").unwrap();

        let gz = dir.path().join("b.dat");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(b"hello").unwrap();
        enc.finish().unwrap();

        assert_eq!(detect_input_kind(&plain).unwrap(), InputKind::Plain);
        assert_eq!(detect_input_kind(&gz).unwrap(), InputKind::Gzip);

        for path in [&plain, &gz] {
            let mut s = String::new();
            open_report(path).unwrap().read_to_string(&mut s).unwrap();
            assert_eq!(s, "hello");
        }
    }
}

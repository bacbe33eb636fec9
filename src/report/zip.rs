use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Packs `<out_root>/<base>/` into `<out_root>/<base>.zip`. The archive is
/// written under a temporary name and only renamed once complete.
pub fn write_bundle(out_root: &Path, base: &str) -> Result<()> {
    let zip_name = format!("{}.zip", base);
    let zip_path = out_root.join(&zip_name);
    let tmp_path = out_root.join(format!("{}.tmp", zip_name));

    let file = File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let result = write_bundle_entries(&mut zip, out_root, base);

    match result.and_then(|_| zip.finish().with_context(|| "failed to finalize zip")) {
        Ok(_) => {
            fs::rename(&tmp_path, &zip_path)
                .with_context(|| format!("failed to move zip to {}", zip_path.display()))?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn write_bundle_entries(zip: &mut ZipWriter<File>, out_root: &Path, base: &str) -> Result<()> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    zip.add_directory(format!("{}/", base), options)
        .with_context(|| "failed to add directory entry to zip")?;

    let dir = out_root.join(base);
    let mut names = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();

    for name in names {
        let src_path = dir.join(&name);
        let zip_path = format!("{}/{}", base, name);
        add_file(zip, &src_path, &zip_path, options)
            .with_context(|| format!("failed to add {} to zip", name))?;
    }
    Ok(())
}

fn add_file(
    zip: &mut ZipWriter<File>,
    src_path: &Path,
    zip_path: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let mut file =
        File::open(src_path).with_context(|| format!("failed to open {}", src_path.display()))?;
    zip.start_file(zip_path, options)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        zip.write_all(&buf[..n])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn bundles_every_file_of_a_report() {
        let root = tempdir().unwrap();
        let dir = root.path().join("run_01");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("run_01_x.csv"), "Well,Area\n").unwrap();
        fs::write(dir.join("run_01_x.png"), [0x89, b'P', b'N', b'G']).unwrap();

        write_bundle(root.path(), "run_01").unwrap();

        let zip_path = root.path().join("run_01.zip");
        assert!(zip_path.is_file());
        assert!(!root.path().join("run_01.zip.tmp").exists());

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(|s| s.to_string()).collect();
        names.sort();
        assert_eq!(names, ["run_01/", "run_01/run_01_x.csv", "run_01/run_01_x.png"]);

        let mut s = String::new();
        archive
            .by_name("run_01/run_01_x.csv")
            .unwrap()
            .read_to_string(&mut s)
            .unwrap();
        assert_eq!(s, "Well,Area\n");
    }
}

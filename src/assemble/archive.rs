//! tar.gz extraction and deterministic packaging.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Unpack a `.tar.gz` into `dest`, creating it.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("creating '{}'", dest.display()))?;
    let file = File::open(archive).with_context(|| format!("opening '{}'", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tar.set_preserve_permissions(true);
    tar.unpack(dest)
        .with_context(|| format!("unpacking '{}' into '{}'", archive.display(), dest.display()))
}

/// The single top-level directory of an extracted distribution.
pub fn single_top_level_dir(dir: &Path) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading '{}'", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    match dirs.as_slice() {
        [only] => Ok(only.clone()),
        [] => bail!("no directory found in '{}'", dir.display()),
        _ => bail!(
            "expected one top-level directory in '{}', found {}",
            dir.display(),
            dirs.len()
        ),
    }
}

/// Pack `src_dir` into `out_path` as gzip-compressed tar.
///
/// Entries are stored under `src_dir`'s own name, sorted, with zero mtime,
/// uid and gid, so identical trees give identical archives.
pub fn create_tar_gz(src_dir: &Path, out_path: &Path) -> Result<()> {
    let Some(top) = src_dir.file_name() else {
        bail!("cannot package '{}': no directory name", src_dir.display());
    };
    let top = top.to_string_lossy().into_owned();

    let out = File::create(out_path)
        .with_context(|| format!("creating '{}'", out_path.display()))?;
    let mut builder = tar::Builder::new(GzEncoder::new(out, Compression::default()));

    let mut entries: Vec<PathBuf> = vec![];
    for entry in WalkDir::new(src_dir).follow_links(false) {
        let entry = entry.with_context(|| format!("walking '{}'", src_dir.display()))?;
        entries.push(entry.into_path());
    }
    entries.sort_by(|a, b| {
        let ra = a.strip_prefix(src_dir).unwrap_or(a).to_string_lossy();
        let rb = b.strip_prefix(src_dir).unwrap_or(b).to_string_lossy();
        ra.cmp(&rb)
    });

    for path in entries {
        let rel = path.strip_prefix(src_dir).unwrap_or(&path);
        let name = if rel.as_os_str().is_empty() {
            top.clone()
        } else {
            format!("{top}/{}", rel.to_string_lossy().replace('\\', "/"))
        };

        let md = fs::symlink_metadata(&path)?;
        let mut header = tar::Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mode(mode_of(&md));

        if md.is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_cksum();
            builder.append_data(&mut header, &name, std::io::empty())?;
        } else if md.file_type().is_symlink() {
            let target = fs::read_link(&path)?;
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_size(0);
            header.set_link_name(&target)?;
            header.set_cksum();
            builder.append_data(&mut header, &name, std::io::empty())?;
        } else if md.is_file() {
            let mut file = File::open(&path)?;
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(md.len());
            header.set_cksum();
            builder.append_data(&mut header, &name, &mut file)?;
        }
    }

    let encoder = builder
        .into_inner()
        .with_context(|| format!("finalizing '{}'", out_path.display()))?;
    encoder.finish()?;
    Ok(())
}

#[cfg(unix)]
fn mode_of(md: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    md.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(md: &fs::Metadata) -> u32 {
    if md.is_dir() {
        0o755
    } else {
        0o644
    }
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("opening '{}'", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Write `<file>.sha256` next to `path` in `sha256sum` format.
pub fn write_sha256_sidecar(path: &Path) -> Result<PathBuf> {
    let digest = sha256_file(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sidecar = path.with_file_name(format!("{name}.sha256"));
    fs::write(&sidecar, format!("{digest}  {name}\n"))
        .with_context(|| format!("writing '{}'", sidecar.display()))?;
    Ok(sidecar)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs::File;
    use std::path::{Path, PathBuf};

    use flate2::write::GzEncoder;
    use flate2::Compression;

    /// A `.tar.gz` at `dir/name` with the given regular files.
    pub(crate) fn tar_gz_with(dir: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        let mut builder =
            tar::Builder::new(GzEncoder::new(File::create(&path).unwrap(), Compression::default()));
        for (entry, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, entry, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
        path
    }
}

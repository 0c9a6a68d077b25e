// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! SVG rendering of the two comparison charts.
//!
//! Charts are rendered into memory first and only then written to disk, so a
//! failed render never touches the output path.

mod bar;
mod scales;
mod scatter;

pub use bar::{Bar, BarChart, BarLayout, BAR_WIDTH};
pub use scales::{log_bounds, PhaseCoord};
pub use scatter::{ScatterChart, ScatterLayout};

use crate::error::Result;
use crate::table::Architecture;

use logger::*;
use plotters::style::RGBColor;

use tempfile::NamedTempFile;

use std::io::Write;
use std::path::{Path, PathBuf};

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[hexcolour!(0xAA0000), hexcolour!(0x0000FF)];

/// Series colour for an architecture.
pub fn colour(arch: Architecture) -> RGBColor {
    match arch {
        Architecture::Cpu => COLOURS[0],
        Architecture::Gpu => COLOURS[1],
    }
}

/// Output contents written and synced to a temporary file next to its
/// destination, not yet visible under the final name.
pub struct Staged {
    file: NamedTempFile,
    path: PathBuf,
}

impl Staged {
    /// Write `contents` to a temporary file in the directory of `path`.
    pub fn new<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<Self> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::Builder::new()
            .prefix(".canny-plot")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        file.write_all(contents)?;
        file.as_file().sync_all()?;
        debug!("staged {} bytes for {}", contents.len(), path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename into place. Replaces any existing file.
    pub fn commit(self) -> Result<PathBuf> {
        self.file.persist(&self.path).map_err(|e| e.error)?;
        Ok(self.path)
    }
}

/// Stage every output, then rename them into place. Nothing is renamed
/// unless every output was staged; dropped staged files are removed.
pub fn write_all_atomic<P: AsRef<Path>>(outputs: &[(P, &[u8])]) -> Result<Vec<PathBuf>> {
    let staged = outputs
        .iter()
        .map(|(path, contents)| Staged::new(path, contents))
        .collect::<Result<Vec<Staged>>>()?;
    staged.into_iter().map(Staged::commit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn architectures_have_distinct_colours() {
        let RGBColor(r, g, b) = colour(Architecture::Cpu);
        assert_eq!((r, g, b), (0xAA, 0x00, 0x00));
        let RGBColor(r, g, b) = colour(Architecture::Gpu);
        assert_eq!((r, g, b), (0x00, 0x00, 0xFF));
    }

    #[test]
    fn commit_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        std::fs::write(&path, b"old").unwrap();

        let staged = Staged::new(&path, b"<svg/>").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"old");
        assert_eq!(staged.commit().unwrap(), path);
        assert_eq!(std::fs::read(&path).unwrap(), b"<svg/>");

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn nothing_is_committed_when_one_output_cannot_be_staged() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("bar.svg");
        let second = dir.path().join("missing").join("scatter.svg");

        let outputs: [(&Path, &[u8]); 2] = [(&first, b"<svg/>"), (&second, b"<svg/>")];
        assert!(write_all_atomic(&outputs).is_err());
        assert!(!first.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_all_atomic_commits_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("bar.svg");
        let second = dir.path().join("scatter.svg");

        let outputs: [(&Path, &[u8]); 2] = [(&first, b"bar"), (&second, b"scatter")];
        let written = write_all_atomic(&outputs).unwrap();
        assert_eq!(written, vec![first.clone(), second.clone()]);
        assert_eq!(std::fs::read(&first).unwrap(), b"bar");
        assert_eq!(std::fs::read(&second).unwrap(), b"scatter");
    }

    #[test]
    fn staging_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.svg");
        assert!(Staged::new(&path, b"<svg/>").is_err());
        assert!(!path.exists());
    }
}

use std::path::{Path, PathBuf};

use crate::render::Interpolation;

/// Directory holding `input`; `.` for a bare file name.
pub fn output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// File name of `input` without its extension.
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "histogram".to_string())
}

// ---------------------------------------------------------------------------
// OutputPlan – every image one run may write
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OutputPlan {
    /// `<base>_<mode>.png`
    pub selected: PathBuf,
    /// `<base>_compare_<mode>.png`, one per comparison mode.
    pub comparison: Vec<(Interpolation, PathBuf)>,
    /// `<base>_smoothed.png`, if requested.
    pub smoothed: Option<PathBuf>,
}

impl OutputPlan {
    pub fn new(
        input: &Path,
        selected: Interpolation,
        comparison: &[Interpolation],
        smoothed: bool,
    ) -> Self {
        let dir = output_dir(input);
        let base = base_name(input);
        OutputPlan {
            selected: dir.join(format!("{base}_{selected}.png")),
            comparison: comparison
                .iter()
                .map(|&mode| (mode, dir.join(format!("{base}_compare_{mode}.png"))))
                .collect(),
            smoothed: smoothed.then(|| dir.join(format!("{base}_smoothed.png"))),
        }
    }

    pub fn paths(&self) -> Vec<&Path> {
        std::iter::once(self.selected.as_path())
            .chain(self.comparison.iter().map(|(_, p)| p.as_path()))
            .chain(self.smoothed.as_deref())
            .collect()
    }
}

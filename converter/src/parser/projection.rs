//! Fixed column projection.
//!
//! The same projector is applied to the header and to every record, so
//! `header[i]` always names `fields[i]`.

/// Retained PadChest columns: source index and expected header name.
///
/// Index 0 becomes the `Identifiant` attribute of `<image>`.
pub const PADCHEST_COLUMNS: [(usize, &str); 17] = [
    (0, "ImageID"),
    (1, "ImageDir"),
    (2, "StudyID"),
    (4, "PatientID"),
    (5, "PatientBirth"),
    (6, "PatientSex_DICOM"),
    (9, "Projection"),
    (10, "MethodProjection"),
    (11, "MethodLabel"),
    (28, "ViewPosition"),
    (29, "Labels"),
    (30, "Localizations"),
    (31, "LabelsLocalizationsBySentence"),
    (32, "labelCUIS"),
    (33, "LocalizationsCUIS"),
    (34, "Report"),
    (35, "ReportID"),
];

/// Keeps an ascending set of column indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProjector {
    indices: Vec<usize>,
}

impl ColumnProjector {
    /// Projector over the given indices; duplicates are dropped, order is ascending.
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut indices: Vec<usize> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    /// The PadChest column subset.
    pub fn padchest() -> Self {
        Self::new(PADCHEST_COLUMNS.iter().map(|(index, _)| *index))
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Keep the retained fields, in ascending index order.
    ///
    /// Indices past the end of a short record are skipped.
    pub fn project(&self, fields: Vec<String>) -> Vec<String> {
        fields
            .into_iter()
            .enumerate()
            .filter(|(i, _)| self.indices.binary_search(i).is_ok())
            .map(|(_, field)| field)
            .collect()
    }
}

/// Header names the PadChest projection is expected to produce.
pub fn padchest_header() -> Vec<&'static str> {
    PADCHEST_COLUMNS.iter().map(|(_, name)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn test_padchest_projection() {
        let projector = ColumnProjector::padchest();
        assert_eq!(projector.len(), 17);

        let projected = projector.project(row(36));
        assert_eq!(projected.len(), 17);
        assert_eq!(projected[0], "c0");
        assert_eq!(projected[3], "c4");
        assert_eq!(projected[9], "c28");
        assert_eq!(projected[16], "c35");
    }

    #[test]
    fn test_indices_sorted_and_deduplicated() {
        let projector = ColumnProjector::new([5, 1, 5, 3]);
        assert_eq!(projector.indices(), &[1, 3, 5]);
        assert_eq!(projector.project(row(6)), vec!["c1", "c3", "c5"]);
    }

    #[test]
    fn test_short_record_keeps_available_columns() {
        let projected = ColumnProjector::padchest().project(row(7));
        assert_eq!(projected, vec!["c0", "c1", "c2", "c4", "c5", "c6"]);
    }

    #[test]
    fn test_expected_header_names() {
        let names = padchest_header();
        assert_eq!(names.len(), 17);
        assert_eq!(names[0], "ImageID");
        assert_eq!(names[12], "LabelsLocalizationsBySentence");
        assert_eq!(names[16], "ReportID");
    }
}

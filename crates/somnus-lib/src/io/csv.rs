use super::text::parse_label;
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// Read stage labels from a named column of a delimited file.
///
/// The delimiter is a tab for `.tsv` files and a comma otherwise. Header
/// matching is case-insensitive.
pub fn read_label_column(path: &Path, column: &str) -> Result<Vec<i32>> {
    let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers().context("reading header")?.clone();
    let idx = locate_column(&headers, column)?;

    let mut out = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.context("reading record")?;
        let value = record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| anyhow!("row {} has no {} column", row + 1, column))?;
        if value.is_empty() {
            continue;
        }
        out.push(parse_label(value).with_context(|| format!("row {}", row + 1))?);
    }
    if out.is_empty() {
        anyhow::bail!("column {} of {} holds no labels", column, path.display());
    }
    Ok(out)
}

fn locate_column(headers: &StringRecord, requested: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(requested))
        .ok_or_else(|| {
            anyhow!(
                "column {} not found (available: {})",
                requested,
                headers.iter().collect::<Vec<_>>().join(", ")
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_stage_column_from_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hypno.csv");
        fs::write(&path, "time,Stage\n0,0\n30,1\n60,2\n90,\n120,4\n").unwrap();
        assert_eq!(read_label_column(&path, "stage").unwrap(), vec![0, 1, 2, 4]);
    }

    #[test]
    fn reads_tab_separated_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hypno.tsv");
        fs::write(&path, "onset\tstage\n0\t3\n30\t-1\n").unwrap();
        assert_eq!(read_label_column(&path, "stage").unwrap(), vec![3, -1]);
    }

    #[test]
    fn missing_column_lists_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hypno.csv");
        fs::write(&path, "time,label\n0,0\n").unwrap();
        let err = read_label_column(&path, "stage").unwrap_err();
        assert!(err.to_string().contains("time, label"));
    }
}

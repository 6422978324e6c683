use anyhow::{Context, Result};
use std::path::Path;

/// Parse one stage label. Integral floats such as `2.0` are accepted.
pub fn parse_label(token: &str) -> Result<i32> {
    if let Ok(val) = token.parse::<i32>() {
        return Ok(val);
    }
    let val: f64 = token
        .parse()
        .with_context(|| format!("not a stage label: {}", token))?;
    if val.fract() != 0.0 || val.abs() > i32::MAX as f64 {
        anyhow::bail!("stage label must be an integer: {}", token);
    }
    Ok(val as i32)
}

/// Parse newline-delimited stage labels, ignoring blank/comment lines.
pub fn parse_label_series(text: &str) -> Result<Vec<i32>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val = parse_label(trimmed).with_context(|| format!("line {}", idx + 1))?;
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no stage labels found");
    }
    Ok(out)
}

/// Read newline-delimited stage labels from disk.
pub fn read_label_series(path: &Path) -> Result<Vec<i32>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_label_series(&text)
}

/// Parse newline-delimited floating point values (e.g. a time vector).
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not f64: {}", idx + 1, trimmed))?;
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_with_comments_and_floats() {
        let text = "# stage per sample\n0\n1\n\n2.0\n-1\n4\n";
        assert_eq!(parse_label_series(text).unwrap(), vec![0, 1, 2, -1, 4]);
    }

    #[test]
    fn rejects_fractional_labels() {
        let err = parse_label_series("0\n1.5\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_label_series("# nothing\n\n").is_err());
        assert!(parse_f64_series("").is_err());
    }

    #[test]
    fn parses_time_vector() {
        assert_eq!(parse_f64_series("0\n0.5\n1.0").unwrap(), vec![0.0, 0.5, 1.0]);
    }
}

//! Prometheus text exposition parsing for assertions.
//!
//! Understands the subset of the format the goapp service emits: `# HELP`
//! and `# TYPE` comments, and sample lines with optional quoted labels.

use std::collections::BTreeMap;
use thiserror::Error;

/// Exposition parsing errors.
#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One sample line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

/// A parsed `/metrics` response.
#[derive(Debug, Clone, Default)]
pub struct Scrape {
    /// Family name -> declared type, from `# TYPE` lines.
    pub types: BTreeMap<String, String>,
    /// Family name -> help text, from `# HELP` lines.
    pub help: BTreeMap<String, String>,
    pub samples: Vec<Sample>,
}

impl Scrape {
    /// Parse exposition text.
    pub fn parse(text: &str) -> Result<Self, ExpositionError> {
        let mut scrape = Scrape::default();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("# TYPE ") {
                let (name, kind) = rest.split_once(' ').ok_or_else(|| malformed(line_no, "TYPE without kind"))?;
                scrape.types.insert(name.to_string(), kind.trim().to_string());
                continue;
            }
            if let Some(rest) = line.strip_prefix("# HELP ") {
                let (name, help) = rest.split_once(' ').unwrap_or((rest, ""));
                scrape.help.insert(name.to_string(), help.to_string());
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            scrape.samples.push(parse_sample(line, line_no)?);
        }

        Ok(scrape)
    }

    /// Value of the sample with exactly these labels.
    pub fn value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let wanted: BTreeMap<String, String> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.samples
            .iter()
            .find(|s| s.name == name && s.labels == wanted)
            .map(|s| s.value)
    }

    /// All samples with the given sample name.
    pub fn series(&self, name: &str) -> Vec<&Sample> {
        self.samples.iter().filter(|s| s.name == name).collect()
    }
}

fn malformed(line: usize, reason: &str) -> ExpositionError {
    ExpositionError::Malformed {
        line,
        reason: reason.to_string(),
    }
}

fn parse_sample(line: &str, line_no: usize) -> Result<Sample, ExpositionError> {
    let (series, value) = line
        .rsplit_once(' ')
        .ok_or_else(|| malformed(line_no, "sample without value"))?;

    let value = match value {
        "+Inf" => f64::INFINITY,
        "-Inf" => f64::NEG_INFINITY,
        v => v
            .parse()
            .map_err(|_| malformed(line_no, "value is not a number"))?,
    };

    let (name, labels) = match series.split_once('{') {
        Some((name, rest)) => {
            let body = rest
                .strip_suffix('}')
                .ok_or_else(|| malformed(line_no, "unterminated label set"))?;
            (name, parse_labels(body, line_no)?)
        }
        None => (series, BTreeMap::new()),
    };

    if name.is_empty() {
        return Err(malformed(line_no, "empty metric name"));
    }

    Ok(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

fn parse_labels(body: &str, line_no: usize) -> Result<BTreeMap<String, String>, ExpositionError> {
    let mut labels = BTreeMap::new();
    let mut chars = body.chars().peekable();

    loop {
        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        let key = key.trim_start_matches(',').trim().to_string();
        if key.is_empty() {
            break;
        }
        if chars.next() != Some('"') {
            return Err(malformed(line_no, "label value must be quoted"));
        }

        let mut value = String::new();
        loop {
            match chars.next() {
                Some('\\') => match chars.next() {
                    Some('n') => value.push('\n'),
                    Some(c) => value.push(c),
                    None => return Err(malformed(line_no, "dangling escape")),
                },
                Some('"') => break,
                Some(c) => value.push(c),
                None => return Err(malformed(line_no, "unterminated label value")),
            }
        }
        labels.insert(key, value);

        if chars.peek().is_none() {
            break;
        }
    }

    Ok(labels)
}

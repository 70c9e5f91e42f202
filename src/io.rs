//! Recording metadata input and match report output.
//!
//! Reader: parses the channel tensors of a `raw.safetensors` export
//! (written by the external loader, one row per channel):
//!
//! ```text
//! chan_pos   [C, 3]  F32   electrode positions in metres (NaN = unknown)
//! ch_names   [N]     U8    channel names joined by '\n'
//! ch_kinds   [C]     I32   FIFF channel kinds (optional, default EEG)
//! ```
//!
//! Writer: [`StWriter`] produces the same layout, [`write_report`] dumps the
//! per-montage results and ranking as JSON.
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::info::{ChannelInfo, MeasInfo, FIFFV_EEG_CH};
use crate::matching::MatchResult;
use crate::ranking::Ranking;

// ── Low-level safetensors parser (header JSON + little-endian payloads) ──────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = u64::from_le_bytes(len) as usize;
    let end = 8usize.checked_add(n).filter(|&e| e <= bytes.len())
        .context("safetensors header length exceeds file size")?;
    let header: HashMap<String, serde_json::Value> =
        serde_json::from_slice(&bytes[8..end])
            .context("failed to parse safetensors header")?;
    Ok((header, end))
}

fn payload<'a>(bytes: &'a [u8], data_start: usize, entry: &serde_json::Value) -> Result<&'a [u8]> {
    let offsets = entry["data_offsets"].as_array().context("missing data_offsets")?;
    let s = offsets.first().and_then(|v| v.as_u64()).context("bad data_offsets")? as usize;
    let e = offsets.get(1).and_then(|v| v.as_u64()).context("bad data_offsets")? as usize;
    let start = data_start.checked_add(s).context("data_offsets overflow")?;
    let end = data_start.checked_add(e).context("data_offsets overflow")?;
    bytes.get(start..end).context("tensor payload out of bounds")
}

fn dtype_of(entry: &serde_json::Value) -> &str {
    entry["dtype"].as_str().unwrap_or("")
}

fn shape_of(entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .context("missing shape")?
        .iter()
        .map(|v| v.as_u64().map(|d| d as usize).context("bad shape entry"))
        .collect()
}

fn read_f32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f32>> {
    if dtype_of(entry) != "F32" {
        bail!("expected F32 tensor, got {}", dtype_of(entry));
    }
    Ok(payload(bytes, data_start, entry)?
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn read_i32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<i32>> {
    if dtype_of(entry) != "I32" {
        bail!("expected I32 tensor, got {}", dtype_of(entry));
    }
    Ok(payload(bytes, data_start, entry)?
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Load channel names, positions and kinds from a `raw.safetensors` export.
pub fn load_recording(path: &Path) -> Result<MeasInfo> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_recording(&bytes)
}

/// [`load_recording`] on an in-memory buffer.
pub fn parse_recording(bytes: &[u8]) -> Result<MeasInfo> {
    let (header, data_start) = parse_header(bytes)?;

    let pos_entry = header.get("chan_pos").context("missing 'chan_pos' key")?;
    let pos_shape = shape_of(pos_entry)?;
    if pos_shape.len() != 2 || pos_shape[1] != 3 {
        bail!("chan_pos must have shape [C, 3], got {pos_shape:?}");
    }
    let n_ch = pos_shape[0];
    let n_values = n_ch.checked_mul(3).context("chan_pos shape overflow")?;
    let pos = read_f32_tensor(bytes, data_start, pos_entry)?;
    if pos.len() != n_values {
        bail!("chan_pos holds {} values, expected {n_values}", pos.len());
    }

    let names_entry = header.get("ch_names").context("missing 'ch_names' key")?;
    let raw_str = std::str::from_utf8(payload(bytes, data_start, names_entry)?)
        .context("ch_names is not UTF-8")?;
    let names: Vec<String> = raw_str
        .split('\n')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if names.len() != n_ch {
        bail!("{} channel names for {n_ch} positions", names.len());
    }

    let kinds = match header.get("ch_kinds") {
        Some(e) => {
            let k = read_i32_tensor(bytes, data_start, e)?;
            if k.len() != n_ch {
                bail!("{} channel kinds for {n_ch} positions", k.len());
            }
            k
        }
        None => vec![FIFFV_EEG_CH; n_ch],
    };

    let chs = names
        .into_iter()
        .zip(kinds)
        .zip(pos.chunks_exact(3))
        .map(|((name, kind), p)| ChannelInfo {
            name,
            kind,
            loc: [p[0] as f64, p[1] as f64, p[2] as f64],
        })
        .collect();

    Ok(MeasInfo { chs, dig: Vec::new() })
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors file writer for F32, I32 and newline-joined string
/// tensors.
///
/// Usage:
/// ```rust,no_run
/// use eegmontage::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("chan_pos", &[0.0f32, 0.0, 0.09], &[1, 3]);
/// w.add_names("ch_names", &["Cz"]);
/// w.write(Path::new("/tmp/raw.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I32", shape.to_vec()));
    }

    pub fn add_names(&mut self, name: &str, names: &[&str]) {
        let bytes = names.join("\n").into_bytes();
        let len = bytes.len();
        self.entries.push((name.to_string(), bytes, "U8", vec![len]));
    }

    /// Header + payload bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let mut out = Vec::with_capacity(8 + hdr_bytes.len() + pad + offset);
        out.extend_from_slice(&((hdr_bytes.len() + pad) as u64).to_le_bytes());
        out.extend_from_slice(&hdr_bytes);
        out.extend(std::iter::repeat(b' ').take(pad));
        for (_, data, _, _) in &self.entries {
            out.extend_from_slice(data);
        }
        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)
            .with_context(|| format!("writing {}", path.display()))
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report<'a> {
    results: &'a [MatchResult],
    ranking: Option<&'a Ranking>,
    selected: Option<&'a str>,
}

/// Write results, ranking and the chosen montage as pretty JSON.
///
/// NaN distances serialise as `null`.
pub fn write_report(
    path: &Path,
    results: &[MatchResult],
    ranking: Option<&Ranking>,
    selected: Option<&str>,
) -> Result<()> {
    let json = serde_json::to_vec_pretty(&Report { results, ranking, selected })?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::FIFFV_EOG_CH;

    #[test]
    fn parses_written_recording() {
        let mut w = StWriter::new();
        w.add_f32("chan_pos", &[0.0, 0.0, 0.09, 0.03, 0.09, f32::NAN], &[2, 3]);
        w.add_names("ch_names", &["Cz", "VEOG"]);
        w.add_i32("ch_kinds", &[FIFFV_EEG_CH, FIFFV_EOG_CH], &[2]);
        let info = parse_recording(&w.to_bytes().unwrap()).unwrap();
        assert_eq!(info.ch_names(), vec!["Cz", "VEOG"]);
        assert_eq!(info.chs[1].kind, FIFFV_EOG_CH);
        approx::assert_abs_diff_eq!(info.chs[0].loc[2], 0.09, epsilon = 1e-7);
        assert!(info.chs[1].loc[2].is_nan());
    }

    #[test]
    fn kinds_default_to_eeg() {
        let mut w = StWriter::new();
        w.add_f32("chan_pos", &[0.0, 0.0, 0.09], &[1, 3]);
        w.add_names("ch_names", &["Cz"]);
        let info = parse_recording(&w.to_bytes().unwrap()).unwrap();
        assert_eq!(info.chs[0].kind, FIFFV_EEG_CH);
    }

    #[test]
    fn name_count_mismatch_is_error() {
        let mut w = StWriter::new();
        w.add_f32("chan_pos", &[0.0; 6], &[2, 3]);
        w.add_names("ch_names", &["Cz"]);
        assert!(parse_recording(&w.to_bytes().unwrap()).is_err());
    }

    #[test]
    fn truncated_file_is_error() {
        assert!(parse_recording(&[1, 2, 3]).is_err());
        let mut bytes = 1000u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        assert!(parse_recording(&bytes).is_err());
    }

    fn with_header(header: &str) -> Vec<u8> {
        let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&[0u8; 12]);
        bytes
    }

    #[test]
    fn oversized_offsets_are_error() {
        let bytes = with_header(
            r#"{"chan_pos":{"dtype":"F32","shape":[1,3],"data_offsets":[0,18446744073709551615]}}"#,
        );
        let err = parse_recording(&bytes).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn oversized_shape_is_error() {
        let bytes = with_header(
            r#"{"chan_pos":{"dtype":"F32","shape":[6148914691236517206,3],"data_offsets":[0,12]}}"#,
        );
        let err = parse_recording(&bytes).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }
}

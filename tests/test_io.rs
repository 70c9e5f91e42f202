mod common;
use common::{shifted, sphere_positions};
use eegmontage::{
    adjust_chan_kind, evaluate_selection, get_chanlocs,
    info::{FIFFV_EEG_CH, FIFFV_EOG_CH, FIFFV_MISC_CH},
    io::{load_recording, write_report, StWriter},
    position_pipeline, rank_montages, JsonDirCatalog, MatchConfig, MemoryLog, Position,
};
use std::path::Path;

fn write_montage(dir: &Path, name: &str, prefix: &str, positions: &[Position]) {
    let entries: Vec<serde_json::Value> = positions
        .iter()
        .enumerate()
        .map(|(i, p)| serde_json::json!({ "name": format!("{prefix}{}", i + 1), "pos": p }))
        .collect();
    std::fs::write(dir.join(format!("{name}.json")), serde_json::to_vec(&entries).unwrap()).unwrap();
}

fn write_recording(path: &Path, positions: &[Position]) {
    let mut names: Vec<String> = (1..=positions.len()).map(|i| format!("E{i}")).collect();
    names.push("VEOG".into());
    names.push("A1".into());

    let mut flat: Vec<f32> = positions.iter().flat_map(|p| p.map(|v| v as f32)).collect();
    flat.extend_from_slice(&[0.03, 0.09, -0.01, -0.08, -0.02, -0.04]);

    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut w = StWriter::new();
    w.add_f32("chan_pos", &flat, &[names.len(), 3]);
    w.add_names("ch_names", &refs);
    w.add_i32("ch_kinds", &vec![FIFFV_EEG_CH; names.len()], &[names.len()]);
    w.write(path).unwrap();
}

#[test]
fn end_to_end_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let p = sphere_positions(32);
    write_montage(dir.path(), "biosemi32", "M", &p);
    write_montage(dir.path(), "standard_1020", "S", &shifted(&p, [0.0, 0.005, 0.0]));
    let raw = dir.path().join("raw.safetensors");
    write_recording(&raw, &p);

    let log = MemoryLog::new();
    let cfg = MatchConfig::default();
    let mut info = load_recording(&raw).unwrap();
    assert_eq!(info.chs.len(), 34);

    adjust_chan_kind(&mut info, cfg.tolerance, &log);
    assert_eq!(info.chs[32].kind, FIFFV_EOG_CH);
    assert_eq!(info.chs[33].kind, FIFFV_MISC_CH);
    assert_eq!(info.dig.len(), 2);

    let recording = get_chanlocs(&info, &log).unwrap();
    assert_eq!(recording.len(), 32);

    let catalog = JsonDirCatalog::new(dir.path());
    let names = catalog.available();
    assert_eq!(names, vec!["standard_1020", "biosemi32"]);

    let results = position_pipeline(&recording, &catalog, &names[..], &cfg, &log).unwrap();
    let ranking = rank_montages(&results).unwrap();
    assert_eq!(ranking.names(), vec!["biosemi32", "standard_1020"]);
    let chosen = evaluate_selection(1, &ranking.top(cfg.show_n_montages)).unwrap();
    assert_eq!(chosen, "biosemi32");

    let best = results.iter().find(|r| r.montage == chosen).unwrap();
    assert_eq!(best.match_ratio, "32/32");
    assert!(best.channel_mapping().contains(&("E7".to_string(), "M7".to_string())));

    let report = dir.path().join("report.json");
    write_report(&report, &results, Some(&ranking), Some(chosen.as_str())).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&report).unwrap()).unwrap();
    assert_eq!(json["selected"], "biosemi32");
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert_eq!(json["results"][0]["method"], "position");
}

#[test]
fn missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_recording(&dir.path().join("nope.safetensors")).is_err());
}

#[test]
fn report_writes_nan_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let rec = eegmontage::ChannelSet::from_pairs([("E1", [f64::NAN; 3])]).unwrap();
    let mon = eegmontage::ChannelSet::from_pairs([("Cz", [0.0, 0.0, 0.09])]).unwrap();
    let r = eegmontage::match_by_position(&rec, "m", &mon, &MatchConfig::default(), &MemoryLog::new());
    let path = dir.path().join("r.json");
    write_report(&path, &[r], None, None).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert!(json["results"][0]["channels"][0]["distance"].is_null());
    assert!(json["ranking"].is_null());
}

/// Shared fixtures: synthetic electrode layouts on a head-sized sphere.
use eegmontage::{ChannelSet, InMemoryCatalog, Position};

pub const HEAD_RADIUS: f64 = 0.095;

#[allow(unused)]
/// `n` points on the upper half of a sphere (Fibonacci spiral), so every
/// pair of electrodes is at a distinct, non-degenerate distance.
pub fn sphere_positions(n: usize) -> Vec<Position> {
    let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|i| {
            let z = 1.0 - (i as f64 + 0.5) / n as f64; // (0, 1)
            let r = (1.0 - z * z).sqrt();
            let theta = golden * i as f64;
            [
                HEAD_RADIUS * r * theta.cos(),
                HEAD_RADIUS * r * theta.sin(),
                HEAD_RADIUS * z,
            ]
        })
        .collect()
}

#[allow(unused)]
pub fn layout(prefix: &str, positions: &[Position]) -> ChannelSet {
    ChannelSet::from_pairs(
        positions
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("{prefix}{}", i + 1), *p)),
    )
    .unwrap()
}

#[allow(unused)]
/// Add a fixed offset to every position.
pub fn shifted(positions: &[Position], d: Position) -> Vec<Position> {
    positions
        .iter()
        .map(|p| [p[0] + d[0], p[1] + d[1], p[2] + d[2]])
        .collect()
}

#[allow(unused)]
/// Three montages: an exact copy of the 32-point sphere, a shifted copy, and
/// a 64-point sphere.
pub fn toy_catalog() -> InMemoryCatalog {
    let p32 = sphere_positions(32);
    InMemoryCatalog::new()
        .with("exact32", layout("M", &p32))
        .with("shifted32", layout("S", &shifted(&p32, [0.0, 0.0, 0.004])))
        .with("sphere64", layout("G", &sphere_positions(64)))
}

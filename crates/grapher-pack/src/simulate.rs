use std::collections::BTreeMap;

use grapher_commands::{MachineStats, Position, Score, Snbt};
use grapher_kernels::{AnimationState, Surface};

use crate::PackError;
use crate::builder::GrapherPack;

#[derive(Clone, Debug)]
pub struct SimulationReport {
    pub surface: Surface,
    pub ticks: u32,
    /// Marker positions after the last tick, in summon order.
    pub markers: Vec<Position>,
    /// Markers per head item id.
    pub heads: BTreeMap<String, usize>,
    /// Animation registers as the machine left them.
    pub state: AnimationState,
    /// Markers whose height differs from the native kernel.
    pub native_mismatches: usize,
    pub animation_agrees: bool,
    pub stats: MachineStats,
}

/// Load the pack, turn the graph on, and run `ticks` ticks of scheduled
/// calls followed by `animate` and the chosen surface.
pub fn simulate(
    pack: &GrapherPack,
    surface: Surface,
    ticks: u32,
) -> Result<SimulationReport, PackError> {
    let p = &pack.params;
    let regs = &pack.registers;
    let mut m = pack.datapack.machine(p.division);
    for id in pack.datapack.load_tag() {
        m.call(id)?;
    }
    m.call(&pack.ids.turn_on)?;

    let mut native = AnimationState::new(&p.animation);
    for tick in 0..ticks {
        let scheduled = m.run_tick()?;
        if scheduled > 0 {
            log::debug!("tick {tick}: {scheduled} scheduled calls");
        }
        m.call(&pack.ids.animate)?;
        m.call(pack.ids.surface(surface))?;
        native.step(&p.animation)?;
    }

    let read = |s: &Score| m.score(s).unwrap_or_default();
    let state = AnimationState {
        pan_x: read(&regs.pan_x),
        pan_z: read(&regs.pan_z),
        frame: read(&regs.frame),
        velocity_x: read(&regs.velocity_x),
        velocity_z: read(&regs.velocity_z),
    };

    let mut markers = Vec::new();
    let mut heads = BTreeMap::new();
    let mut native_mismatches = 0;
    for e in m.tagged(&pack.marker_tag) {
        markers.push(e.pos);
        if let Some(Snbt::String(id)) = e.head.as_ref().and_then(|h| h.get("id")) {
            *heads.entry(id.clone()).or_insert(0) += 1;
        }
        if ticks > 0 {
            let expected = surface.height(p, &native, e.pos.x, e.pos.z)?.world_y();
            if expected != e.pos.y {
                native_mismatches += 1;
            }
        }
    }
    if native_mismatches > 0 || state != native {
        log::warn!(
            "machine and native kernels disagree: {native_mismatches} markers, state {:?} vs {:?}",
            state,
            native
        );
    }
    log::info!(
        "simulated {surface} for {ticks} ticks: {} markers, {} commands",
        markers.len(),
        m.stats().commands
    );

    Ok(SimulationReport {
        surface,
        ticks,
        markers,
        heads,
        state,
        native_mismatches,
        animation_agrees: state == native,
        stats: m.stats(),
    })
}

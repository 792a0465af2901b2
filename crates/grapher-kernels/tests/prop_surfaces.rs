use grapher_commands::{
    Command, FunctionId, Machine, Namespace, Objective, Position, ResourceLocation, Score,
    ScoreAllocator,
};
use grapher_fixed::IntDivision;
use grapher_kernels::{
    AnimationState, GraphConfig, GraphParams, Registers, Surface, emit_animate, emit_calc_sine,
    emit_init_velocity, emit_reset,
};
use proptest::prelude::*;

/// Machine loaded with every surface body plus the animation functions.
struct Rig {
    machine: Machine,
    regs: Registers,
    markers: Vec<u64>,
    animate: FunctionId,
    surfaces: Vec<(Surface, FunctionId)>,
}

impl Rig {
    fn new(p: &GraphParams) -> Self {
        let objective = Objective::new("g").unwrap();
        let ns = Namespace::new("t").unwrap();
        let mut alloc = ScoreAllocator::new(objective.clone());
        let regs = Registers::allocate(&mut alloc).unwrap();
        let calc = ns.id("calc_sine").unwrap();
        let animate = ns.id("animate").unwrap();

        let mut machine = Machine::new(p.division);
        machine.define(calc.clone(), emit_calc_sine(p.resolution, &regs, &mut alloc).unwrap());
        machine.define(animate.clone(), emit_animate(&p.animation, &regs, &mut alloc));
        let mut surfaces = Vec::new();
        for s in Surface::ALL {
            let id = ns.id(&format!("set_{s}")).unwrap();
            machine.define(id.clone(), s.emit(p, &regs, &mut alloc, &calc));
            surfaces.push((s, id));
        }

        let mut setup = vec![Command::ObjectiveAdd(objective)];
        setup.extend(alloc.init_constants());
        setup.extend(emit_init_velocity(&p.animation, &regs));
        setup.extend(emit_reset(&p.animation, &regs));
        machine.run(&setup).unwrap();

        let stand = ResourceLocation::minecraft("armor_stand").unwrap();
        let markers = p
            .markers
            .iter()
            .map(|&(x, z)| machine.spawn(stand.clone(), Position::new(x, p.y_origin, z), Vec::new()))
            .collect();
        Self {
            machine,
            regs,
            markers,
            animate,
            surfaces,
        }
    }

    fn load_state(&mut self, s: &AnimationState) {
        let r = &self.regs;
        self.machine
            .run(&[
                r.pan_x.set(s.pan_x),
                r.pan_z.set(s.pan_z),
                r.frame.set(s.frame),
                r.velocity_x.set(s.velocity_x),
                r.velocity_z.set(s.velocity_z),
            ])
            .unwrap();
    }

    fn state(&self) -> AnimationState {
        let r = &self.regs;
        let get = |s: &Score| self.machine.score(s).unwrap();
        AnimationState {
            pan_x: get(&r.pan_x),
            pan_z: get(&r.pan_z),
            frame: get(&r.frame),
            velocity_x: get(&r.velocity_x),
            velocity_z: get(&r.velocity_z),
        }
    }

    fn heights(&mut self, surface: Surface) -> Vec<f64> {
        let id = self
            .surfaces
            .iter()
            .find(|(s, _)| *s == surface)
            .map(|(_, id)| id.clone())
            .unwrap();
        for &uid in &self.markers {
            self.machine.call_as(uid, &id).unwrap();
        }
        self.markers
            .iter()
            .map(|&uid| self.machine.entity(uid).unwrap().pos.y)
            .collect()
    }
}

fn native(p: &GraphParams, surface: Surface, s: &AnimationState) -> Vec<f64> {
    p.markers
        .iter()
        .map(|&(x, z)| surface.height(p, s, x, z).unwrap().world_y())
        .collect()
}

fn variants() -> Vec<GraphConfig> {
    let mut out = Vec::new();
    for resolution in [100, 300] {
        for division in [IntDivision::Truncate, IntDivision::Floor] {
            for offset in [0.0, -0.5 / 3.0] {
                let mut cfg = GraphConfig {
                    resolution,
                    division,
                    ..GraphConfig::default()
                };
                cfg.surfaces.sine_phase_offset = offset;
                out.push(cfg);
            }
        }
    }
    // Older layout: 10x10 grid from -2.5, lower origin, re-centred ripple
    let mut old = GraphConfig {
        resolution: 100,
        ..GraphConfig::default()
    };
    old.grid.x_size = 10;
    old.grid.z_size = 10;
    old.grid.x_origin = Some(-2.5);
    old.grid.z_origin = Some(-2.5);
    old.grid.y_origin = 20.0;
    old.animation.lower_bound_x = -1.0;
    old.animation.lower_bound_z = -1.0;
    old.animation.upper_bound_x = 1.5;
    old.animation.upper_bound_z = 1.5;
    old.surfaces.sine_phase_offset = -0.5 / 3.0;
    old.surfaces.ripple_center_x = 0.5;
    old.surfaces.ripple_center_z = 0.5;
    out.push(old);
    out
}

#[test]
fn emitted_surfaces_match_native_over_animation() {
    for cfg in variants() {
        let p = GraphParams::from_config(&cfg).unwrap();
        let mut rig = Rig::new(&p);
        let mut state = AnimationState::new(&p.animation);
        assert_eq!(rig.state(), state);
        for tick in 0..120 {
            rig.machine.call(&rig.animate).unwrap();
            state.step(&p.animation).unwrap();
            assert_eq!(rig.state(), state, "tick {tick}");
            if tick % 7 == 0 {
                for s in Surface::ALL {
                    assert_eq!(rig.heights(s), native(&p, s, &state), "{s} R={} tick {tick}", cfg.resolution);
                }
            }
        }
    }
}

#[test]
fn pan_stays_within_one_step_of_bounds() {
    let p = GraphParams::from_config(&GraphConfig::default()).unwrap();
    let a = p.animation;
    let mut s = AnimationState::new(&a);
    let mut flips = 0;
    for _ in 0..5000 {
        let before = s.velocity_x;
        s.step(&a).unwrap();
        if s.velocity_x != before {
            flips += 1;
        }
        assert!(s.pan_x >= a.lower_x - a.speed_x && s.pan_x <= a.upper_x + a.speed_x);
        assert!(s.pan_z >= a.lower_z - a.speed_z && s.pan_z <= a.upper_z + a.speed_z);
    }
    assert!(flips > 10);
}

fn state_strategy() -> impl Strategy<Value = AnimationState> {
    (-600i32..=600, -600i32..=600, 0i32..=1_000_000).prop_map(|(pan_x, pan_z, frame)| {
        AnimationState {
            pan_x,
            pan_z,
            frame,
            velocity_x: 12,
            velocity_z: 9,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn vm_and_native_agree_for_any_state(idx in 0usize..9, state in state_strategy()) {
        let cfg = &variants()[idx];
        let p = GraphParams::from_config(cfg).unwrap();
        let mut rig = Rig::new(&p);
        rig.load_state(&state);
        for s in Surface::ALL {
            prop_assert_eq!(rig.heights(s), native(&p, s, &state));
        }
    }

    #[test]
    fn kernels_are_idempotent(state in state_strategy()) {
        let p = GraphParams::from_config(&GraphConfig::default()).unwrap();
        let mut rig = Rig::new(&p);
        rig.load_state(&state);
        for s in Surface::ALL {
            let first = rig.heights(s);
            prop_assert_eq!(rig.heights(s), first);
            prop_assert_eq!(rig.state(), state);
        }
    }
}

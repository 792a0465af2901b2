use std::num::NonZeroU32;

use grapher_commands::{
    Command, ExecuteStep, FunctionId, Namespace, Objective, Position, ResourceLocation,
    ScheduleMode, ScoreAllocator, Selector, Snbt, Tag,
};
use grapher_kernels::{
    GraphParams, Registers, Surface, emit_animate, emit_calc_sine, emit_init_velocity, emit_reset,
};

use crate::PackError;
use crate::config::{Config, FlickerConfig};
use crate::datapack::Datapack;

#[derive(Clone, Debug)]
pub struct FunctionIds {
    pub init: FunctionId,
    pub init_constants: FunctionId,
    pub remove_graph: FunctionId,
    pub cleanup: FunctionId,
    pub reset_animation: FunctionId,
    pub turn_on: FunctionId,
    pub turn_off: FunctionId,
    pub flicker_on: FunctionId,
    pub flicker_off: FunctionId,
    pub calc_sine: FunctionId,
    pub animate: FunctionId,
    pub tick: Option<FunctionId>,
    /// `(entry point, per-marker body)`, indexed by [`slot`].
    surfaces: [(FunctionId, FunctionId); 4],
}

fn slot(surface: Surface) -> usize {
    match surface {
        Surface::Paraboloid => 0,
        Surface::Saddle => 1,
        Surface::Sine => 2,
        Surface::Ripple => 3,
    }
}

impl FunctionIds {
    fn new(ns: &Namespace, internal_dir: &str, with_tick: bool) -> Result<Self, PackError> {
        let internal = |name: &str| ns.id(&format!("{internal_dir}/{name}"));
        let entry = |s: Surface| -> Result<(FunctionId, FunctionId), PackError> {
            Ok((ns.id(s.name())?, internal(&format!("set_{s}"))?))
        };
        let surfaces = [
            entry(Surface::Paraboloid)?,
            entry(Surface::Saddle)?,
            entry(Surface::Sine)?,
            entry(Surface::Ripple)?,
        ];
        Ok(Self {
            init: internal("init")?,
            init_constants: internal("init_constants")?,
            remove_graph: ns.id("remove_graph")?,
            cleanup: ns.id("cleanup")?,
            reset_animation: ns.id("reset_animation")?,
            turn_on: ns.id("turn_on")?,
            turn_off: ns.id("turn_off")?,
            flicker_on: internal("flicker_on")?,
            flicker_off: internal("flicker_off")?,
            calc_sine: internal("calc_sine")?,
            animate: ns.id("animate")?,
            tick: if with_tick {
                Some(internal("tick")?)
            } else {
                None
            },
            surfaces,
        })
    }

    /// Public entry point that runs the surface on every marker.
    pub fn surface(&self, surface: Surface) -> &FunctionId {
        &self.surfaces[slot(surface)].0
    }

    pub fn marker_body(&self, surface: Surface) -> &FunctionId {
        &self.surfaces[slot(surface)].1
    }
}

/// The assembled pack together with the handles needed to drive it.
#[derive(Clone, Debug)]
pub struct GrapherPack {
    pub params: GraphParams,
    pub registers: Registers,
    pub objective: Objective,
    pub marker_tag: Tag,
    pub ids: FunctionIds,
    pub datapack: Datapack,
}

fn head_item(markers: &Selector, item: &ResourceLocation) -> Vec<Command> {
    vec![Command::as_each(
        markers.clone(),
        Command::DataSet {
            entity: Selector::executor(),
            path: grapher_commands::NbtPath::HEAD_SLOT,
            value: Snbt::item_stack(item, 1),
        },
    )]
}

/// Alternating off/on calls, each delay measured from `turn_on`.
fn flicker_schedule(
    fl: &FlickerConfig,
    ids: &FunctionIds,
) -> Result<Vec<Command>, PackError> {
    let mut cmds = Vec::with_capacity(fl.steps.len() * 2);
    let mut time = 0u32;
    for (step, [duration, interval]) in fl.steps.iter().enumerate() {
        for (delta, function) in [(duration, &ids.flicker_off), (interval, &ids.flicker_on)] {
            time = time
                .checked_add(delta.get())
                .ok_or(PackError::FlickerOverflow { step })?;
            cmds.push(Command::Schedule {
                function: function.clone(),
                ticks: NonZeroU32::new(time).ok_or(PackError::FlickerOverflow { step })?,
                mode: ScheduleMode::Append,
            });
        }
    }
    Ok(cmds)
}

pub fn build_pack(cfg: &Config) -> Result<GrapherPack, PackError> {
    let params = GraphParams::from_config(&cfg.graph)?;
    let pc = &cfg.pack;
    let ns = Namespace::new(&pc.namespace)?;
    let objective = Objective::new(&pc.objective)?;
    let marker_tag = Tag::new(&pc.marker_tag)?;
    let markers = Selector::all_entities().tagged(marker_tag.clone());
    let ids = FunctionIds::new(&ns, &pc.internal_dir, pc.tick_surface.is_some())?;

    let mut alloc = ScoreAllocator::new(objective.clone());
    let regs = Registers::allocate(&mut alloc)?;
    let mut pack = Datapack::new(pc.pack_format, pc.description.clone());

    pack.add_function(
        ids.calc_sine.clone(),
        emit_calc_sine(params.resolution, &regs, &mut alloc)?,
    );
    for s in Surface::ALL {
        let body = ids.marker_body(s).clone();
        pack.add_function(body.clone(), s.emit(&params, &regs, &mut alloc, &ids.calc_sine));
        pack.add_function(
            ids.surface(s).clone(),
            vec![Command::as_each(markers.clone(), Command::Function(body))],
        );
    }
    pack.add_function(
        ids.animate.clone(),
        emit_animate(&params.animation, &regs, &mut alloc),
    );

    let fl = &pc.flicker;
    let on_item = ResourceLocation::parse(&fl.on_item)?;
    let off_item = ResourceLocation::parse(&fl.off_item)?;
    pack.add_function(ids.flicker_on.clone(), head_item(&markers, &on_item));
    pack.add_function(ids.flicker_off.clone(), head_item(&markers, &off_item));

    pack.add_function(
        ids.remove_graph.clone(),
        vec![Command::as_each(markers.clone(), Command::Kill(Selector::executor()))],
    );
    pack.add_function(
        ids.cleanup.clone(),
        vec![
            Command::Function(ids.remove_graph.clone()),
            Command::ObjectiveRemove(objective.clone()),
        ],
    );
    pack.add_function(
        ids.reset_animation.clone(),
        emit_reset(&params.animation, &regs),
    );

    let stand = ResourceLocation::minecraft("armor_stand")?;
    let marker_nbt = Snbt::marker(std::slice::from_ref(&marker_tag));
    let mut turn_on = vec![
        Command::Function(ids.remove_graph.clone()),
        Command::Function(ids.reset_animation.clone()),
    ];
    turn_on.extend(params.markers.iter().map(|&(x, z)| Command::Summon {
        entity: stand.clone(),
        pos: Position::new(x, params.y_origin, z),
        nbt: marker_nbt.clone(),
    }));
    turn_on.push(Command::Function(ids.flicker_on.clone()));
    turn_on.extend(flicker_schedule(fl, &ids)?);
    turn_on.push(Command::execute(
        vec![
            ExecuteStep::As(Selector::nearest_player()),
            ExecuteStep::At(Selector::executor()),
        ],
        Command::PlaySound {
            sound: ResourceLocation::parse(&fl.sound.id)?,
            target: Selector::executor(),
            volume: fl.sound.volume,
            pitch: fl.sound.pitch,
        },
    ));
    pack.add_function(ids.turn_on.clone(), turn_on);
    pack.add_function(
        ids.turn_off.clone(),
        vec![
            Command::Function(ids.flicker_off.clone()),
            Command::Schedule {
                function: ids.remove_graph.clone(),
                ticks: fl.turn_off_delay,
                mode: ScheduleMode::Append,
            },
        ],
    );

    let mut init = vec![
        Command::ObjectiveRemove(objective.clone()),
        Command::ObjectiveAdd(objective.clone()),
        Command::Function(ids.init_constants.clone()),
    ];
    init.extend(emit_init_velocity(&params.animation, &regs));
    if let (Some(tick), Some(surface)) = (&ids.tick, pc.tick_surface) {
        // The tick tag reads pan and frame before any turn_on has run
        init.push(Command::Function(ids.reset_animation.clone()));
        pack.add_function(
            tick.clone(),
            vec![
                Command::Function(ids.animate.clone()),
                Command::Function(ids.surface(surface).clone()),
            ],
        );
        pack.on_tick(tick.clone());
    }
    pack.add_function(ids.init.clone(), init);
    pack.on_load(ids.init.clone());

    // Every emitter has run, so the constant set is complete
    pack.add_function(ids.init_constants.clone(), alloc.init_constants());

    log::info!(
        "assembled {}: {} functions, {} constants, {} scratch registers, {} markers",
        ns.as_str(),
        pack.functions().count(),
        alloc.constants().count(),
        alloc.allocated(),
        params.markers.len()
    );

    Ok(GrapherPack {
        params,
        registers: regs,
        objective,
        marker_tag,
        ids,
        datapack: pack,
    })
}

use std::num::NonZeroU32;

use super::*;
use crate::command::ScheduleMode;
use crate::ident::Namespace;
use crate::nbt::Axis;
use crate::score::ScoreAllocator;

fn objective() -> Objective {
    Objective::new("g").unwrap()
}

fn ns() -> Namespace {
    Namespace::new("t").unwrap()
}

fn armor_stand() -> ResourceLocation {
    ResourceLocation::minecraft("armor_stand").unwrap()
}

fn machine() -> Machine {
    let mut m = Machine::new(IntDivision::Truncate);
    m.run(&[Command::ObjectiveAdd(objective())]).unwrap();
    m
}

#[test]
fn score_arithmetic_follows_division_mode() {
    let mut alloc = ScoreAllocator::new(objective());
    let x = alloc.score();
    let two = alloc.constant(2);
    let prog = |m: &mut Machine| {
        let mut cmds = alloc.init_constants();
        cmds.push(x.set(-7));
        cmds.push(x.op(ScoreOp::Div, &two));
        m.run(&cmds).unwrap();
        m.score(&x)
    };
    let mut trunc = machine();
    assert_eq!(prog(&mut trunc), Some(-3));
    let mut floor = Machine::new(IntDivision::Floor);
    floor.run(&[Command::ObjectiveAdd(objective())]).unwrap();
    assert_eq!(prog(&mut floor), Some(-4));
}

#[test]
fn reading_unset_score_is_an_error() {
    let mut alloc = ScoreAllocator::new(objective());
    let x = alloc.score();
    let y = alloc.score();
    let mut m = machine();
    let err = m.run(&[x.assign(&y)]).unwrap_err();
    assert_eq!(err, VmError::UnsetScore(y.clone()));
    // Compound operations read the target too
    m.run(&[y.set(1)]).unwrap();
    assert_eq!(m.run(&[x.op(ScoreOp::Add, &y)]), Err(VmError::UnsetScore(x.clone())));
    // Plain assignment creates the target
    m.run(&[x.assign(&y)]).unwrap();
    assert_eq!(m.score(&x), Some(1));
}

#[test]
fn overflow_is_reported() {
    let mut alloc = ScoreAllocator::new(objective());
    let x = alloc.score();
    let mut m = machine();
    m.run(&[x.set(i32::MAX)]).unwrap();
    let err = m.run(&[x.op(ScoreOp::Mul, &x)]).unwrap_err();
    assert!(matches!(err, VmError::Arithmetic { source: FixedError::Overflow { op: "mul", .. }, .. }));
}

#[test]
fn scores_need_an_objective() {
    let mut alloc = ScoreAllocator::new(objective());
    let x = alloc.score();
    let mut m = Machine::new(IntDivision::Truncate);
    assert_eq!(m.run(&[x.set(1)]), Err(VmError::UnknownObjective(objective())));
    m.run(&[Command::ObjectiveAdd(objective()), x.set(1)]).unwrap();
    m.run(&[Command::ObjectiveRemove(objective())]).unwrap();
    assert_eq!(m.score(&x), None);
    assert!(!m.has_objective(&objective()));
}

#[test]
fn execute_as_binds_each_tagged_entity() {
    let tag = Tag::new("marker").unwrap();
    let mut m = machine();
    let a = m.spawn(armor_stand(), Position::new(1.0, 0.0, 2.0), vec![tag.clone()]);
    m.spawn(armor_stand(), Position::new(9.0, 0.0, 9.0), Vec::new());
    let b = m.spawn(armor_stand(), Position::new(-1.25, 0.0, 0.5), vec![tag.clone()]);

    let mut alloc = ScoreAllocator::new(objective());
    let x = alloc.score();
    let body = vec![
        Command::StoreEntityData {
            target: x.clone(),
            entity: Selector::executor(),
            path: NbtPath::Pos(Axis::X),
            scale: 100.0,
        },
        Command::StoreScoreToEntity {
            entity: Selector::executor(),
            path: NbtPath::Pos(Axis::Y),
            ty: NumericType::Double,
            scale: 0.5,
            source: x.clone(),
        },
    ];
    let set_y = ns().id("set_y").unwrap();
    m.define(set_y.clone(), body);
    m.run(&[Command::as_each(
        Selector::all_entities().tagged(tag),
        Command::Function(set_y),
    )])
    .unwrap();

    assert_eq!(m.entity(a).unwrap().pos.y, 50.0);
    assert_eq!(m.entity(b).unwrap().pos.y, -62.5);
    assert_eq!(m.entities()[1].pos.y, 0.0);
}

#[test]
fn executor_commands_without_entity_fail() {
    let mut alloc = ScoreAllocator::new(objective());
    let x = alloc.score();
    let mut m = machine();
    let err = m
        .run(&[Command::StoreEntityData {
            target: x,
            entity: Selector::executor(),
            path: NbtPath::Pos(Axis::X),
            scale: 1.0,
        }])
        .unwrap_err();
    assert!(matches!(err, VmError::NoTarget(_)));
}

#[test]
fn summon_reads_tags_and_kill_removes() {
    let tag = Tag::new("3dGrapher.marker").unwrap();
    let mut m = machine();
    let summon = Command::Summon {
        entity: armor_stand(),
        pos: Position::new(0.5, 36.0, 0.5),
        nbt: Snbt::marker(std::slice::from_ref(&tag)),
    };
    m.run(&[summon.clone(), summon]).unwrap();
    assert_eq!(m.tagged(&tag).count(), 2);
    m.run(&[Command::as_each(
        Selector::all_entities().tagged(tag.clone()),
        Command::Kill(Selector::executor()),
    )])
    .unwrap();
    assert_eq!(m.tagged(&tag).count(), 0);
}

#[test]
fn conditions_gate_a_single_command() {
    let alloc = ScoreAllocator::new(objective());
    let pan = alloc.public("panX").unwrap();
    let vel = alloc.public("vel").unwrap();
    let mut m = machine();
    m.run(&[pan.set(-451), vel.set(-12)]).unwrap();
    let flip = Command::run_if(pan.less_than(-450), vel.set(12));
    m.run(&[flip.clone()]).unwrap();
    assert_eq!(m.score(&vel), Some(12));
    m.run(&[pan.set(-450), vel.set(-12), flip]).unwrap();
    assert_eq!(m.score(&vel), Some(-12));
}

#[test]
fn scheduled_functions_run_on_their_tick() {
    let alloc = ScoreAllocator::new(objective());
    let count = alloc.public("count").unwrap();
    let bump = ns().id("bump").unwrap();
    let mut m = machine();
    m.define(bump.clone(), vec![count.add(1)]);
    let sched = |ticks: u32, mode| Command::Schedule {
        function: bump.clone(),
        ticks: NonZeroU32::new(ticks).unwrap(),
        mode,
    };
    m.run(&[count.set(0), sched(2, ScheduleMode::Append), sched(3, ScheduleMode::Append)])
        .unwrap();
    assert_eq!(m.run_tick().unwrap(), 0);
    assert_eq!(m.run_tick().unwrap(), 1);
    assert_eq!(m.run_tick().unwrap(), 1);
    assert_eq!(m.score(&count), Some(2));
    assert_eq!(m.now(), 3);

    m.run(&[sched(2, ScheduleMode::Append), sched(4, ScheduleMode::Replace)])
        .unwrap();
    assert_eq!(m.pending().count(), 1);
}

#[test]
fn unbounded_recursion_is_cut_off() {
    let f = ns().id("loop").unwrap();
    let mut m = machine();
    m.define(f.clone(), vec![Command::Function(f.clone())]);
    assert_eq!(m.call(&f), Err(VmError::CallDepth(MAX_CALL_DEPTH)));
    assert!(matches!(
        m.call(&ns().id("missing").unwrap()),
        Err(VmError::UnknownFunction(_))
    ));
}

#[test]
fn head_slot_and_sounds() {
    let tag = Tag::new("m").unwrap();
    let mut m = machine();
    let uid = m.spawn(armor_stand(), Position::new(0.0, 0.0, 0.0), vec![tag.clone()]);
    let item = Snbt::item_stack(&ResourceLocation::minecraft("cyan_concrete").unwrap(), 1);
    m.run(&[
        Command::as_each(
            Selector::all_entities().tagged(tag),
            Command::DataSet {
                entity: Selector::executor(),
                path: NbtPath::HEAD_SLOT,
                value: item.clone(),
            },
        ),
        Command::PlaySound {
            sound: ResourceLocation::minecraft("block.beacon.activate").unwrap(),
            target: Selector::nearest_player(),
            volume: 1.0,
            pitch: 0.7,
        },
    ])
    .unwrap();
    assert_eq!(m.entity(uid).unwrap().head, Some(item));
    assert_eq!(m.stats().sounds, 0);
}

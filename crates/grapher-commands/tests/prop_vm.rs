use std::num::NonZeroU32;

use grapher_commands::{
    Command, Machine, Namespace, Objective, ScheduleMode, ScoreAllocator, ScoreOp, VmError,
};
use grapher_fixed::IntDivision;
use proptest::prelude::*;

fn division() -> impl Strategy<Value = IntDivision> {
    prop_oneof![Just(IntDivision::Truncate), Just(IntDivision::Floor)]
}

fn op() -> impl Strategy<Value = ScoreOp> {
    prop_oneof![
        Just(ScoreOp::Assign),
        Just(ScoreOp::Add),
        Just(ScoreOp::Sub),
        Just(ScoreOp::Mul),
        Just(ScoreOp::Div),
        Just(ScoreOp::Mod),
    ]
}

fn reference(mode: IntDivision, op: ScoreOp, lhs: i32, rhs: i32) -> Option<i32> {
    match op {
        ScoreOp::Assign => Some(rhs),
        ScoreOp::Add => lhs.checked_add(rhs),
        ScoreOp::Sub => lhs.checked_sub(rhs),
        ScoreOp::Mul => lhs.checked_mul(rhs),
        ScoreOp::Div => mode.div(lhs, rhs).ok(),
        ScoreOp::Mod => mode.rem(lhs, rhs).ok(),
    }
}

fn objective() -> Objective {
    Objective::new("g").unwrap()
}

proptest! {
    // A chain of register operations lands where checked native arithmetic
    // does, and fails on the first step native arithmetic rejects
    #[test]
    fn operations_match_checked_arithmetic(
        mode in division(),
        start in any::<i32>(),
        steps in prop::collection::vec((op(), -5000i32..5000), 1..24),
    ) {
        let mut alloc = ScoreAllocator::new(objective());
        let acc = alloc.score();
        let mut m = Machine::new(mode);
        m.run(&[Command::ObjectiveAdd(objective()), acc.set(start)]).unwrap();

        let mut expected = Some(start);
        for (op, operand) in steps {
            let rhs = alloc.constant(operand);
            m.run(&[rhs.set(operand)]).unwrap();
            let got = m.run(&[acc.op(op, &rhs)]);
            let Some(lhs) = expected else { break };
            expected = reference(mode, op, lhs, operand);
            match expected {
                Some(v) => {
                    prop_assert!(got.is_ok());
                    prop_assert_eq!(m.score(&acc), Some(v));
                }
                None => {
                    let is_arithmetic = matches!(got, Err(VmError::Arithmetic { .. }));
                    prop_assert!(is_arithmetic);
                    prop_assert_eq!(m.score(&acc), Some(lhs));
                }
            }
        }
    }

    // Appended calls each run exactly once, on the tick they were due
    #[test]
    fn appended_calls_run_when_due(delays in prop::collection::vec(1u32..40, 1..12)) {
        let ns = Namespace::new("t").unwrap();
        let mut alloc = ScoreAllocator::new(objective());
        let hits = alloc.score();
        let one = alloc.constant(1);
        let bump = ns.id("bump").unwrap();
        let mut setup = vec![Command::ObjectiveAdd(objective()), hits.set(0)];
        setup.extend(alloc.init_constants());
        setup.extend(delays.iter().map(|&d| Command::Schedule {
            function: bump.clone(),
            ticks: NonZeroU32::new(d).unwrap(),
            mode: ScheduleMode::Append,
        }));
        let mut m = Machine::new(IntDivision::Truncate)
            .with_functions([(bump, vec![hits.op(ScoreOp::Add, &one)])]);
        m.run(&setup).unwrap();

        for tick in 1..40u64 {
            m.run_tick().unwrap();
            let due = delays.iter().filter(|&&d| d as u64 <= tick).count();
            prop_assert_eq!(m.score(&hits), Some(due as i32));
            prop_assert_eq!(m.pending().count(), delays.len() - due);
        }
    }

    // Replace leaves a single pending call, at the latest requested delay
    #[test]
    fn replace_keeps_only_the_last_request(delays in prop::collection::vec(1u32..40, 1..12)) {
        let ns = Namespace::new("t").unwrap();
        let f = ns.id("f").unwrap();
        let mut m = Machine::new(IntDivision::Truncate).with_functions([(f.clone(), vec![])]);
        let cmds: Vec<_> = delays
            .iter()
            .map(|&d| Command::Schedule {
                function: f.clone(),
                ticks: NonZeroU32::new(d).unwrap(),
                mode: ScheduleMode::Replace,
            })
            .collect();
        m.run(&cmds).unwrap();
        let pending: Vec<u64> = m.pending().map(|s| s.tick).collect();
        prop_assert_eq!(pending, vec![*delays.last().unwrap() as u64]);
    }
}

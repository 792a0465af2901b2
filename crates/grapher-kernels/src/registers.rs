use grapher_commands::{IdentError, Score, ScoreAllocator};

/// Long-lived registers shared between the animation step and the surfaces.
///
/// `frame`, `panX` and `panZ` carry public names so they can be inspected
/// and nudged in game. The rest are allocator scratch, still persistent:
/// the velocities carry across ticks and the periodic kernel owns its
/// input and output registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registers {
    pub pan_x: Score,
    pub pan_z: Score,
    pub frame: Score,
    pub velocity_x: Score,
    pub velocity_z: Score,
    pub sine_input: Score,
    pub sine_output: Score,
}

impl Registers {
    pub fn allocate(alloc: &mut ScoreAllocator) -> Result<Self, IdentError> {
        Ok(Self {
            pan_x: alloc.public("panX")?,
            pan_z: alloc.public("panZ")?,
            frame: alloc.public("frame")?,
            velocity_x: alloc.score(),
            velocity_z: alloc.score(),
            sine_input: alloc.score(),
            sine_output: alloc.score(),
        })
    }
}

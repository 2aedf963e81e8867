/// How far the model rotates on each rendered frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RotationPolicy {
    /// Constant angle per frame, independent of frame timing.
    FixedStep { degrees: f32 },
    /// Angle proportional to the frame's delta time.
    TimeBased { degrees_per_second: f32 },
}

impl RotationPolicy {
    /// Angle to add for a frame that took `dt` seconds.
    #[inline]
    pub fn increment(self, dt: f32) -> f32 {
        match self {
            Self::FixedStep { degrees } => degrees,
            Self::TimeBased { degrees_per_second } => degrees_per_second * dt,
        }
    }
}

impl Default for RotationPolicy {
    /// A quarter turn per second.
    fn default() -> Self {
        Self::TimeBased {
            degrees_per_second: 90.0,
        }
    }
}

/// Millionths of a degree in a full turn.
const FULL_TURN: i64 = 360_000_000;
const MICROS_PER_DEGREE: f64 = 1_000_000.0;

/// Current model rotation, kept in `[0, 360)` degrees.
///
/// Stored as an integer count of micro-degrees so repeated steps never
/// accumulate rounding error: `n` advances by `step` land exactly on
/// `n * step` modulo a full turn.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rotation {
    micros: i64,
}

impl Rotation {
    pub const ZERO: Self = Self { micros: 0 };

    pub fn from_degrees(degrees: f32) -> Self {
        Self {
            micros: to_micros(degrees),
        }
    }

    #[inline]
    pub fn degrees(self) -> f32 {
        (self.micros as f64 / MICROS_PER_DEGREE) as f32
    }

    #[inline]
    pub fn radians(self) -> f32 {
        (self.micros as f64 / MICROS_PER_DEGREE).to_radians() as f32
    }

    /// Adds `delta` degrees, wrapping around a full turn.
    pub fn advance(&mut self, delta: f32) {
        self.micros = (self.micros + to_micros(delta)).rem_euclid(FULL_TURN);
    }
}

/// Rounds `degrees` to the nearest micro-degree within one turn.
/// Non-finite input maps to zero.
fn to_micros(degrees: f32) -> i64 {
    if !degrees.is_finite() {
        return 0;
    }
    let wrapped = f64::from(degrees).rem_euclid(360.0);
    ((wrapped * MICROS_PER_DEGREE).round() as i64).rem_euclid(FULL_TURN)
}

use std::time::Duration;

use crate::foundation::error::{FilmstripError, FilmstripResult};

/// Largest integration substep in seconds. Coarser host ticks are split so
/// the semi-implicit Euler integration stays stable at high stiffness.
const MAX_SUBSTEP_SECS: f64 = 1.0 / 120.0;

/// Damped harmonic oscillator parameters.
///
/// The defaults reproduce the feel of the scroll smoothing this crate was
/// built for: stiffness 100, damping 30, unit mass. Both presets are
/// overdamped, so the smoothed progress approaches its target without
/// overshoot.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SpringOpts {
    /// Restoring force per unit displacement. Must be > 0.
    pub stiffness: f64,
    /// Velocity damping coefficient. Must be >= 0.
    pub damping: f64,
    /// Oscillating mass. Must be > 0.
    pub mass: f64,
    /// Displacement below which the spring may snap to its target.
    pub rest_delta: f64,
    /// Speed below which the spring may snap to its target.
    pub rest_speed: f64,
}

impl Default for SpringOpts {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 30.0,
            mass: 1.0,
            rest_delta: 0.001,
            rest_speed: 0.01,
        }
    }
}

impl SpringOpts {
    /// Stiffer, faster-settling preset used when the host prefers reduced
    /// motion: the value still tracks its target but visible lag is minimal.
    pub fn reduced_motion() -> Self {
        Self {
            stiffness: 260.0,
            damping: 45.0,
            ..Self::default()
        }
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> FilmstripResult<()> {
        let finite = self.stiffness.is_finite()
            && self.damping.is_finite()
            && self.mass.is_finite()
            && self.rest_delta.is_finite()
            && self.rest_speed.is_finite();
        if !finite {
            return Err(FilmstripError::validation("SpringOpts must be finite"));
        }
        if self.stiffness <= 0.0 || self.mass <= 0.0 {
            return Err(FilmstripError::validation(
                "SpringOpts stiffness and mass must be > 0",
            ));
        }
        if self.damping < 0.0 {
            return Err(FilmstripError::validation("SpringOpts damping must be >= 0"));
        }
        if self.rest_delta <= 0.0 || self.rest_speed <= 0.0 {
            return Err(FilmstripError::validation(
                "SpringOpts rest thresholds must be > 0",
            ));
        }
        Ok(())
    }
}

/// A scalar spring that chases a movable target.
///
/// Retargeting mid-flight keeps the current position and velocity, so a
/// scroll reversal decelerates naturally instead of teleporting.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    opts: SpringOpts,
}

impl Spring {
    /// Create a spring at rest at `initial`.
    pub fn new(initial: f64, opts: SpringOpts) -> FilmstripResult<Self> {
        opts.validate()?;
        Ok(Self {
            position: initial,
            velocity: 0.0,
            target: initial,
            opts,
        })
    }

    /// Current position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity in units per second.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Move the target, preserving position and velocity.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// True once the spring has snapped to its target.
    pub fn is_settled(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }

    /// Advance the simulation by `dt` and return the new position.
    ///
    /// Integration is semi-implicit Euler over bounded substeps. Once the
    /// spring is within `rest_delta` of the target at under `rest_speed`, it
    /// snaps exactly onto the target and zeroes its velocity.
    pub fn step(&mut self, dt: Duration) -> f64 {
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP_SECS);
            let displacement = self.position - self.target;
            let accel =
                (-self.opts.stiffness * displacement - self.opts.damping * self.velocity)
                    / self.opts.mass;
            self.velocity += accel * h;
            self.position += self.velocity * h;
            remaining -= h;
        }

        if (self.position - self.target).abs() < self.opts.rest_delta
            && self.velocity.abs() < self.opts.rest_speed
        {
            self.position = self.target;
            self.velocity = 0.0;
        }
        self.position
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;

//! Picking where a game starts and where it ends.
//!
//! The target is chosen first, anywhere inside the world bounds. The start
//! is then projected *from the target*: a random bearing and a random
//! distance from the configured band. Going target-first means the
//! distance band holds everywhere except right at the world edge, where
//! the start column is clamped back inside the bounds. That edge case is
//! accepted as is; there is no retry loop.
//!
//! Both functions take the RNG as a parameter so tests can seed it.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};
use wayforge_protocol::{Location, WorldOracle};

/// Square world bounds applied to both the x and z axes (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: i32,
    pub max: i32,
}

impl WorldBounds {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Swaps the ends if they were given in the wrong order.
    pub fn validated(self) -> Self {
        if self.min > self.max {
            Self::new(self.max, self.min)
        } else {
            self
        }
    }

    pub fn clamp(&self, v: i32) -> i32 {
        v.clamp(self.min, self.max)
    }

    /// Clamps a wide coordinate, so offsets past `i32` range land on an edge.
    fn clamp_wide(&self, v: i64) -> i32 {
        let clamped = v.clamp(i64::from(self.min), i64::from(self.max));
        i32::try_from(clamped).unwrap_or(self.max)
    }

    /// Whether the column `(x, z)` lies inside the bounds.
    pub fn contains(&self, x: i32, z: i32) -> bool {
        (self.min..=self.max).contains(&x) && (self.min..=self.max).contains(&z)
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(-10_000, 10_000)
    }
}

/// Half-open band `[min, max)` for the start-to-target distance, in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub min: i32,
    pub max: i32,
}

impl DistanceBand {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Makes the band non-negative and non-empty (`max > min`).
    pub fn validated(self) -> Self {
        let min = self.min.clamp(0, i32::MAX - 1);
        let max = self.max.max(min + 1);
        Self::new(min, max)
    }

    /// Draws a distance uniformly from the band.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.random_range(self.min..self.max)
    }
}

impl Default for DistanceBand {
    fn default() -> Self {
        Self::new(500, 2000)
    }
}

/// Picks a random target column inside `bounds` and stands it on the
/// first standable elevation.
pub fn pick_target<R: Rng + ?Sized>(
    world: &str,
    bounds: WorldBounds,
    oracle: &dyn WorldOracle,
    rng: &mut R,
) -> Location {
    let x = rng.random_range(bounds.min..=bounds.max);
    let z = rng.random_range(bounds.min..=bounds.max);
    let y = oracle.highest_standable_y(world, x, z);
    Location::block_centre(world, x, y, z)
}

/// Projects a start point from `target` along a random bearing at a
/// distance drawn from `band`, clamped into `bounds`.
///
/// The projection is done in `i64`, so a target outside the bounds or a
/// very wide band still lands on the nearest edge.
pub fn pick_start<R: Rng + ?Sized>(
    target: &Location,
    bounds: WorldBounds,
    band: DistanceBand,
    oracle: &dyn WorldOracle,
    rng: &mut R,
) -> Location {
    let bearing = rng.random::<f64>() * TAU;
    let distance = f64::from(band.sample(rng));

    let origin = target.block();
    let x = bounds.clamp_wide(i64::from(origin.x) + (bearing.cos() * distance) as i64);
    let z = bounds.clamp_wide(i64::from(origin.z) + (bearing.sin() * distance) as i64);
    let y = oracle.highest_standable_y(&target.world, x, z);
    Location::block_centre(target.world.clone(), x, y, z)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use wayforge_protocol::{ParticipantId, ServiceError};

    use super::*;

    /// Terrain whose height depends on the column, so elevation lookups
    /// are observable.
    struct Hills;

    impl WorldOracle for Hills {
        fn location(&self, _participant: ParticipantId) -> Option<Location> {
            None
        }

        fn highest_standable_y(&self, _world: &str, x: i32, z: i32) -> i32 {
            64 + (x.rem_euclid(7) + z.rem_euclid(5))
        }

        fn teleport(
            &self,
            _participant: ParticipantId,
            _to: &Location,
        ) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    fn hills_height(x: i32, z: i32) -> i32 {
        64 + (x.rem_euclid(7) + z.rem_euclid(5))
    }

    // Truncating the projected offsets toward zero can shorten each axis
    // by under one block, so the horizontal distance may undershoot the
    // drawn distance by less than sqrt(2).
    const TRUNCATION_SLACK: f64 = std::f64::consts::SQRT_2;

    #[test]
    fn test_pick_target_stays_in_bounds_and_stands_on_ground() {
        let bounds = WorldBounds::new(-50, 50);
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let target = pick_target("world", bounds, &Hills, &mut rng);
            let block = target.block();

            assert!(bounds.contains(block.x, block.z), "seed {seed}: {target}");
            assert_eq!(block.y, hills_height(block.x, block.z));
            assert_eq!(target.x - target.x.floor(), 0.5);
            assert_eq!(target.world, "world");
        }
    }

    #[test]
    fn test_pick_start_distance_in_band_when_unclamped() {
        let bounds = WorldBounds::new(-100_000, 100_000);
        let band = DistanceBand::new(500, 2000);
        let target = Location::block_centre("world", 0, 70, 0);

        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = pick_start(&target, bounds, band, &Hills, &mut rng);
            let d = start.horizontal_distance(&target).unwrap();

            assert!(
                d >= f64::from(band.min) - TRUNCATION_SLACK && d < f64::from(band.max),
                "seed {seed}: distance {d} outside band"
            );
        }
    }

    #[test]
    fn test_pick_start_clamped_near_edge_stays_in_bounds() {
        let configs = [
            (WorldBounds::new(-1000, 1000), DistanceBand::new(500, 2000)),
            (WorldBounds::new(0, 300), DistanceBand::new(100, 250)),
            (WorldBounds::new(-10, 10), DistanceBand::new(50, 60)),
        ];

        for (bounds, band) in configs {
            for seed in 0..300 {
                let mut rng = StdRng::seed_from_u64(seed);
                let target = pick_target("world", bounds, &Hills, &mut rng);
                let start = pick_start(&target, bounds, band, &Hills, &mut rng);
                let block = start.block();

                assert!(
                    bounds.contains(block.x, block.z),
                    "seed {seed}: {start} escaped {bounds:?}"
                );
                let d = start.horizontal_distance(&target).unwrap();
                let clamped = block.x == bounds.min
                    || block.x == bounds.max
                    || block.z == bounds.min
                    || block.z == bounds.max;
                if !clamped {
                    assert!(
                        d >= f64::from(band.min) - TRUNCATION_SLACK
                            && d < f64::from(band.max),
                        "seed {seed}: unclamped start at distance {d}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_pick_start_same_seed_same_result() {
        let target = Location::block_centre("world", 10, 70, 10);
        let a = pick_start(
            &target,
            WorldBounds::default(),
            DistanceBand::default(),
            &Hills,
            &mut StdRng::seed_from_u64(42),
        );
        let b = pick_start(
            &target,
            WorldBounds::default(),
            DistanceBand::default(),
            &Hills,
            &mut StdRng::seed_from_u64(42),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_band_validated_is_never_empty() {
        assert_eq!(DistanceBand::new(10, 10).validated(), DistanceBand::new(10, 11));
        assert_eq!(DistanceBand::new(-5, 3).validated(), DistanceBand::new(0, 3));
    }

    #[test]
    fn test_band_validated_at_i32_max() {
        assert_eq!(
            DistanceBand::new(i32::MAX, i32::MAX).validated(),
            DistanceBand::new(i32::MAX - 1, i32::MAX)
        );
    }

    #[test]
    fn test_pick_start_far_target_lands_on_edge() {
        let bounds = WorldBounds::default();
        let target = Location::new("world", 3.0e9, 64.0, 3.0e9);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = pick_start(&target, bounds, DistanceBand::default(), &Hills, &mut rng);
            let block = start.block();

            assert!(bounds.contains(block.x, block.z), "seed {seed}: {start}");
            assert_eq!((block.x, block.z), (bounds.max, bounds.max));
        }
    }

    #[test]
    fn test_pick_start_widest_band_stays_in_bounds() {
        let bounds = WorldBounds::new(-100, 100);
        let band = DistanceBand::new(0, i32::MAX).validated();
        let target = Location::block_centre("world", i32::MAX - 5, 70, i32::MIN + 5);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = pick_start(&target, bounds, band, &Hills, &mut rng);
            let block = start.block();

            assert!(bounds.contains(block.x, block.z), "seed {seed}: {start}");
        }
    }

    #[test]
    fn test_bounds_validated_orders_ends() {
        assert_eq!(WorldBounds::new(5, -5).validated(), WorldBounds::new(-5, 5));
    }
}

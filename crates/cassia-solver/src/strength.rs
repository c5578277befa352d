use std::ops::Mul;

/// Priority of a constraint.
///
/// A strength is a single number built from three tiers (strong, medium,
/// weak), each worth a thousand times the tier below. Constraints at
/// [`Strength::REQUIRED`] must hold exactly; everything weaker is satisfied as
/// well as possible, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Strength(f64);

impl Strength {
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Compose a strength from its three tiers, each clamped to `[0, 1000]`.
    pub fn new(strong: f64, medium: f64, weak: f64) -> Self {
        Self::with_weight(strong, medium, weak, 1.0)
    }

    /// Like [`Strength::new`] with every tier scaled by `weight` before clamping.
    pub fn with_weight(strong: f64, medium: f64, weak: f64, weight: f64) -> Self {
        let tier = |value: f64| (value * weight).clamp(0.0, 1000.0);
        Self(tier(strong) * 1_000_000.0 + tier(medium) * 1_000.0 + tier(weak))
    }

    /// Wrap a raw value without clamping.
    pub const fn from_value(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Clamp into `[0, REQUIRED]`.
    pub fn clip(self) -> Self {
        Self(self.0.clamp(0.0, Self::REQUIRED.0))
    }

    pub fn is_required(self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

impl Mul<f64> for Strength {
    type Output = Strength;

    fn mul(self, rhs: f64) -> Strength {
        Strength(self.0 * rhs)
    }
}

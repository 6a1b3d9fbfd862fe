/// Physical quantities that cross the presentation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    Length,
    Torque,
    Angle,
    /// Shear stress and shear modulus share the same units.
    Stress,
}

impl QuantityKind {
    pub fn label(self) -> &'static str {
        match self {
            QuantityKind::Length => "length",
            QuantityKind::Torque => "torque",
            QuantityKind::Angle => "angle",
            QuantityKind::Stress => "stress",
        }
    }
}

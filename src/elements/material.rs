//! Material properties

use serde::{Deserialize, Serialize};

/// Linear elastic isotropic material attached to a section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity (Young's modulus) in Pa
    #[serde(rename = "E")]
    pub e: f64,
    /// Poisson's ratio
    pub nu: f64,
}

impl Material {
    pub fn new(e: f64, nu: f64) -> Self {
        Self { e, nu }
    }

    /// Structural steel, E = 210 GPa
    pub fn steel() -> Self {
        Self::new(210e9, 0.3)
    }

    /// Shear modulus G = E / (2 (1 + nu))
    pub fn shear_modulus(&self) -> f64 {
        self.e / (2.0 * (1.0 + self.nu))
    }

    /// Check the constants describe a usable elastic material
    pub fn validate(&self) -> Result<(), String> {
        if !(self.e.is_finite() && self.e > 0.0) {
            return Err(format!("Young's modulus must be positive, got {}", self.e));
        }
        if !(self.nu.is_finite() && self.nu > -1.0 && self.nu < 0.5) {
            return Err(format!("Poisson ratio must lie in (-1, 0.5), got {}", self.nu));
        }
        Ok(())
    }
}

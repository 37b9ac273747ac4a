//! Cross-sections and their derived stiffness properties

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::Material;

/// Section identifier
pub type SectionId = u64;

/// Millimetres to metres
const MM: f64 = 1e-3;

/// Shape of a cross-section. Dimensions are in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SectionShape {
    Rectangular { width: f64, height: f64 },
    Circular { diameter: f64 },
    HollowCircular { diameter: f64, thickness: f64 },
    /// Doubly symmetric I-shape; `depth` runs along local z
    I { depth: f64, width: f64, tw: f64, tf: f64 },
}

impl SectionShape {
    /// Values accepted in the `type` field of a section document
    pub const TYPE_NAMES: [&'static str; 4] = ["Rectangular", "Circular", "HollowCircular", "I"];

    pub fn type_name(&self) -> &'static str {
        match self {
            SectionShape::Rectangular { .. } => "Rectangular",
            SectionShape::Circular { .. } => "Circular",
            SectionShape::HollowCircular { .. } => "HollowCircular",
            SectionShape::I { .. } => "I",
        }
    }

    /// Check the dimensions describe a real shape
    pub fn validate(&self) -> Result<(), String> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(format!("{} must be positive, got {}", name, value))
            }
        };
        match *self {
            SectionShape::Rectangular { width, height } => {
                positive("width", width)?;
                positive("height", height)
            }
            SectionShape::Circular { diameter } => positive("diameter", diameter),
            SectionShape::HollowCircular { diameter, thickness } => {
                positive("diameter", diameter)?;
                positive("thickness", thickness)?;
                if 2.0 * thickness >= diameter {
                    return Err(format!(
                        "wall thickness {} leaves no hole in diameter {}",
                        thickness, diameter
                    ));
                }
                Ok(())
            }
            SectionShape::I { depth, width, tw, tf } => {
                positive("depth", depth)?;
                positive("width", width)?;
                positive("tw", tw)?;
                positive("tf", tf)?;
                if 2.0 * tf >= depth {
                    return Err(format!("flanges of {} fill the depth {}", tf, depth));
                }
                if tw > width {
                    return Err(format!("web {} is wider than flange {}", tw, width));
                }
                Ok(())
            }
        }
    }
}

/// A cross-section entry of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    #[serde(flatten)]
    pub shape: SectionShape,
    pub material: Material,
}

impl Section {
    pub fn new(id: SectionId, shape: SectionShape, material: Material) -> Self {
        Self { id, shape, material }
    }

    /// Width x height rectangle in mm
    pub fn rectangular(id: SectionId, width: f64, height: f64, material: Material) -> Self {
        Self::new(id, SectionShape::Rectangular { width, height }, material)
    }
}

/// Derived stiffness properties in SI units (m², m⁴, Pa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub a: f64,
    pub iy: f64,
    pub iz: f64,
    pub j: f64,
    pub e: f64,
    pub g: f64,
}

/// Computes geometric properties of a shape for a material
pub trait SectionPropertyService {
    fn properties(
        &self,
        shape: &SectionShape,
        material: &Material,
    ) -> Result<SectionProperties, String>;
}

/// Closed-form properties for the standard shapes
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSections;

impl SectionPropertyService for StandardSections {
    fn properties(
        &self,
        shape: &SectionShape,
        material: &Material,
    ) -> Result<SectionProperties, String> {
        shape.validate()?;
        material.validate()?;

        let (a, iy, iz, j) = match *shape {
            SectionShape::Rectangular { width, height } => {
                let b = width * MM;
                let h = height * MM;
                // Saint-Venant approximation, long side first
                let (long, short) = if b > h { (b, h) } else { (h, b) };
                let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);
                (b * h, b * h.powi(3) / 12.0, h * b.powi(3) / 12.0, j)
            }
            SectionShape::Circular { diameter } => {
                let r = diameter * MM / 2.0;
                let i = PI * r.powi(4) / 4.0;
                (PI * r * r, i, i, 2.0 * i)
            }
            SectionShape::HollowCircular { diameter, thickness } => {
                let r_o = diameter * MM / 2.0;
                let r_i = r_o - thickness * MM;
                let i = PI * (r_o.powi(4) - r_i.powi(4)) / 4.0;
                (PI * (r_o * r_o - r_i * r_i), i, i, 2.0 * i)
            }
            SectionShape::I { depth, width, tw, tf } => {
                let d = depth * MM;
                let bf = width * MM;
                let tw = tw * MM;
                let tf = tf * MM;
                let hw = d - 2.0 * tf;
                let a = 2.0 * bf * tf + hw * tw;
                let iy = (bf * d.powi(3) - (bf - tw) * hw.powi(3)) / 12.0;
                let iz = (2.0 * tf * bf.powi(3) + hw * tw.powi(3)) / 12.0;
                let j = (2.0 * bf * tf.powi(3) + hw * tw.powi(3)) / 3.0;
                (a, iy, iz, j)
            }
        };

        Ok(SectionProperties {
            a,
            iy,
            iz,
            j,
            e: material.e,
            g: material.shear_modulus(),
        })
    }
}

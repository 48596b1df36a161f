//! Material property records.
//!
//! Materials are supplied by the caller and passed through to the model and
//! the deck unchanged: no unit conversion happens here. Validation only
//! rejects physically impossible values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Constitutive model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConstitutiveModel {
    #[default]
    LinearElastic,
    MohrCoulomb,
    DruckerPrager,
    ModifiedCamClay,
    HardeningSoil,
}

impl ConstitutiveModel {
    /// Constitutive law name understood by the solver.
    pub fn law_name(self) -> &'static str {
        match self {
            ConstitutiveModel::LinearElastic => "LinearElastic3DLaw",
            ConstitutiveModel::MohrCoulomb => "MohrCoulombPlasticity3DLaw",
            ConstitutiveModel::DruckerPrager => "DruckerPragerPlasticity3DLaw",
            ConstitutiveModel::ModifiedCamClay => "ModifiedCamClay3DLaw",
            ConstitutiveModel::HardeningSoil => "HardeningSoil3DLaw",
        }
    }
}

/// Hydraulic conductivity along the three axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Permeability {
    pub xx: f64,
    pub yy: f64,
    pub zz: f64,
}

impl Permeability {
    pub fn isotropic(k: f64) -> Self {
        Self { xx: k, yy: k, zz: k }
    }
}

/// Critical-state consolidation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationParameters {
    /// Slope of the normal compression line (λ).
    pub normal_compression_slope: f64,
    /// Slope of the swelling line (κ).
    pub swelling_slope: f64,
    /// Slope of the critical state line (M).
    pub critical_state_line: f64,
    pub void_ratio: f64,
    pub preconsolidation_pressure: f64,
    /// Overconsolidation ratio.
    pub ocr: f64,
}

/// A value written into a deck `Properties` block.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

/// Material properties for one subdomain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Property id used in the deck.
    pub material_id: u32,
    pub name: String,
    /// Mass density.
    pub density: f64,
    /// Young's modulus.
    pub youngs_modulus: f64,
    /// Poisson's ratio (dimensionless, -1 < ν < 0.5).
    pub poissons_ratio: f64,
    pub cohesion: f64,
    /// Friction angle (degrees).
    pub friction_angle: f64,
    /// Dilatancy angle (degrees).
    pub dilatancy_angle: f64,
    pub permeability: Permeability,
    pub constitutive_model: ConstitutiveModel,
    pub consolidation: Option<ConsolidationParameters>,
}

impl Material {
    /// Create a linear elastic material with all other properties zero.
    ///
    /// # Errors
    ///
    /// Returns error if the elastic constants are physically invalid.
    pub fn new(
        material_id: u32,
        name: impl Into<String>,
        youngs_modulus: f64,
        poissons_ratio: f64,
    ) -> Result<Self> {
        let material = Self {
            material_id,
            name: name.into(),
            density: 0.0,
            youngs_modulus,
            poissons_ratio,
            cohesion: 0.0,
            friction_angle: 0.0,
            dilatancy_angle: 0.0,
            permeability: Permeability::default(),
            constitutive_model: ConstitutiveModel::LinearElastic,
            consolidation: None,
        };
        material.validate()?;
        Ok(material)
    }

    /// Set the density.
    pub fn with_density(mut self, density: f64) -> Result<Self> {
        self.density = density;
        self.validate()?;
        Ok(self)
    }

    /// Set Mohr-Coulomb strength parameters and switch to that model.
    pub fn with_strength(mut self, cohesion: f64, friction_angle: f64, dilatancy_angle: f64) -> Result<Self> {
        self.cohesion = cohesion;
        self.friction_angle = friction_angle;
        self.dilatancy_angle = dilatancy_angle;
        self.constitutive_model = ConstitutiveModel::MohrCoulomb;
        self.validate()?;
        Ok(self)
    }

    pub fn with_permeability(mut self, permeability: Permeability) -> Result<Self> {
        self.permeability = permeability;
        self.validate()?;
        Ok(self)
    }

    pub fn with_model(mut self, model: ConstitutiveModel) -> Self {
        self.constitutive_model = model;
        self
    }

    pub fn with_consolidation(mut self, params: ConsolidationParameters) -> Result<Self> {
        self.consolidation = Some(params);
        self.validate()?;
        Ok(self)
    }

    /// Check that every property is physically possible.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidMaterial(format!("{} ({}): {msg}", self.name, self.material_id)));

        if !(self.youngs_modulus > 0.0) {
            return fail("Young's modulus must be positive".into());
        }
        if self.poissons_ratio <= -1.0 || self.poissons_ratio >= 0.5 {
            return fail("Poisson's ratio must be in range (-1, 0.5)".into());
        }
        if self.density < 0.0 {
            return fail("density must not be negative".into());
        }
        if self.cohesion < 0.0 {
            return fail("cohesion must not be negative".into());
        }
        if !(0.0..90.0).contains(&self.friction_angle) {
            return fail(format!("friction angle {} outside [0, 90)", self.friction_angle));
        }
        if !(0.0..90.0).contains(&self.dilatancy_angle) {
            return fail(format!("dilatancy angle {} outside [0, 90)", self.dilatancy_angle));
        }
        let k = &self.permeability;
        if k.xx < 0.0 || k.yy < 0.0 || k.zz < 0.0 {
            return fail("permeability must not be negative".into());
        }
        if let Some(c) = &self.consolidation {
            if !(c.swelling_slope > 0.0 && c.normal_compression_slope > c.swelling_slope) {
                return fail("consolidation slopes must satisfy 0 < kappa < lambda".into());
            }
            if c.void_ratio <= 0.0 || c.preconsolidation_pressure <= 0.0 || c.ocr < 1.0 {
                return fail("void ratio and preconsolidation pressure must be positive, OCR >= 1".into());
            }
        }
        Ok(())
    }

    /// Properties in deck order, names uppercase.
    pub fn deck_properties(&self) -> Vec<(&'static str, PropertyValue)> {
        use PropertyValue::{Number, Text};

        let mut props = vec![
            ("DENSITY", Number(self.density)),
            ("YOUNG_MODULUS", Number(self.youngs_modulus)),
            ("POISSON_RATIO", Number(self.poissons_ratio)),
            ("COHESION", Number(self.cohesion)),
            ("FRICTION_ANGLE", Number(self.friction_angle)),
            ("DILATANCY_ANGLE", Number(self.dilatancy_angle)),
            ("PERMEABILITY_XX", Number(self.permeability.xx)),
            ("PERMEABILITY_YY", Number(self.permeability.yy)),
            ("PERMEABILITY_ZZ", Number(self.permeability.zz)),
            ("CONSTITUTIVE_LAW", Text(self.constitutive_model.law_name().to_string())),
        ];
        if let Some(c) = &self.consolidation {
            props.extend([
                ("NORMAL_COMPRESSION_SLOPE", Number(c.normal_compression_slope)),
                ("SWELLING_SLOPE", Number(c.swelling_slope)),
                ("CRITICAL_STATE_LINE", Number(c.critical_state_line)),
                ("VOID_RATIO", Number(c.void_ratio)),
                ("PRECONSOLIDATION_PRESSURE", Number(c.preconsolidation_pressure)),
                ("OCR", Number(c.ocr)),
            ]);
        }
        props
    }
}

/// Common geotechnical presets (SI units: Pa, kg/m³, m/s, degrees).
impl Material {
    /// Soft clay (E = 5 MPa, ν = 0.35, c = 10 kPa, φ = 20°).
    pub fn soft_clay(material_id: u32) -> Self {
        Self {
            material_id,
            name: "Soft clay".to_string(),
            density: 1800.0,
            youngs_modulus: 5e6,
            poissons_ratio: 0.35,
            cohesion: 10e3,
            friction_angle: 20.0,
            dilatancy_angle: 0.0,
            permeability: Permeability::isotropic(1e-9),
            constitutive_model: ConstitutiveModel::MohrCoulomb,
            consolidation: None,
        }
    }

    /// Dense sand (E = 50 MPa, ν = 0.3, c = 0, φ = 38°, ψ = 8°).
    pub fn dense_sand(material_id: u32) -> Self {
        Self {
            material_id,
            name: "Dense sand".to_string(),
            density: 2000.0,
            youngs_modulus: 50e6,
            poissons_ratio: 0.3,
            cohesion: 0.0,
            friction_angle: 38.0,
            dilatancy_angle: 8.0,
            permeability: Permeability::isotropic(1e-4),
            constitutive_model: ConstitutiveModel::MohrCoulomb,
            consolidation: None,
        }
    }

    /// Structural concrete (E = 30 GPa, ν = 0.2, ρ = 2500 kg/m³).
    pub fn concrete(material_id: u32) -> Self {
        Self {
            material_id,
            name: "Concrete C30".to_string(),
            density: 2500.0,
            youngs_modulus: 30e9,
            poissons_ratio: 0.2,
            cohesion: 0.0,
            friction_angle: 0.0,
            dilatancy_angle: 0.0,
            permeability: Permeability::default(),
            constitutive_model: ConstitutiveModel::LinearElastic,
            consolidation: None,
        }
    }
}

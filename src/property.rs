use serde::{Deserialize, Serialize};

use crate::error::{Result, StructureError};

/// Isotropic material referenced by index from [`FeaProperty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaMaterial {
    pub name: String,
    pub density: f64,
    pub elastic_modulus: f64,
    pub poisson_ratio: f64,
    pub thermal_expansion: f64,
    /// Built-in materials cannot be removed.
    #[serde(default)]
    pub builtin: bool,
}

impl Default for FeaMaterial {
    fn default() -> Self {
        Self {
            name: "Material".into(),
            density: 1.0,
            elastic_modulus: 0.0,
            poisson_ratio: 0.0,
            thermal_expansion: 0.0,
            builtin: false,
        }
    }
}

impl FeaMaterial {
    fn built_in(name: &str, density: f64, elastic_modulus: f64, poisson_ratio: f64, thermal_expansion: f64) -> Self {
        Self {
            name: name.into(),
            density,
            elastic_modulus,
            poisson_ratio,
            thermal_expansion,
            builtin: true,
        }
    }

    /// `E / (2 (1 + ν))`.
    #[must_use]
    pub fn shear_modulus(&self) -> f64 {
        self.elastic_modulus / (2.0 * (self.poisson_ratio + 1.0))
    }
}

/// Element family a property applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    #[default]
    Shell,
    Beam,
}

/// Beam cross-section shape; `dims` meaning depends on the shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossSection {
    #[default]
    General,
    Circle,
    Pipe,
    I,
    Rectangle,
    Box,
}

/// Shell or beam section property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaProperty {
    pub name: String,
    pub kind: PropertyKind,
    pub thickness: f64,
    pub area: f64,
    pub izz: f64,
    pub iyy: f64,
    pub izy: f64,
    pub ixx: f64,
    pub cross_section: CrossSection,
    pub dims: [f64; 6],
    pub material_index: usize,
}

impl Default for FeaProperty {
    fn default() -> Self {
        Self {
            name: "Property".into(),
            kind: PropertyKind::Shell,
            thickness: 0.1,
            area: 0.1,
            izz: 0.1,
            iyy: 0.1,
            izy: 0.0,
            ixx: 0.0,
            cross_section: CrossSection::General,
            dims: [0.0; 6],
            material_index: 0,
        }
    }
}

impl FeaProperty {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }
}

/// Index of `DefaultShell` in a fresh library.
pub const DEFAULT_SHELL_PROPERTY: usize = 0;
/// Index of `DefaultBeam` in a fresh library.
pub const DEFAULT_BEAM_PROPERTY: usize = 1;

const DEFAULT_MATERIAL: usize = 1;

/// Property and material tables shared by every structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyLibrary {
    materials: Vec<FeaMaterial>,
    properties: Vec<FeaProperty>,
    material_count: usize,
    property_count: usize,
}

impl Default for PropertyLibrary {
    fn default() -> Self {
        let materials = vec![
            FeaMaterial::built_in("_Al7075T6", 2810.0, 71.7e9, 0.33, 23.4e-6),
            FeaMaterial::built_in("_Al6061T6", 2700.0, 68.9e9, 0.33, 23.6e-6),
            FeaMaterial::built_in("_Ti6Al4V", 4430.0, 113.8e9, 0.342, 8.6e-6),
            FeaMaterial::built_in("_CarbonSteel", 7870.0, 200.0e9, 0.29, 11.7e-6),
            FeaMaterial::built_in("_Steel4130", 7850.0, 205.0e9, 0.29, 12.3e-6),
        ];
        let properties = vec![
            FeaProperty {
                material_index: DEFAULT_MATERIAL,
                ..FeaProperty::new("DefaultShell", PropertyKind::Shell)
            },
            FeaProperty {
                material_index: DEFAULT_MATERIAL,
                ..FeaProperty::new("DefaultBeam", PropertyKind::Beam)
            },
        ];
        Self {
            materials,
            properties,
            material_count: 0,
            property_count: 0,
        }
    }
}

impl PropertyLibrary {
    /// Library holding the built-in materials and the two default properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn materials(&self) -> &[FeaMaterial] {
        &self.materials
    }

    #[must_use]
    pub fn properties(&self) -> &[FeaProperty] {
        &self.properties
    }

    #[must_use]
    pub fn material(&self, index: usize) -> Option<&FeaMaterial> {
        self.materials.get(index)
    }

    #[must_use]
    pub fn property(&self, index: usize) -> Option<&FeaProperty> {
        self.properties.get(index)
    }

    pub fn property_mut(&mut self, index: usize) -> Option<&mut FeaProperty> {
        self.properties.get_mut(index)
    }

    /// Returns `true` if `index` names an existing property.
    #[must_use]
    pub fn is_valid_property(&self, index: i32) -> bool {
        usize::try_from(index).is_ok_and(|i| i < self.properties.len())
    }

    /// Appends a user material named `Material<n>` and returns its index.
    pub fn add_material(&mut self) -> usize {
        let name = format!("Material{}", self.material_count);
        self.material_count += 1;
        self.materials.push(FeaMaterial {
            name,
            ..FeaMaterial::default()
        });
        self.materials.len() - 1
    }

    /// Removes a user material.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range, names a built-in material
    /// or is still referenced by a property.
    pub fn remove_material(&mut self, index: usize) -> Result<FeaMaterial> {
        let len = self.materials.len();
        let material = self
            .materials
            .get(index)
            .ok_or(StructureError::InvalidIndex { index, len })?;
        if material.builtin {
            return Err(StructureError::InvalidInput(format!("material {} is built in", material.name)).into());
        }
        if self.properties.iter().any(|p| p.material_index == index) {
            return Err(StructureError::InvalidInput(format!("material {} is in use", material.name)).into());
        }
        for p in &mut self.properties {
            if p.material_index > index {
                p.material_index -= 1;
            }
        }
        Ok(self.materials.remove(index))
    }

    /// Appends a property named `Property<n>` and returns its index.
    pub fn add_property(&mut self, kind: PropertyKind) -> usize {
        let name = format!("Property{}", self.property_count);
        self.property_count += 1;
        self.properties.push(FeaProperty {
            material_index: DEFAULT_MATERIAL,
            ..FeaProperty::new(name, kind)
        });
        self.properties.len() - 1
    }

    /// Removes a property. Parts still referring to it stop resolving.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn remove_property(&mut self, index: usize) -> Result<FeaProperty> {
        let len = self.properties.len();
        if index >= len {
            return Err(StructureError::InvalidIndex { index, len }.into());
        }
        Ok(self.properties.remove(index))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn defaults_sit_at_part_indices() {
        let lib = PropertyLibrary::new();
        assert_eq!(lib.property(DEFAULT_SHELL_PROPERTY).unwrap().name, "DefaultShell");
        assert_eq!(lib.property(DEFAULT_BEAM_PROPERTY).unwrap().kind, PropertyKind::Beam);
        let mat = lib.material(lib.property(0).unwrap().material_index).unwrap();
        assert_eq!(mat.name, "_Al6061T6");
    }

    #[test]
    fn shear_modulus() {
        let m = FeaMaterial {
            elastic_modulus: 260.0,
            poisson_ratio: 0.3,
            ..FeaMaterial::default()
        };
        assert_relative_eq!(m.shear_modulus(), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn builtin_material_is_kept() {
        let mut lib = PropertyLibrary::new();
        assert!(lib.remove_material(0).is_err());
        let idx = lib.add_material();
        assert_eq!(lib.material(idx).unwrap().name, "Material0");
        assert!(lib.remove_material(idx).is_ok());
    }

    #[test]
    fn material_in_use_is_kept() {
        let mut lib = PropertyLibrary::new();
        let m = lib.add_material();
        let p = lib.add_property(PropertyKind::Beam);
        lib.property_mut(p).unwrap().material_index = m;
        assert!(lib.remove_material(m).is_err());
    }

    #[test]
    fn property_validity() {
        let mut lib = PropertyLibrary::new();
        assert!(lib.is_valid_property(1));
        assert!(!lib.is_valid_property(-1));
        assert!(!lib.is_valid_property(2));
        assert!(lib.remove_property(5).is_err());
        lib.remove_property(1).unwrap();
        assert!(!lib.is_valid_property(1));
    }
}

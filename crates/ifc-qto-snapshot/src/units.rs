// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit scale extraction

use ifc_qto_model::{AttributeValue, DecodedEntity, EntityResolver, IfcType};

/// Extract the length unit scale of a model
///
/// Follows IFCPROJECT.UnitsInContext to the length unit. Returns 1.0 when no
/// unit information is found.
pub fn extract_unit_scale(resolver: &dyn EntityResolver) -> f64 {
    let projects = resolver.entities_by_type(&IfcType::IfcProject);
    let Some(project) = projects.first() else {
        return 1.0;
    };

    // IFCPROJECT has UnitsInContext at index 8
    let Some(assignment) = project.get_ref(8).and_then(|id| resolver.get(id)) else {
        return 1.0;
    };

    // IFCUNITASSIGNMENT has Units list at index 0
    assignment
        .get_list(0)
        .unwrap_or_default()
        .iter()
        .filter_map(|attr| resolver.resolve_ref(attr))
        .find_map(|unit| length_unit_scale(&unit, resolver))
        .unwrap_or(1.0)
}

/// Scale of an IFCSIUNIT or IFCCONVERSIONBASEDUNIT, if it is a length unit
fn length_unit_scale(unit: &DecodedEntity, resolver: &dyn EntityResolver) -> Option<f64> {
    // UnitType at index 1 for both unit kinds
    if unit.get_enum(1)? != "LENGTHUNIT" {
        return None;
    }

    match unit.ifc_type {
        IfcType::IfcSIUnit => {
            // IFCSIUNIT(*, UnitType, Prefix, Name)
            if unit.get_enum(3)? != "METRE" {
                return None;
            }
            Some(unit.get_enum(2).map(si_prefix_scale).unwrap_or(1.0))
        }
        IfcType::IfcConversionBasedUnit => {
            // IFCCONVERSIONBASEDUNIT(Dimensions, UnitType, Name, ConversionFactor)
            let factor = resolver.get(unit.get_ref(3)?)?;
            if factor.ifc_type != IfcType::IfcMeasureWithUnit {
                return None;
            }
            // IFCMEASUREWITHUNIT(ValueComponent, UnitComponent)
            let value = factor.get(0).and_then(AttributeValue::as_float)?;
            let base = factor
                .get_ref(1)
                .and_then(|id| resolver.get(id))
                .and_then(|base| length_unit_scale(&base, resolver))
                .unwrap_or(1.0);
            Some(value * base)
        }
        _ => None,
    }
}

fn si_prefix_scale(prefix: &str) -> f64 {
    match prefix {
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolverImpl;
    use ifc_qto_model::{AttributeValue as A, EntityId};

    fn project_with_unit(unit: DecodedEntity) -> ResolverImpl {
        let unit_id = unit.id;
        let mut project_attrs = vec![A::Null; 9];
        project_attrs[8] = A::EntityRef(EntityId(2));
        ResolverImpl::new(vec![
            DecodedEntity::new(1, IfcType::IfcProject, project_attrs),
            DecodedEntity::new(
                2,
                IfcType::IfcUnitAssignment,
                vec![A::List(vec![A::EntityRef(unit_id)])],
            ),
            unit,
        ])
        .unwrap()
    }

    #[test]
    fn test_millimetre_scale() {
        let resolver = project_with_unit(DecodedEntity::new(
            3,
            IfcType::IfcSIUnit,
            vec![
                A::Derived,
                A::Enum("LENGTHUNIT".into()),
                A::Enum("MILLI".into()),
                A::Enum("METRE".into()),
            ],
        ));
        assert!((extract_unit_scale(&resolver) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_non_length_unit_ignored() {
        let resolver = project_with_unit(DecodedEntity::new(
            3,
            IfcType::IfcSIUnit,
            vec![
                A::Derived,
                A::Enum("AREAUNIT".into()),
                A::Null,
                A::Enum("SQUARE_METRE".into()),
            ],
        ));
        assert_eq!(extract_unit_scale(&resolver), 1.0);
    }

    #[test]
    fn test_missing_project_defaults_to_metre() {
        let resolver = ResolverImpl::new(vec![]).unwrap();
        assert_eq!(extract_unit_scale(&resolver), 1.0);
    }
}

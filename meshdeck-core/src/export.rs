//! Model exporters.
//!
//! Two formats:
//!
//! - JSON: a direct serde serialization of [`CanonicalModel`]. Floats
//!   round-trip exactly, so [`from_json`] reproduces the model.
//! - Deck: the block-structured text file read by the solver.
//!
//! # Deck layout
//!
//! ```text
//! Begin Nodes
//! 1 0.000000 0.000000 0.000000
//! End Nodes
//!
//! Begin Elements Element3D8N
//! 1 1 1 2 3 4 5 6 7 8
//! End Elements
//!
//! Begin Properties 1
//! DENSITY 2000.0
//! CONSTITUTIVE_LAW "LinearElastic3DLaw"
//! End Properties
//! ```
//!
//! One `Elements` block is written per element type, in order of first
//! appearance. Surface entries go into `Conditions` blocks. Sub-model parts
//! for subdomains and boundary conditions follow when requested.

use crate::assembly::{CanonicalModel, DEFAULT_PROPERTY_ID};
use crate::element::ElementType;
use crate::error::Result;
use crate::material::PropertyValue;
use crate::mesh::Element;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

/// Where element property ids come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyIdMode {
    /// Material id of the element's subdomain.
    #[default]
    FromSubdomain,
    /// The same id for every element.
    Constant(u32),
}

/// Deck writer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeckOptions {
    /// Write `SubModelPart` blocks for subdomains and boundary conditions.
    pub include_sub_model_parts: bool,
    pub property_id: PropertyIdMode,
}

/// Serialize a model to compact JSON.
pub fn to_json(model: &CanonicalModel) -> Result<String> {
    Ok(serde_json::to_string(model)?)
}

/// Serialize a model to indented JSON.
pub fn to_json_pretty(model: &CanonicalModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// Parse a model written by [`to_json`] or [`to_json_pretty`].
pub fn from_json(json: &str) -> Result<CanonicalModel> {
    Ok(serde_json::from_str(json)?)
}

/// Write a model as a solver deck.
pub fn to_deck(model: &CanonicalModel, options: &DeckOptions) -> Result<String> {
    let mut out = String::new();
    let properties = property_ids(model, options.property_id);

    writeln!(out, "Begin Nodes")?;
    for node in &model.nodes {
        let p = &node.coordinates;
        writeln!(out, "{} {:.6} {:.6} {:.6}", node.id, p.x, p.y, p.z)?;
    }
    writeln!(out, "End Nodes")?;

    for (element_type, elements) in group_by_type(&model.elements) {
        let block = if element_type.is_condition() {
            "Conditions"
        } else {
            "Elements"
        };
        writeln!(out)?;
        writeln!(out, "Begin {block} {}", element_type.solver_name())?;
        for element in elements {
            let property = properties.get(&element.id).copied().unwrap_or(DEFAULT_PROPERTY_ID);
            write!(out, "{} {}", element.id, property)?;
            for node in &element.connectivity {
                write!(out, " {node}")?;
            }
            writeln!(out)?;
        }
        writeln!(out, "End {block}")?;
    }

    write_properties(&mut out, model)?;

    if options.include_sub_model_parts {
        write_sub_model_parts(&mut out, model)?;
    }

    log::debug!(
        "deck written: {} nodes, {} elements, {} bytes",
        model.nodes.len(),
        model.elements.len(),
        out.len()
    );
    Ok(out)
}

fn property_ids(model: &CanonicalModel, mode: PropertyIdMode) -> HashMap<usize, u32> {
    match mode {
        PropertyIdMode::Constant(id) => model.elements.iter().map(|e| (e.id, id)).collect(),
        PropertyIdMode::FromSubdomain => model
            .subdomains
            .iter()
            .flat_map(|s| s.element_ids.iter().map(move |&id| (id, s.material_id)))
            .collect(),
    }
}

/// Elements grouped by type in first-appearance order, ascending id within a group.
fn group_by_type(elements: &[Element]) -> Vec<(ElementType, Vec<&Element>)> {
    let mut groups: Vec<(ElementType, Vec<&Element>)> = Vec::new();
    for element in elements {
        match groups.iter_mut().find(|(t, _)| *t == element.element_type) {
            Some((_, members)) => members.push(element),
            None => groups.push((element.element_type, vec![element])),
        }
    }
    for (_, members) in &mut groups {
        members.sort_by_key(|e| e.id);
    }
    groups
}

/// Deck lines are whitespace separated, so text values are quoted with
/// quotes, backslashes and line breaks escaped.
fn format_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Number(x) => format!("{x:?}"),
        PropertyValue::Text(s) => {
            let mut quoted = String::with_capacity(s.len() + 2);
            quoted.push('"');
            for c in s.chars() {
                match c {
                    '"' => quoted.push_str("\\\""),
                    '\\' => quoted.push_str("\\\\"),
                    '\n' => quoted.push_str("\\n"),
                    '\r' => quoted.push_str("\\r"),
                    _ => quoted.push(c),
                }
            }
            quoted.push('"');
            quoted
        }
    }
}

fn write_properties(out: &mut String, model: &CanonicalModel) -> Result<()> {
    if model.materials.is_empty() {
        writeln!(out)?;
        writeln!(out, "Begin Properties {DEFAULT_PROPERTY_ID}")?;
        writeln!(out, "End Properties")?;
        return Ok(());
    }
    for material in &model.materials {
        writeln!(out)?;
        writeln!(out, "Begin Properties {}", material.material_id)?;
        for (name, value) in material.deck_properties() {
            writeln!(out, "{name} {}", format_value(&value))?;
        }
        writeln!(out, "End Properties")?;
    }
    Ok(())
}

fn write_id_block(out: &mut String, block: &str, ids: impl IntoIterator<Item = usize>) -> Result<()> {
    writeln!(out, "  Begin {block}")?;
    for id in ids {
        writeln!(out, "    {id}")?;
    }
    writeln!(out, "  End {block}")?;
    Ok(())
}

fn write_sub_model_parts(out: &mut String, model: &CanonicalModel) -> Result<()> {
    let by_id: HashMap<usize, &Element> = model.elements.iter().map(|e| (e.id, e)).collect();

    for subdomain in &model.subdomains {
        let members: Vec<&Element> = subdomain
            .element_ids
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .collect();
        let nodes: BTreeSet<usize> = members
            .iter()
            .flat_map(|e| e.connectivity.iter().copied())
            .collect();
        let (conditions, elements): (Vec<&Element>, Vec<&Element>) =
            members.into_iter().partition(|e| e.element_type.is_condition());

        writeln!(out)?;
        writeln!(out, "Begin SubModelPart {}", subdomain.name)?;
        write_id_block(out, "SubModelPartNodes", nodes)?;
        write_id_block(out, "SubModelPartElements", elements.iter().map(|e| e.id))?;
        if !conditions.is_empty() {
            write_id_block(out, "SubModelPartConditions", conditions.iter().map(|e| e.id))?;
        }
        writeln!(out, "End SubModelPart")?;
    }

    for bc in &model.boundary_conditions {
        let nodes: BTreeSet<usize> = bc.applied_node_ids.iter().copied().collect();
        writeln!(out)?;
        writeln!(out, "Begin SubModelPart {}_{}", bc.kind.variable_name(), bc.id)?;
        write_id_block(out, "SubModelPartNodes", nodes)?;
        writeln!(out, "End SubModelPart")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{assemble, AssemblyOptions};
    use crate::boundary::BoundaryCondition;
    use crate::material::Material;
    use crate::mesh::Node;
    use crate::types::Point3;

    fn two_triangles() -> CanonicalModel {
        let coords = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let nodes: Vec<Node> = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Node {
                id: i + 1,
                coordinates: Point3::new(x, y, 0.0),
            })
            .collect();
        let elements = vec![
            Element {
                id: 1,
                element_type: ElementType::Tri3,
                connectivity: vec![1, 2, 3],
            },
            Element {
                id: 2,
                element_type: ElementType::Tri3,
                connectivity: vec![1, 3, 4],
            },
        ];
        let bcs = [BoundaryCondition::fixed_displacement(1, "base", vec![2, 1])];
        assemble(
            &nodes,
            &elements,
            &[Material::dense_sand(1), Material::soft_clay(2)],
            &bcs,
            &AssemblyOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_deck_blocks() {
        let deck = to_deck(&two_triangles(), &DeckOptions::default()).unwrap();

        assert!(deck.starts_with("Begin Nodes\n1 0.000000 0.000000 0.000000\n"));
        assert!(deck.contains("3 1.000000 1.000000 0.000000\n"));
        assert!(deck.contains("Begin Elements Element2D3N\n1 1 1 2 3\n2 2 1 3 4\nEnd Elements\n"));
        assert!(deck.contains("Begin Properties 2\n"));
        assert!(deck.contains("DENSITY 2000.0\n"));
        assert!(deck.contains("POISSON_RATIO 0.3\n"));
        assert!(deck.contains("CONSTITUTIVE_LAW \"MohrCoulombPlasticity3DLaw\"\n"));
        assert!(!deck.contains("SubModelPart"));
    }

    #[test]
    fn test_constant_property_id() {
        let options = DeckOptions {
            property_id: PropertyIdMode::Constant(1),
            ..Default::default()
        };
        let deck = to_deck(&two_triangles(), &options).unwrap();
        assert!(deck.contains("2 1 1 3 4\n"));
    }

    #[test]
    fn test_sub_model_parts() {
        let options = DeckOptions {
            include_sub_model_parts: true,
            ..Default::default()
        };
        let deck = to_deck(&two_triangles(), &options).unwrap();

        assert!(deck.contains(
            "Begin SubModelPart Subdomain_1\n  Begin SubModelPartNodes\n    1\n    2\n    3\n  End SubModelPartNodes\n  Begin SubModelPartElements\n    1\n  End SubModelPartElements\nEnd SubModelPart\n"
        ));
        assert!(deck.contains("Begin SubModelPart DISPLACEMENT_1\n  Begin SubModelPartNodes\n    1\n    2\n"));
    }

    #[test]
    fn test_group_by_type_first_appearance() {
        let element = |id, element_type| Element {
            id,
            element_type,
            connectivity: vec![],
        };
        let elements = vec![
            element(3, ElementType::Quad4),
            element(1, ElementType::Tri3),
            element(2, ElementType::Quad4),
        ];
        let groups = group_by_type(&elements);
        assert_eq!(groups[0].0, ElementType::Quad4);
        assert_eq!(groups[0].1.iter().map(|e| e.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(groups[1].0, ElementType::Tri3);
    }

    #[test]
    fn test_json_round_trip() {
        let model = two_triangles();
        assert_eq!(from_json(&to_json(&model).unwrap()).unwrap(), model);
        assert_eq!(from_json(&to_json_pretty(&model).unwrap()).unwrap(), model);
    }

    #[test]
    fn test_text_values_stay_on_one_line() {
        let value = PropertyValue::Text("soft \"grey\" clay\nC:\\x".to_string());
        let formatted = format_value(&value);
        assert_eq!(formatted, r#""soft \"grey\" clay\nC:\\x""#);
        assert!(!formatted.contains('\n'));
        assert_eq!(format_value(&PropertyValue::Text("LinearElastic3DLaw".into())), "\"LinearElastic3DLaw\"");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(from_json("{\"info\": 3}").is_err());
    }
}

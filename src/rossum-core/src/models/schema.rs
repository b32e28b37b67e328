use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonMap;
use crate::resources::{ApiResource, ResourceKind};

/// Set of datapoints extracted from the documents of a queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub queues: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Vec<Section>,
    #[serde(default)]
    pub metadata: JsonMap,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl ApiResource for Schema {
    const KIND: ResourceKind = ResourceKind::Schema;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub children: Vec<SectionChild>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Node directly below a section, discriminated by its `category`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum SectionChild {
    Datapoint(Datapoint),
    Multivalue(Multivalue),
    Tuple(Tuple),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub id: String,
    /// `string`, `number`, `date`, `enum`, `button`, `formula` or `reasoning`
    #[serde(default, rename = "type")]
    pub datapoint_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disable_prediction: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "super::default_true")]
    pub can_export: bool,
    #[serde(default)]
    pub can_collapse: bool,
    #[serde(default)]
    pub rir_field_names: Option<Vec<String>>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub constraints: JsonMap,
    #[serde(default)]
    pub score_threshold: Option<f64>,
    #[serde(default)]
    pub options: Option<Vec<Value>>,
    #[serde(default)]
    pub ui_configuration: Option<JsonMap>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub stretch: bool,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub context: Option<Vec<String>>,
}

impl Datapoint {
    fn is_type(&self, name: &str) -> bool {
        self.datapoint_type.as_deref() == Some(name)
    }

    pub fn is_button(&self) -> bool {
        self.is_type("button")
    }

    pub fn is_formula(&self) -> bool {
        self.is_type("formula")
    }

    pub fn is_reasoning(&self) -> bool {
        self.is_type("reasoning")
    }
}

/// Repeated datapoint or tuple (line items)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multivalue {
    pub id: String,
    pub children: MultivalueChild,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub rir_field_names: Option<Vec<String>>,
    #[serde(default)]
    pub min_occurrences: Option<u32>,
    #[serde(default)]
    pub max_occurrences: Option<u32>,
    #[serde(default)]
    pub grid: Option<JsonMap>,
    #[serde(default)]
    pub show_grid_by_default: bool,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum MultivalueChild {
    Datapoint(Datapoint),
    Tuple(Tuple),
}

/// One table row; children are datapoints with distinct ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    pub id: String,
    #[serde(default)]
    pub children: Vec<Datapoint>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub disable_prediction: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub rir_field_names: Option<Vec<String>>,
}

/// Borrowed view of any node below a section
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaNode<'a> {
    Datapoint(&'a Datapoint),
    Multivalue(&'a Multivalue),
    Tuple(&'a Tuple),
}

impl<'a> SchemaNode<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            SchemaNode::Datapoint(d) => &d.id,
            SchemaNode::Multivalue(m) => &m.id,
            SchemaNode::Tuple(t) => &t.id,
        }
    }

    pub fn as_datapoint(&self) -> Option<&'a Datapoint> {
        match self {
            SchemaNode::Datapoint(d) => Some(d),
            _ => None,
        }
    }
}

fn push_datapoint<'a>(out: &mut Vec<SchemaNode<'a>>, datapoint: &'a Datapoint, ignore_buttons: bool) {
    if !(ignore_buttons && datapoint.is_button()) {
        out.push(SchemaNode::Datapoint(datapoint));
    }
}

fn push_tuple<'a>(out: &mut Vec<SchemaNode<'a>>, tuple: &'a Tuple, ignore_buttons: bool) {
    out.push(SchemaNode::Tuple(tuple));
    for child in &tuple.children {
        push_datapoint(out, child, ignore_buttons);
    }
}

impl Schema {
    /// Depth-first walk over every node, parents before children
    pub fn traverse(&self, ignore_buttons: bool) -> Vec<SchemaNode<'_>> {
        let mut out = Vec::new();
        for section in &self.content {
            for child in &section.children {
                match child {
                    SectionChild::Datapoint(d) => push_datapoint(&mut out, d, ignore_buttons),
                    SectionChild::Tuple(t) => push_tuple(&mut out, t, ignore_buttons),
                    SectionChild::Multivalue(m) => {
                        out.push(SchemaNode::Multivalue(m));
                        match &m.children {
                            MultivalueChild::Datapoint(d) => {
                                push_datapoint(&mut out, d, ignore_buttons)
                            }
                            MultivalueChild::Tuple(t) => push_tuple(&mut out, t, ignore_buttons),
                        }
                    }
                }
            }
        }
        out
    }

    pub fn get_by_id(&self, node_id: &str, ignore_buttons: bool) -> Option<SchemaNode<'_>> {
        self.traverse(ignore_buttons)
            .into_iter()
            .find(|node| node.id() == node_id)
    }

    pub fn formula_fields(&self) -> Vec<&Datapoint> {
        self.datapoints_where(Datapoint::is_formula)
    }

    pub fn reasoning_fields(&self) -> Vec<&Datapoint> {
        self.datapoints_where(Datapoint::is_reasoning)
    }

    fn datapoints_where(&self, predicate: fn(&Datapoint) -> bool) -> Vec<&Datapoint> {
        self.traverse(true)
            .into_iter()
            .filter_map(|node| node.as_datapoint())
            .filter(|d| predicate(d))
            .collect()
    }
}

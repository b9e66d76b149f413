//! Declarative response schemas for schema-constrained generation.
//!
//! Each gateway operation sends one of these alongside its prompt as the
//! Gemini `responseSchema`. Properties keep their declaration order, which is
//! also sent as `propertyOrdering`.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_properties")]
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

fn serialize_properties<S: Serializer>(
    properties: &[Property],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(properties.len()))?;
    for property in properties {
        map.serialize_entry(&property.name, &property.schema)?;
    }
    map.end()
}

impl Schema {
    fn leaf(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            properties: Vec::new(),
            property_ordering: Vec::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    pub fn string_array() -> Self {
        Self::array(Self::string())
    }

    /// Object whose properties are all required.
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let properties: Vec<Property> = properties
            .into_iter()
            .map(|(name, schema)| Property {
                name: name.to_string(),
                schema,
            })
            .collect();
        let names: Vec<String> = properties.iter().map(|p| p.name.clone()).collect();

        Self {
            properties,
            property_ordering: names.clone(),
            required: names,
            ..Self::leaf(SchemaType::Object)
        }
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.schema)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

pub fn etymology() -> Schema {
    Schema::object(vec![
        ("prefix", Schema::string()),
        ("root", Schema::string()),
        ("suffix", Schema::string()),
        ("explanation", Schema::string()),
        ("explanationKorean", Schema::string()),
        ("relatedWords", Schema::string_array()),
    ])
}

pub fn nuances() -> Schema {
    Schema::array(Schema::object(vec![
        (
            "nuance",
            Schema::string().described("The title of the nuance, e.g., 'Expressing Possibility'."),
        ),
        (
            "nuanceKorean",
            Schema::string().described("Korean translation of the nuance title."),
        ),
        (
            "explanation",
            Schema::string().described("A simple explanation of the nuance."),
        ),
        (
            "explanationKorean",
            Schema::string().described("Korean translation of the explanation."),
        ),
        (
            "example",
            Schema::string().described("An example sentence showcasing the nuance."),
        ),
        (
            "exampleKorean",
            Schema::string().described("Korean translation of the example sentence."),
        ),
    ]))
}

pub fn definition() -> Schema {
    Schema::object(vec![
        ("partOfSpeech", Schema::string()),
        ("definition", Schema::string()),
        ("definitionKorean", Schema::string()),
    ])
}

pub fn story() -> Schema {
    Schema::object(vec![
        ("story", Schema::string()),
        ("storyKorean", Schema::string()),
        ("imagePrompt", Schema::string()),
    ])
}

pub fn nuance_translation() -> Schema {
    Schema::object(vec![
        ("fullTranslation", Schema::string()),
        (
            "annotatedWords",
            Schema::array(Schema::object(vec![
                ("englishWord", Schema::string()),
                ("recommendedChuimsae", Schema::string()),
                ("options", Schema::string_array()),
            ])),
        ),
    ])
}

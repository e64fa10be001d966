use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single idea returned to the client
///
/// Loosely typed on purpose: model output varies per category, so anything we
/// don't name explicitly is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub google_rating: Option<f64>,
    /// Free-text body, sometimes markdown with `###` sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "ideaType", default, skip_serializing_if = "Option::is_none")]
    pub idea_type: Option<String>,
    #[serde(rename = "typeData", default, skip_serializing_if = "Option::is_none")]
    pub type_data: Option<TypeData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Category-specific structured payload (recipe ingredients, steps, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_ingredients",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ingredients: Vec<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_instructions",
        skip_serializing_if = "Option::is_none"
    )]
    pub instructions: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recommendation {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

// Models return ratings as 4.5, "4.5" or "N/A"; only the numeric forms survive
fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

// Ingredients arrive as a list of strings, one comma/newline separated string,
// or a list of objects like {"item": "Eggs", "quantity": "2"}
fn deserialize_ingredients<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items: Vec<String> = match value {
        Some(Value::String(s)) => s.split([',', '\n']).map(str::to_string).collect(),
        Some(Value::Array(items)) => items.into_iter().filter_map(ingredient_text).collect(),
        _ => Vec::new(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn ingredient_text(item: Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s),
        Value::Null => None,
        Value::Object(map) => {
            let named = ["name", "item", "ingredient"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string);
            Some(named.unwrap_or_else(|| Value::Object(map).to_string()))
        }
        other => Some(other.to_string()),
    }
}

// Steps arrive either as one block of text or as an array of lines
fn deserialize_instructions<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Array(steps)) => {
            let lines: Vec<String> = steps
                .into_iter()
                .filter_map(|step| match step {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
        _ => None,
    })
}

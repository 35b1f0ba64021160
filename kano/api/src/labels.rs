use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    sync::Arc,
};

#[derive(Clone, Debug, Eq, Default)]
pub struct Labels(Arc<Map>);

pub type Map = BTreeMap<String, String>;

pub type Expressions = Vec<Expression>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Expression {
    pub key: String,
    pub operator: Operator,
    #[serde(default)]
    pub values: BTreeSet<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// Selects a set of pods or namespaces by label.
#[derive(Clone, Debug, Eq, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    match_labels: Option<Map>,
    match_expressions: Option<Expressions>,
}

/// Indicates that a label key was provided more than once.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("duplicate label key {key:?}")]
pub struct DuplicateLabel {
    pub key: String,
}

// === Selector ===

impl Selector {
    pub fn match_labels(&self) -> impl Iterator<Item = (&String, &String)> {
        self.match_labels.iter().flatten()
    }

    pub fn match_expressions(&self) -> impl Iterator<Item = &Expression> {
        self.match_expressions.iter().flatten()
    }

    /// An empty selector matches everything.
    pub fn is_empty(&self) -> bool {
        self.match_labels().next().is_none() && self.match_expressions().next().is_none()
    }
}

// === Labels ===

impl Labels {
    /// Builds a label map from key-value pairs, rejecting repeated keys.
    pub fn try_from_pairs<K, V>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, DuplicateLabel>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Map::new();
        for (k, v) in pairs {
            match map.entry(k.into()) {
                Entry::Vacant(e) => {
                    e.insert(v.into());
                }
                Entry::Occupied(e) => {
                    return Err(DuplicateLabel {
                        key: e.key().clone(),
                    })
                }
            }
        }
        Ok(Self::from(map))
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map> for Labels {
    #[inline]
    fn from(labels: Map) -> Self {
        Self(Arc::new(labels))
    }
}

impl AsRef<Map> for Labels {
    #[inline]
    fn as_ref(&self) -> &Map {
        self.0.as_ref()
    }
}

impl<T: AsRef<Map>> std::cmp::PartialEq<T> for Labels {
    #[inline]
    fn eq(&self, t: &T) -> bool {
        self.0.as_ref().eq(t.as_ref())
    }
}

impl std::fmt::Display for Labels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Deserializes through [`Labels::try_from_pairs`] so that repeated keys are an error rather than
/// silently overwriting one another.
impl<'de> Deserialize<'de> for Labels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visit;

        impl<'de> de::Visitor<'de> for Visit {
            type Value = Labels;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of label keys to values")
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut access: A) -> Result<Labels, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(pair) = access.next_entry::<String, String>()? {
                    pairs.push(pair);
                }
                Labels::try_from_pairs(pairs).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_map(Visit)
    }
}

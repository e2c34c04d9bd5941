//! `tf.train.Example` messages and a uniform builder for their features.
//!
//! The message layout mirrors TensorFlow's `example.proto` and `feature.proto`
//! so the serialized bytes can be parsed by any TensorFlow input pipeline.
//! The feature map is a `BTreeMap`, so features are always serialized in key
//! order and identical inputs produce identical bytes.

use std::collections::BTreeMap;

#[derive(Clone, PartialEq, prost::Message)]
pub struct BytesList {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FloatList {
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Int64List {
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Feature {
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

pub mod feature {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Features {
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Example {
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

impl Feature {
    pub fn as_int64_list(&self) -> Option<&[i64]> {
        match &self.kind {
            Some(feature::Kind::Int64List(list)) => Some(&list.value),
            _ => None,
        }
    }

    pub fn as_float_list(&self) -> Option<&[f32]> {
        match &self.kind {
            Some(feature::Kind::FloatList(list)) => Some(&list.value),
            _ => None,
        }
    }

    pub fn as_bytes_list(&self) -> Option<&[Vec<u8>]> {
        match &self.kind {
            Some(feature::Kind::BytesList(list)) => Some(&list.value),
            _ => None,
        }
    }
}

impl Example {
    /// Look up a feature by its key, e.g. `image/height`
    pub fn feature(&self, key: &str) -> Option<&Feature> {
        self.features.as_ref()?.feature.get(key)
    }

    /// Number of features carried by this example
    pub fn len(&self) -> usize {
        self.features.as_ref().map_or(0, |f| f.feature.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A feature value tagged with its kind.
///
/// Scalars are stored as single-element lists, which is how TensorFlow
/// represents them on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    IntList(Vec<i64>),
    Bytes(Vec<u8>),
    BytesList(Vec<Vec<u8>>),
    FloatList(Vec<f32>),
}

impl From<FeatureValue> for Feature {
    fn from(value: FeatureValue) -> Self {
        let kind = match value {
            FeatureValue::Int(value) => feature::Kind::Int64List(Int64List { value: vec![value] }),
            FeatureValue::IntList(value) => feature::Kind::Int64List(Int64List { value }),
            FeatureValue::Bytes(value) => feature::Kind::BytesList(BytesList { value: vec![value] }),
            FeatureValue::BytesList(value) => feature::Kind::BytesList(BytesList { value }),
            FeatureValue::FloatList(value) => feature::Kind::FloatList(FloatList { value }),
        };
        Feature { kind: Some(kind) }
    }
}

/// Collects named features into an [`Example`]
#[derive(Debug, Default)]
pub struct ExampleBuilder {
    features: BTreeMap<String, Feature>,
}

impl ExampleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature, replacing any previous feature with the same key
    pub fn insert(mut self, key: impl Into<String>, value: FeatureValue) -> Self {
        self.features.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Example {
        Example {
            features: Some(Features {
                feature: self.features,
            }),
        }
    }
}

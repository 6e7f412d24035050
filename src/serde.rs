use crate::{AvlMap, AvlSet};
use ::serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use ::serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt::Formatter;
use std::marker::PhantomData;

pub(crate) struct MapVisitor<K, V> {
    marker: PhantomData<fn() -> AvlMap<K, V>>,
}

impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    type Value = AvlMap<K, V>;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("linked_avl::AvlMap")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = AvlMap::new();
        while let Some((k, v)) = access.next_entry()? {
            map.insert(k, v);
        }
        Ok(map)
    }
}

pub(crate) struct SeqVisitor<T> {
    marker: PhantomData<fn() -> AvlSet<T>>,
}

impl<'de, T> Visitor<'de> for SeqVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = AvlSet<T>;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("linked_avl::AvlSet")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = AvlSet::new();
        while let Some(x) = access.next_element()? {
            set.insert(x);
        }
        Ok(set)
    }
}

impl<K: Serialize, V: Serialize> Serialize for AvlMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for AvlMap<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor {
            marker: PhantomData,
        })
    }
}

impl<T: Serialize> Serialize for AvlSet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for x in self {
            seq.serialize_element(x)?;
        }
        seq.end()
    }
}

impl<'de, T> Deserialize<'de> for AvlSet<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SeqVisitor {
            marker: PhantomData,
        })
    }
}

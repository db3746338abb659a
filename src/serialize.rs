//! `serde` support. Both sets serialize as an ascending sequence of keys and deserialize from
//! any sequence, with duplicate keys collapsing into one.

use crate::avl_tree::AvlSet;
use crate::red_black_tree::RedBlackSet;
use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;
use std::marker::PhantomData;

macro_rules! impl_serde_for_set {
    ($($type_name:ident: $visitor_name:ident,)*) => {
        $(
            impl<T> Serialize for $type_name<T>
            where
                T: Serialize,
            {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    let mut seq = serializer.serialize_seq(Some(self.len()))?;
                    for key in self {
                        seq.serialize_element(key)?;
                    }
                    seq.end()
                }
            }

            struct $visitor_name<T> {
                marker: PhantomData<fn() -> $type_name<T>>,
            }

            impl<'de, T> Visitor<'de> for $visitor_name<T>
            where
                T: Deserialize<'de> + Ord,
            {
                type Value = $type_name<T>;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a sequence of keys")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let mut set = $type_name::new();
                    while let Some(key) = seq.next_element()? {
                        set.insert(key);
                    }
                    Ok(set)
                }
            }

            impl<'de, T> Deserialize<'de> for $type_name<T>
            where
                T: Deserialize<'de> + Ord,
            {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    deserializer.deserialize_seq($visitor_name {
                        marker: PhantomData,
                    })
                }
            }
        )*
    }
}

impl_serde_for_set!(
    AvlSet: AvlSetVisitor,
    RedBlackSet: RedBlackSetVisitor,
);

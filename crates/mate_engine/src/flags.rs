/// Declares a small copyable bit set with named members.
///
/// Each member carries a label used for `Debug` output and for the serde
/// representation, which is a list of labels (`["Gravity", "EaseOut"]`).
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(const $flag:ident = $bit:expr, $label:literal;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name($repr);

        impl $name {
            $(pub const $flag: Self = Self(1 << $bit);)*

            const NAMED: &'static [(&'static str, Self)] = &[$(($label, Self::$flag)),*];

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            pub fn toggle(&mut self, other: Self) {
                self.0 ^= other.0;
            }

            pub fn set(&mut self, other: Self, enabled: bool) {
                if enabled {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                Self::NAMED
                    .iter()
                    .find(|(name, _)| *name == label)
                    .map(|(_, flag)| *flag)
            }

            pub fn labels(self) -> impl Iterator<Item = &'static str> {
                Self::NAMED
                    .iter()
                    .filter(move |(_, flag)| self.contains(*flag))
                    .map(|(name, _)| *name)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                for (index, label) in self.labels().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    f.write_str(label)?;
                }
                f.write_str(")")
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(self.labels())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let labels = <Vec<String> as serde::Deserialize>::deserialize(deserializer)?;
                let mut flags = Self::empty();
                for label in &labels {
                    let flag = Self::from_label(label).ok_or_else(|| {
                        <D::Error as serde::de::Error>::custom(format!(
                            "unknown {} member '{label}'",
                            stringify!($name)
                        ))
                    })?;
                    flags.insert(flag);
                }
                Ok(flags)
            }
        }
    };
}

pub(crate) use flag_set;

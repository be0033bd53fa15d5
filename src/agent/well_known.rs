//! Well-known symbols.
//!
//! Allocated once per agent and shared by every realm. Consumers look them
//! up by accessor (`agent.well_known().iterator`) or by `WellKnownSymbol`,
//! never by description string.

use crate::value::{JsString, JsSymbol};

macro_rules! well_known_symbols {
    ($($variant:ident, $field:ident => $external:literal;)*) => {
        /// Identifies one well-known symbol
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum WellKnownSymbol {
            $($variant,)*
        }

        impl WellKnownSymbol {
            /// Every well-known symbol, in installation order
            pub const ALL: &'static [WellKnownSymbol] = &[$(WellKnownSymbol::$variant,)*];

            /// Property name on the Symbol constructor
            pub fn external_name(self) -> &'static str {
                match self {
                    $(WellKnownSymbol::$variant => $external,)*
                }
            }

            /// Name of the accessor field on `WellKnownSymbols`
            pub fn internal_name(self) -> &'static str {
                match self {
                    $(WellKnownSymbol::$variant => stringify!($field),)*
                }
            }
        }

        /// The agent's well-known symbol table
        #[derive(Debug, Clone)]
        pub struct WellKnownSymbols {
            $(
                #[doc = concat!("`Symbol.", $external, "`")]
                pub $field: JsSymbol,
            )*
        }

        impl WellKnownSymbols {
            /// Allocate the table. `alloc` receives the symbol's description.
            pub(crate) fn new(mut alloc: impl FnMut(JsString) -> JsSymbol) -> Self {
                Self {
                    $($field: alloc(JsString::from(concat!("Symbol.", $external))),)*
                }
            }

            pub fn get(&self, which: WellKnownSymbol) -> &JsSymbol {
                match which {
                    $(WellKnownSymbol::$variant => &self.$field,)*
                }
            }

            /// `(symbol, external name)` pairs in installation order
            pub fn iter(&self) -> impl Iterator<Item = (WellKnownSymbol, &JsSymbol)> {
                WellKnownSymbol::ALL.iter().map(move |&which| (which, self.get(which)))
            }
        }
    };
}

well_known_symbols! {
    AsyncIterator, async_iterator => "asyncIterator";
    HasInstance, has_instance => "hasInstance";
    IsConcatSpreadable, is_concat_spreadable => "isConcatSpreadable";
    Iterator, iterator => "iterator";
    Match, match_ => "match";
    MatchAll, match_all => "matchAll";
    Replace, replace => "replace";
    Search, search => "search";
    Species, species => "species";
    Split, split => "split";
    ToPrimitive, to_primitive => "toPrimitive";
    ToStringTag, to_string_tag => "toStringTag";
    Unscopables, unscopables => "unscopables";
}

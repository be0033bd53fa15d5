//! GlobalSymbolRegistry backing `Symbol.for` / `Symbol.keyFor`.
//!
//! Owned by the agent. Entries are never removed.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, JsString, JsSymbol};

#[derive(Debug, Default)]
pub struct SymbolRegistry {
    map: FxHashMap<JsString, JsSymbol>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<JsSymbol> {
        self.map.get(key).map(CheapClone::cheap_clone)
    }

    /// Register `symbol` under `key`, returning the symbol now registered.
    /// An existing entry wins.
    pub fn insert(&mut self, key: JsString, symbol: JsSymbol) -> JsSymbol {
        self.map.entry(key).or_insert(symbol).cheap_clone()
    }

    /// The registry key of `symbol`, if it is registered
    pub fn key_for(&self, symbol: &JsSymbol) -> Option<JsString> {
        if !symbol.is_global() {
            return None;
        }
        let description = symbol.description()?;
        match self.map.get(description) {
            Some(registered) if registered == symbol => Some(description.cheap_clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

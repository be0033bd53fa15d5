//! The agent: everything shared by the realms of one single-threaded
//! runtime.
//!
//! The agent owns the heap, the well-known symbols, the global symbol
//! registry, the realms and the execution-context stack. Several agents can
//! coexist in one process; nothing here is process-global.

mod conversions;
mod execution_context;
mod operations;
pub mod symbol_registry;
pub mod well_known;

pub use conversions::PreferredType;
pub use execution_context::ExecutionContext;
pub use symbol_registry::SymbolRegistry;
pub use well_known::{WellKnownSymbol, WellKnownSymbols};

use tracing::{debug, trace};

use crate::builtins;
use crate::error::{ErrorKind, ErrorType, JsError, JsResult};
use crate::gc::{GcStats, Guard, Heap};
use crate::native::{Arguments, NativeFunctionSpec};
use crate::object::{Attributes, JsObject, JsObjectRef, ObjectKind, Property, PropertyKey};
use crate::options::AgentOptions;
use crate::realm::{Intrinsic, Realm, RealmId};
use crate::string_dict::{Names, StringDict};
use crate::value::{CheapClone, JsString, JsSymbol, JsValue};

/// A single-threaded runtime instance
pub struct Agent {
    heap: Heap<JsObject>,
    options: AgentOptions,
    strings: StringDict,
    names: Names,
    well_known: WellKnownSymbols,
    symbol_registry: SymbolRegistry,
    realms: Vec<Option<Realm>>,
    execution_contexts: Vec<ExecutionContext>,
    /// Roots for values handed back to the embedder
    host_guard: Guard<JsObject>,
    /// [[KeptAlive]] objects
    kept_guard: Guard<JsObject>,
    /// [[KeptAlive]] symbols
    kept_symbols: Vec<JsSymbol>,
    next_symbol_id: u64,
}

/// What `call` dispatches to
enum CallTarget {
    Native {
        realm: RealmId,
        call: crate::native::NativeFn,
    },
    Bound {
        target: JsObjectRef,
        this: JsValue,
        args_list: Vec<JsValue>,
    },
}

/// What `construct` dispatches to
enum ConstructTarget {
    Native {
        realm: RealmId,
        construct: crate::native::NativeConstructFn,
    },
    Bound {
        target: JsObjectRef,
        args_list: Vec<JsValue>,
    },
}

impl Agent {
    pub fn new(options: AgentOptions) -> Self {
        let heap = Heap::new();
        heap.set_gc_threshold(options.gc_threshold);
        let host_guard = heap.create_guard();
        let kept_guard = heap.create_guard();

        let mut strings = StringDict::new();
        let names = Names::new(&mut strings);

        let mut next_symbol_id = 0;
        let well_known = WellKnownSymbols::new(|description| {
            next_symbol_id += 1;
            JsSymbol::new(next_symbol_id, Some(description), false)
        });

        debug!(
            gc_threshold = options.gc_threshold,
            max_depth = options.max_execution_context_depth,
            "agent started"
        );

        Self {
            heap,
            options,
            strings,
            names,
            well_known,
            symbol_registry: SymbolRegistry::new(),
            realms: Vec::new(),
            execution_contexts: Vec::new(),
            host_guard,
            kept_guard,
            kept_symbols: Vec::new(),
            next_symbol_id,
        }
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    /// Interned property names
    pub fn names(&self) -> &Names {
        &self.names
    }

    pub fn intern(&mut self, s: &str) -> JsString {
        self.strings.get_or_insert(s)
    }

    pub fn well_known(&self) -> &WellKnownSymbols {
        &self.well_known
    }

    pub fn well_known_symbol(&self, which: WellKnownSymbol) -> JsSymbol {
        self.well_known.get(which).cheap_clone()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Symbols
    // ═══════════════════════════════════════════════════════════════════════

    /// A fresh, non-global symbol
    pub fn new_symbol(&mut self, description: Option<JsString>) -> JsSymbol {
        self.next_symbol_id += 1;
        JsSymbol::new(self.next_symbol_id, description, false)
    }

    /// `Symbol.for(key)`: the registered symbol for `key`, created on first use
    pub fn symbol_for(&mut self, key: JsString) -> JsSymbol {
        if let Some(existing) = self.symbol_registry.get(key.as_str()) {
            return existing;
        }
        self.next_symbol_id += 1;
        let symbol = JsSymbol::new(self.next_symbol_id, Some(key.cheap_clone()), true);
        trace!(key = key.as_str(), id = symbol.id(), "registered global symbol");
        self.symbol_registry.insert(key, symbol)
    }

    /// `Symbol.keyFor(sym)` for a symbol argument
    pub fn key_for(&self, symbol: &JsSymbol) -> Option<JsString> {
        self.symbol_registry.key_for(symbol)
    }

    pub fn symbol_registry(&self) -> &SymbolRegistry {
        &self.symbol_registry
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Realms
    // ═══════════════════════════════════════════════════════════════════════

    /// Create and fully initialize a new realm
    pub fn create_realm(&mut self) -> JsResult<RealmId> {
        let id = RealmId(self.realms.len());
        let realm = Realm::new(id, self.heap.create_guard(), &self.names)?;
        self.realms.push(Some(realm));

        // Everything the initializers allocate ends up reachable from the
        // intrinsics, so the context's roots can simply be dropped.
        let result = match self.push_context(id, None) {
            Ok(()) => {
                let result = builtins::initialize_realm(self);
                self.pop_context();
                result
            }
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            self.realms.pop();
            return Err(err);
        }
        debug!(realm = id.index(), "realm created");
        Ok(id)
    }

    /// Remove a realm on behalf of the embedder. The realm stops rooting its
    /// objects; functions from it that other realms still reach keep working
    /// until the collector reclaims the realm's global object.
    pub fn remove_realm(&mut self, id: RealmId) -> JsResult<()> {
        if self.execution_contexts.iter().any(|ctx| ctx.realm == id) {
            return Err(JsError::internal(format!("{} is still executing", id)));
        }
        let realm = self
            .realms
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .filter(|realm| !realm.is_detached())
            .ok_or_else(|| JsError::internal(format!("{} was already removed", id)))?;
        realm.detach();
        debug!(realm = id.index(), "realm removed");
        Ok(())
    }

    /// A realm the embedder has not removed
    pub fn realm(&self, id: RealmId) -> JsResult<&Realm> {
        self.realm_record(id)
            .ok()
            .filter(|realm| !realm.is_detached())
            .ok_or_else(|| JsError::internal(format!("{} has been removed", id)))
    }

    /// [[Realm]] of a reachable function. Removed realms stay available
    /// here until they are collected.
    pub(crate) fn realm_record(&self, id: RealmId) -> JsResult<&Realm> {
        self.realms
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| JsError::internal(format!("{} has been reclaimed", id)))
    }

    /// Ids of all realms the embedder has not removed
    pub fn realm_ids(&self) -> Vec<RealmId> {
        self.realms
            .iter()
            .flatten()
            .filter(|realm| !realm.is_detached())
            .map(Realm::id)
            .collect()
    }

    /// Forget removed realms whose global object has been swept and that no
    /// execution context still runs in
    fn prune_realms(&mut self) {
        let contexts = &self.execution_contexts;
        for slot in &mut self.realms {
            let reclaimed = slot.as_ref().is_some_and(|realm| {
                realm.is_detached()
                    && realm.is_reclaimed()
                    && !contexts.iter().any(|ctx| ctx.realm == realm.id())
            });
            if reclaimed {
                if let Some(realm) = slot.take() {
                    debug!(realm = realm.id().index(), "realm reclaimed");
                }
            }
        }
    }

    /// Run `f` with a fresh execution context for `realm` on the stack.
    ///
    /// Objects allocated during `f` stay rooted for the embedder until
    /// `release_host_roots`. A collection may run once the stack is empty
    /// again.
    pub fn run_in_realm<R>(
        &mut self,
        realm: RealmId,
        f: impl FnOnce(&mut Agent) -> JsResult<R>,
    ) -> JsResult<R> {
        self.realm(realm)?;
        self.push_context(realm, None)?;
        let depth = self.execution_contexts.len();
        let result = f(self);
        if self.execution_contexts.len() != depth {
            self.execution_contexts.truncate(depth - 1);
            return Err(JsError::internal("execution context stack unbalanced"));
        }
        if let Some(ctx) = self.execution_contexts.pop() {
            ctx.guard.transfer_to(self.current_guard());
        }
        if self.execution_contexts.is_empty() {
            self.maybe_collect_garbage();
        }
        result
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Execution contexts
    // ═══════════════════════════════════════════════════════════════════════

    fn push_context(&mut self, realm: RealmId, function: Option<JsObjectRef>) -> JsResult<()> {
        self.realm_record(realm)?;
        if self.execution_contexts.len() >= self.options.max_execution_context_depth {
            return Err(self.throw(ErrorType::StackOverflow));
        }
        let ctx = ExecutionContext::new(realm, function, self.heap.create_guard());
        self.execution_contexts.push(ctx);
        Ok(())
    }

    fn pop_context(&mut self) {
        self.execution_contexts.pop();
    }

    pub fn execution_context_depth(&self) -> usize {
        self.execution_contexts.len()
    }

    pub fn running_execution_context(&self) -> Option<&ExecutionContext> {
        self.execution_contexts.last()
    }

    /// The realm of the running execution context
    pub fn running_realm_id(&self) -> JsResult<RealmId> {
        self.execution_contexts
            .last()
            .map(|ctx| ctx.realm)
            .ok_or_else(|| JsError::internal("no running execution context"))
    }

    pub fn running_realm(&self) -> JsResult<&Realm> {
        self.realm_record(self.running_realm_id()?)
    }

    /// An intrinsic of the running realm
    pub fn intrinsic(&self, which: Intrinsic) -> JsResult<JsObjectRef> {
        Ok(self.running_realm()?.intrinsic(which).clone())
    }

    /// The function object of the running execution context
    pub fn active_function(&self) -> Option<JsObjectRef> {
        self.execution_contexts.last().and_then(|ctx| ctx.function.clone())
    }

    /// The guard new objects are rooted in
    fn current_guard(&self) -> &Guard<JsObject> {
        self.execution_contexts
            .last()
            .map_or(&self.host_guard, |ctx| &ctx.guard)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Allocation and rooting
    // ═══════════════════════════════════════════════════════════════════════

    /// Allocate an object rooted in the running context
    pub fn alloc(&self, object: JsObject) -> JsObjectRef {
        self.current_guard().alloc(object)
    }

    /// OrdinaryObjectCreate
    pub fn create_object(&self, prototype: Option<JsObjectRef>) -> JsObjectRef {
        self.alloc(JsObject::new(prototype))
    }

    /// An ordinary object inheriting from the running realm's Object.prototype
    pub fn create_plain_object(&self) -> JsResult<JsObjectRef> {
        let proto = self.intrinsic(Intrinsic::ObjectPrototype)?;
        Ok(self.create_object(Some(proto)))
    }

    /// Root `value` in the running context
    pub fn root(&self, value: &JsValue) {
        if let JsValue::Object(obj) = value {
            self.current_guard().guard(obj);
        }
    }

    /// Keep `value` alive for the embedder until `release_host_roots`
    pub fn keep_alive(&self, value: &JsValue) {
        if let JsValue::Object(obj) = value {
            self.host_guard.guard(obj);
        }
    }

    /// Drop every root held on behalf of the embedder
    pub fn release_host_roots(&self) {
        self.host_guard.clear();
    }

    fn root_result(&self, result: &JsResult<JsValue>) {
        match result {
            Ok(value) | Err(JsError::Thrown { value, .. }) => self.root(value),
            Err(_) => {}
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Garbage collection
    // ═══════════════════════════════════════════════════════════════════════

    /// Run a full collection. Returns the number of objects reclaimed.
    ///
    /// Only values reachable from realms, execution contexts, kept objects or
    /// embedder roots survive.
    pub fn collect_garbage(&mut self) -> usize {
        let reclaimed = self.heap.collect();
        self.prune_realms();
        reclaimed
    }

    /// Collect if enough allocations happened since the last collection
    pub fn maybe_collect_garbage(&mut self) -> usize {
        let reclaimed = self.heap.collect_if_needed();
        if reclaimed > 0 {
            self.prune_realms();
        }
        reclaimed
    }

    pub fn gc_stats(&self) -> GcStats {
        self.heap.stats()
    }

    /// AddToKeptObjects
    pub fn add_to_kept_objects(&mut self, value: &JsValue) {
        match value {
            JsValue::Object(obj) => self.kept_guard.guard(obj),
            JsValue::Symbol(sym) => self.kept_symbols.push(sym.cheap_clone()),
            _ => {}
        }
    }

    /// ClearKeptObjects, run by the host at the end of each job
    pub fn clear_kept_objects(&mut self) {
        self.kept_guard.clear();
        self.kept_symbols.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a native error object of `kind` in the running realm
    pub fn create_error(&mut self, kind: ErrorKind, message: &str) -> JsResult<JsObjectRef> {
        let proto = self.intrinsic(Intrinsic::error_prototype(kind))?;
        let error = self.alloc(JsObject::with_kind(Some(proto), ObjectKind::Error));
        if !message.is_empty() {
            let key = PropertyKey::from(&self.names.message);
            error.borrow_mut().insert_data(
                key,
                JsValue::from(message),
                Attributes::WRITABLE_CONFIGURABLE,
            );
        }
        Ok(error)
    }

    /// Build the throw completion for a runtime error
    pub fn throw(&mut self, error: ErrorType) -> JsError {
        let kind = error.kind();
        let message = error.to_string();
        match self.create_error(kind, &message) {
            Ok(obj) => JsError::Thrown {
                value: JsValue::Object(obj),
                message: format!("{}: {}", kind, message),
            },
            Err(err) => err,
        }
    }

    /// Build the throw completion for an arbitrary value
    pub fn throw_value(&self, value: JsValue) -> JsError {
        let message = self.to_display_string(&value);
        JsError::Thrown { value, message }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Call / Construct
    // ═══════════════════════════════════════════════════════════════════════

    /// Call(F, V, argumentsList)
    pub fn call(&mut self, function: &JsValue, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        let JsValue::Object(func) = function else {
            return Err(self.throw(ErrorType::NotAFunction(self.to_display_string(function))));
        };
        let mut func = func.cheap_clone();
        let mut this = this.clone();
        let mut bound_levels = Vec::new();

        // Bound chains are unwrapped iteratively; only the final native call
        // takes an execution context.
        let (realm, call) = loop {
            match Self::call_target(&func) {
                Some(CallTarget::Native { realm, call }) => break (realm, call),
                Some(CallTarget::Bound {
                    target,
                    this: bound_this,
                    args_list,
                }) => {
                    this = bound_this;
                    bound_levels.push(args_list);
                    func = target;
                }
                None => {
                    let shown = self.to_display_string(&JsValue::Object(func));
                    return Err(self.throw(ErrorType::NotAFunction(shown)));
                }
            }
        };
        let joined;
        let args = if bound_levels.is_empty() {
            args
        } else {
            joined = join_bound_args(bound_levels, args);
            &joined[..]
        };

        self.push_context(realm, Some(func.cheap_clone()))?;
        trace!(function = func.id(), argc = args.len(), "native call");
        let result = call(self, &this, &Arguments::new(args));
        self.pop_context();
        self.root_result(&result);
        result
    }

    fn call_target(func: &JsObjectRef) -> Option<CallTarget> {
        match &func.borrow().kind {
            ObjectKind::NativeFunction(data) => Some(CallTarget::Native {
                realm: data.realm,
                call: data.call,
            }),
            ObjectKind::BoundFunction(bound) => Some(CallTarget::Bound {
                target: bound.target.cheap_clone(),
                this: bound.bound_this.clone(),
                args_list: bound.bound_args.clone(),
            }),
            _ => None,
        }
    }

    /// Construct(F, argumentsList, newTarget). `new_target` defaults to `F`.
    pub fn construct(
        &mut self,
        constructor: &JsValue,
        args: &[JsValue],
        new_target: Option<&JsObjectRef>,
    ) -> JsResult<JsObjectRef> {
        let JsValue::Object(func) = constructor else {
            return Err(self.throw(ErrorType::NotAConstructor(
                self.to_display_string(constructor),
            )));
        };
        let mut new_target = new_target.unwrap_or(func).cheap_clone();
        let mut func = func.cheap_clone();
        let mut bound_levels = Vec::new();

        let (realm, construct) = loop {
            match Self::construct_target(&func) {
                Some(ConstructTarget::Native { realm, construct }) => break (realm, construct),
                Some(ConstructTarget::Bound { target, args_list }) => {
                    if new_target == func {
                        new_target = target.cheap_clone();
                    }
                    bound_levels.push(args_list);
                    func = target;
                }
                None => {
                    let shown = self.to_display_string(&JsValue::Object(func));
                    return Err(self.throw(ErrorType::NotAConstructor(shown)));
                }
            }
        };
        let joined;
        let args = if bound_levels.is_empty() {
            args
        } else {
            joined = join_bound_args(bound_levels, args);
            &joined[..]
        };

        self.push_context(realm, Some(func.cheap_clone()))?;
        trace!(function = func.id(), argc = args.len(), "native construct");
        let result = construct(self, &Arguments::new(args), &new_target);
        self.pop_context();
        let result = result.map(JsValue::Object);
        self.root_result(&result);
        match result {
            Ok(JsValue::Object(obj)) => Ok(obj),
            Ok(_) => Err(JsError::internal("constructor returned a non-object")),
            Err(err) => Err(err),
        }
    }

    fn construct_target(func: &JsObjectRef) -> Option<ConstructTarget> {
        match &func.borrow().kind {
            ObjectKind::NativeFunction(data) => data.construct.map(|construct| ConstructTarget::Native {
                realm: data.realm,
                construct,
            }),
            ObjectKind::BoundFunction(bound) if bound.constructible => Some(ConstructTarget::Bound {
                target: bound.target.cheap_clone(),
                args_list: bound.bound_args.clone(),
            }),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Built-in function objects
    // ═══════════════════════════════════════════════════════════════════════

    /// CreateBuiltinFunction in the running realm
    pub fn create_builtin_function(&mut self, spec: &NativeFunctionSpec) -> JsResult<JsObjectRef> {
        let proto = self.intrinsic(Intrinsic::FunctionPrototype)?;
        self.create_builtin_function_with_prototype(spec, proto)
    }

    fn create_builtin_function_with_prototype(
        &mut self,
        spec: &NativeFunctionSpec,
        prototype: JsObjectRef,
    ) -> JsResult<JsObjectRef> {
        let realm = self.running_realm()?;
        let object = builtins::function::builtin_function_object(
            &self.names,
            spec,
            realm.id(),
            realm.global_object(),
            Some(prototype),
        );
        Ok(self.alloc(object))
    }

    /// Create a built-in and install it on `holder` under `spec.key`
    pub fn register_method(
        &mut self,
        holder: &JsObjectRef,
        spec: NativeFunctionSpec,
    ) -> JsResult<JsObjectRef> {
        let function = self.create_builtin_function(&spec)?;
        holder.borrow_mut().insert_data(
            spec.key,
            JsValue::Object(function.cheap_clone()),
            spec.attributes,
        );
        Ok(function)
    }

    /// Create a getter and install it as an accessor on `holder`
    pub fn register_getter(
        &mut self,
        holder: &JsObjectRef,
        spec: NativeFunctionSpec,
    ) -> JsResult<JsObjectRef> {
        let function = self.create_builtin_function(&spec)?;
        holder.borrow_mut().insert_property(
            spec.key,
            Property::accessor(Some(function.cheap_clone()), None, spec.attributes),
        );
        Ok(function)
    }

    /// A built-in async function: its prototype is %AsyncFunction.prototype%
    pub fn create_async_builtin_function(
        &mut self,
        spec: &NativeFunctionSpec,
    ) -> JsResult<JsObjectRef> {
        let proto = self.intrinsic(Intrinsic::AsyncFunctionPrototype)?;
        self.create_builtin_function_with_prototype(spec, proto)
    }

    /// Whether `value` is a function inheriting from its realm's
    /// %AsyncFunction.prototype%
    pub fn is_async_function(&self, value: &JsValue) -> JsResult<bool> {
        builtins::async_function::is_async_function(self, value)
    }
}

/// Arguments of an unwrapped bound chain: the innermost level's bound
/// arguments come first, the call's own arguments last
fn join_bound_args(levels: Vec<Vec<JsValue>>, args: &[JsValue]) -> Vec<JsValue> {
    let mut joined: Vec<JsValue> = levels.into_iter().rev().flatten().collect();
    joined.extend_from_slice(args);
    joined
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(AgentOptions::default())
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        self.execution_contexts.clear();
        self.realms.clear();
        self.host_guard.clear();
        self.kept_guard.clear();
        let reclaimed = self.heap.collect();
        debug!(reclaimed, "agent torn down");
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("realms", &self.realm_ids())
            .field("execution_contexts", &self.execution_contexts.len())
            .field("global_symbols", &self.symbol_registry.len())
            .finish()
    }
}
